use std::path::Path;

use walkdir::WalkDir;

use crate::config::project::{MANIFEST_FILE, PRIVATE_DIR};
use crate::error::{Error, Result};

use super::{Fetch, Location, Progress};

/// Copies a local project directory into the target.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalCopy;

impl Fetch for LocalCopy {
    fn fetch(&self, location: &Location, target_dir: &Path, progress: &dyn Progress) -> Result<()> {
        let Location::Local(source) = location else {
            return Err(Error::UnsupportedLocation {
                location: format!("{:?}", location),
            });
        };

        if !source.exists() {
            return Err(Error::DependencyNotFound {
                path: source.clone(),
            });
        }

        // A path to a manifest file stands for its containing project.
        let source = match source.file_name() {
            Some(name) if source.is_file() && name == MANIFEST_FILE => {
                source.parent().unwrap_or(source)
            }
            _ => source.as_path(),
        };

        progress.report(&format!("copying {}", source.display()));
        let copied = copy_tree(source, target_dir, &[PRIVATE_DIR])?;
        tracing::debug!(source = %source.display(), files = copied, "copied local dependency");
        Ok(())
    }
}

/// Recursively copy `source` into `target`, skipping directories whose name
/// is in `exclude` and zero-byte files. A file `source` is copied into
/// `target` under its own name. Returns the number of files copied.
pub fn copy_tree(source: &Path, target: &Path, exclude: &[&str]) -> Result<usize> {
    if source.is_file() {
        let name = source.file_name().unwrap_or(source.as_os_str());
        return copy_file(source, &target.join(name)).map(usize::from);
    }

    let mut copied = 0;
    let walker = WalkDir::new(source).min_depth(1).into_iter().filter_entry(|e| {
        !(e.file_type().is_dir() && exclude.iter().any(|x| e.file_name() == *x))
    });
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            Error::io(path, e.into())
        })?;
        let rel = entry
            .path()
            .strip_prefix(source)
            .unwrap_or(entry.path());
        let dest = target.join(rel);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest).map_err(|e| Error::io(&dest, e))?;
        } else if copy_file(entry.path(), &dest)? {
            copied += 1;
        }
    }
    Ok(copied)
}

/// Copy one file, creating parent directories. Empty files are skipped;
/// an empty policy module breaks the namespace rewrite downstream.
fn copy_file(from: &Path, to: &Path) -> Result<bool> {
    let meta = std::fs::metadata(from).map_err(|e| Error::io(from, e))?;
    if meta.len() == 0 {
        return Ok(false);
    }
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    std::fs::copy(from, to).map_err(|e| Error::io(from, e))?;
    Ok(true)
}
