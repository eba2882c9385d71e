use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::{BoxError, Error, Result};

use super::{Fetch, Location, Progress};

/// Clones repositories with the `git` executable.
#[derive(Clone, Debug)]
pub struct GitFetch {
    git: PathBuf,
    shallow: bool,
}

impl Default for GitFetch {
    fn default() -> Self {
        GitFetch::new("git", false)
    }
}

impl GitFetch {
    pub fn new(git: impl Into<PathBuf>, shallow: bool) -> Self {
        GitFetch {
            git: git.into(),
            shallow,
        }
    }

    fn confirm_git_available(&self) -> std::result::Result<(), BoxError> {
        match Command::new(&self.git).arg("--version").output() {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(format!(
                "`{}` was not found, confirm git is installed and on your PATH",
                self.git.display()
            )
            .into()),
            Err(e) => Err(format!("cannot run `{}`: {}", self.git.display(), e).into()),
        }
    }

    /// Run git, forward its output to `progress`, fail on non-zero exit.
    fn run(
        &self,
        args: &[&str],
        what: &str,
        progress: &dyn Progress,
    ) -> std::result::Result<(), BoxError> {
        let output: Output = Command::new(&self.git)
            .args(args)
            .output()
            .map_err(|e| format!("{}: cannot run `{}`: {}", what, self.git.display(), e))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines().chain(stderr.split(['\r', '\n'])) {
            let line = line.trim();
            if !line.is_empty() {
                progress.report(line);
            }
        }

        if !output.status.success() {
            return Err(format!("{} | exit status: {} | {}", what, output.status, stderr.trim()).into());
        }
        Ok(())
    }

    /// Arguments for `git clone`, and the ref still to check out afterwards.
    ///
    /// `--branch` only takes branch and tag names, so a shallow clone of a
    /// commit hash falls back to a full clone plus checkout.
    fn clone_args<'a>(
        &self,
        url: &'a str,
        reference: Option<&'a str>,
        target: &'a str,
    ) -> (Vec<&'a str>, Option<&'a str>) {
        let mut args = vec!["clone", "--progress"];
        let checkout = match reference {
            Some(r) if self.shallow && !is_commit_hash(r) => {
                args.extend(["--depth", "1", "--branch", r]);
                None
            }
            other => other,
        };
        args.extend(["--", url, target]);
        (args, checkout)
    }

    fn clone_into(
        &self,
        url: &str,
        reference: Option<&str>,
        target_dir: &Path,
        progress: &dyn Progress,
    ) -> std::result::Result<(), BoxError> {
        self.confirm_git_available()?;

        let target = target_dir.to_string_lossy().into_owned();
        let (args, checkout) = self.clone_args(url, reference, &target);
        self.run(
            &args,
            &format!("failed to clone git repository {}", url),
            progress,
        )?;

        match checkout {
            Some(r) => self.run(
                &["-C", target.as_str(), "checkout", "--quiet", r],
                &format!("failed to checkout '{}' for git repository {}", r, url),
                progress,
            )?,
            None if reference.is_none() => progress.report("no ref specified, using HEAD"),
            None => {}
        }
        Ok(())
    }
}

/// 7 to 40 hex digits: an abbreviated or full commit hash.
fn is_commit_hash(reference: &str) -> bool {
    (7..=40).contains(&reference.len()) && reference.chars().all(|c| c.is_ascii_hexdigit())
}

impl Fetch for GitFetch {
    fn fetch(&self, location: &Location, target_dir: &Path, progress: &dyn Progress) -> Result<()> {
        let Location::Git { url, reference } = location else {
            return Err(Error::UnsupportedLocation {
                location: format!("{:?}", location),
            });
        };

        tracing::debug!(url = %url, reference = ?reference, "cloning");
        self.clone_into(url, reference.as_deref(), target_dir, progress)
            .map_err(|source| Error::FetchFailed {
                location: match reference {
                    Some(r) => format!("git+{}#{}", url, r),
                    None => format!("git+{}", url),
                },
                source,
            })
    }
}
