use std::convert::Infallible;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::manifest::{walk_dependencies, Dependencies, DependencyInfo};

/// Conventional manifest file name inside a project directory.
pub const MANIFEST_FILE: &str = "opa.project";
/// Tool-private directory; never copied into dependencies.
pub const PRIVATE_DIR: &str = ".opa";
const DEPENDENCIES_DIR: &str = "dependencies";

/// Build settings. Carried through read/write untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entrypoints: Vec<String>,
}

impl Build {
    fn is_empty(&self) -> bool {
        self == &Build::default()
    }
}

/// A project manifest (`opa.project`).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Source root, relative to the project directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Test root, relative to the project directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<String>,
    #[serde(default, skip_serializing_if = "Dependencies::is_empty")]
    pub dependencies: Dependencies,
    #[serde(default, skip_serializing_if = "Build::is_empty")]
    pub build: Build,
    #[serde(skip)]
    path: PathBuf,
}

impl Project {
    /// An empty project bound to a manifest path.
    pub fn new(path: impl AsRef<Path>) -> Project {
        Project {
            path: manifest_path(path.as_ref()),
            ..Project::default()
        }
    }

    /// Path of the manifest file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the manifest.
    pub fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }

    /// Parse a manifest. A missing file is an error unless `allow_missing`,
    /// in which case an empty project bound to the path is returned.
    pub fn read_from_file(path: impl AsRef<Path>, allow_missing: bool) -> Result<Project> {
        let path = manifest_path(path.as_ref());
        if !path.is_file() {
            if allow_missing {
                return Ok(Project::new(&path));
            }
            return Err(Error::ManifestNotFound { path });
        }

        let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let mut project = Project::parse(&content, &path)?;
        project.path = path;
        Ok(project)
    }

    /// Read a manifest if one exists.
    pub fn read_optional(path: impl AsRef<Path>) -> Result<Option<Project>> {
        let path = manifest_path(path.as_ref());
        if !path.is_file() {
            return Ok(None);
        }
        Project::read_from_file(&path, false).map(Some)
    }

    /// Read a manifest and attach the dependency tree already on disk.
    pub fn read_and_load(path: impl AsRef<Path>, allow_missing: bool) -> Result<Project> {
        let mut project = Project::read_from_file(path, allow_missing)?;
        project.load()?;
        Ok(project)
    }

    /// Parse manifest content; `path` is only used for error context.
    pub fn parse(content: &str, path: &Path) -> Result<Project> {
        serde_yaml::from_str(content).map_err(|source| Error::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|source| Error::ManifestSerialize {
            path: self.path.clone(),
            source,
        })
    }

    /// Write the manifest. Fails if the file exists and `overwrite` is false.
    pub fn write_to_file(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<()> {
        let path = manifest_path(path.as_ref());
        tracing::debug!(path = %path.display(), "writing project file");

        if !overwrite && path.exists() {
            return Err(Error::ProjectFileConflict { path });
        }
        let data = self.to_yaml()?;
        std::fs::write(&path, data).map_err(|e| Error::io(&path, e))
    }

    pub fn set_dependency(&mut self, name: &str, info: DependencyInfo) {
        self.dependencies.set(name, info);
    }

    pub fn remove_dependency(&mut self, name: &str) -> bool {
        self.dependencies.remove(name).is_some()
    }

    /// Root directory that top-level dependencies are resolved into.
    pub fn dependencies_dir(&self) -> PathBuf {
        dependencies_dir(self.dir())
    }

    // ─── Tree Load ─────────────────────────────────────────────────

    /// Re-derive the resolved tree from the layout a previous resolve left
    /// on disk, without fetching anything.
    pub fn load(&mut self) -> Result<()> {
        let root = self.dependencies_dir();
        self.load_under(&root)
    }

    fn load_under(&mut self, root_dir: &Path) -> Result<()> {
        for dep in self.dependencies.values_mut() {
            let dir = dep.dir(root_dir);
            dep.project = match Project::read_optional(&dir) {
                Ok(Some(mut nested)) => {
                    nested
                        .load_under(&dir)
                        .map_err(|e| e.in_dependency(&dep.name))?;
                    Some(nested)
                }
                Ok(None) => None,
                Err(e) => return Err(e.in_dependency(&dep.name)),
            };
            dep.set_resolved_dir(dir);
        }
        Ok(())
    }

    // ─── Queries ───────────────────────────────────────────────────

    /// The project's source root (or its directory), then every
    /// dependency's source directory in pre-order.
    pub fn source_locations(&self) -> Vec<PathBuf> {
        let mut locations = vec![match &self.source {
            Some(source) => self.dir().join(source),
            None => self.dir().to_path_buf(),
        }];
        let _ = walk_dependencies(self, |dep| -> std::result::Result<(), Infallible> {
            locations.extend(dep.source_dir());
            Ok(())
        });
        locations
    }

    /// The project's test root if declared, then, when `include_dependencies`
    /// is set, every dependency's declared test directory in pre-order.
    pub fn test_locations(&self, include_dependencies: bool) -> Vec<PathBuf> {
        let mut locations: Vec<PathBuf> = self
            .tests
            .iter()
            .map(|tests| self.dir().join(tests))
            .collect();
        if include_dependencies {
            let _ = walk_dependencies(self, |dep| -> std::result::Result<(), Infallible> {
                locations.extend(dep.test_dir());
                Ok(())
            });
        }
        locations
    }

    /// Try to find an `opa.project` in the given directory or its ancestors.
    pub fn find(start_dir: &Path) -> Option<PathBuf> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(MANIFEST_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }
}

/// `<dir>/opa.project` unless `path` already names the manifest file.
pub fn manifest_path(path: &Path) -> PathBuf {
    if path.file_name().is_some_and(|n| n == MANIFEST_FILE) {
        path.to_path_buf()
    } else {
        path.join(MANIFEST_FILE)
    }
}

/// `<root>/.opa/dependencies`
pub fn dependencies_dir(root: &Path) -> PathBuf {
    root.join(PRIVATE_DIR).join(DEPENDENCIES_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_read_project() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(MANIFEST_FILE),
            r#"name: my_policies
version: 0.1.0
source: src
tests: test
build:
  target: wasm
  entrypoints:
    - main/allow
dependencies:
  lib: file:../lib
"#,
        )
        .unwrap();

        let project = Project::read_from_file(dir.path(), false).unwrap();
        assert_eq!(project.name.as_deref(), Some("my_policies"));
        assert_eq!(project.version.as_deref(), Some("0.1.0"));
        assert_eq!(project.source.as_deref(), Some("src"));
        assert_eq!(project.tests.as_deref(), Some("test"));
        assert_eq!(project.build.target.as_deref(), Some("wasm"));
        assert_eq!(project.build.entrypoints, vec!["main/allow"]);
        assert_eq!(project.dependencies.len(), 1);
        assert_eq!(project.path(), dir.path().join(MANIFEST_FILE));
        assert_eq!(project.dir(), dir.path());
    }

    #[test]
    fn test_read_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = Project::read_from_file(dir.path(), false).unwrap_err();
        assert!(matches!(err, Error::ManifestNotFound { .. }));

        let project = Project::read_from_file(dir.path(), true).unwrap();
        assert!(project.dependencies.is_empty());
        assert_eq!(project.path(), dir.path().join(MANIFEST_FILE));
    }

    #[test]
    fn test_read_malformed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "name: [unclosed\n").unwrap();
        let err = Project::read_from_file(dir.path(), false).unwrap_err();
        assert!(matches!(err, Error::ManifestParse { .. }));
    }

    #[test]
    fn test_write_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let mut project = Project::new(dir.path());
        project.name = Some("app".to_string());

        project.write_to_file(dir.path(), false).unwrap();
        let err = project.write_to_file(dir.path(), false).unwrap_err();
        assert!(matches!(err, Error::ProjectFileConflict { .. }));
        project.write_to_file(dir.path(), true).unwrap();

        let back = Project::read_from_file(dir.path(), false).unwrap();
        assert_eq!(back.name.as_deref(), Some("app"));
    }

    #[test]
    fn test_write_omits_empty_fields() {
        let mut project = Project::new("/x");
        project.name = Some("app".to_string());
        assert_eq!(project.to_yaml().unwrap(), "name: app\n");
    }

    #[test]
    fn test_manifest_path() {
        assert_eq!(
            manifest_path(Path::new("/a/b")),
            PathBuf::from("/a/b/opa.project")
        );
        assert_eq!(
            manifest_path(Path::new("/a/b/opa.project")),
            PathBuf::from("/a/b/opa.project")
        );
    }

    #[test]
    fn test_dependencies_dir() {
        assert_eq!(
            dependencies_dir(Path::new("/proj")),
            PathBuf::from("/proj/.opa/dependencies")
        );
    }

    #[test]
    fn test_root_locations_without_dependencies() {
        let mut project = Project::new("/proj");
        assert_eq!(project.source_locations(), vec![PathBuf::from("/proj")]);
        assert!(project.test_locations(true).is_empty());

        project.source = Some("src".to_string());
        project.tests = Some("test".to_string());
        assert_eq!(project.source_locations(), vec![PathBuf::from("/proj/src")]);
        assert_eq!(project.test_locations(false), vec![PathBuf::from("/proj/test")]);
    }

    #[test]
    fn test_find_in_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "name: root\n").unwrap();
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(
            Project::find(&nested),
            Some(dir.path().join(MANIFEST_FILE))
        );
    }
}
