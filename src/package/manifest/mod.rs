//! Dependency declarations and their resolution.
//!
//! Parses `dependencies:` from `opa.project`, fetches each dependency into
//! `.opa/dependencies/<id>/`, and recurses into dependencies that are
//! projects themselves. Transitive dependencies land inside their parent's
//! directory, so the on-disk layout mirrors the dependency tree.
//!
//! Declaration shapes:
//!   - **Bare**: `name: <location>`; namespace is the key.
//!   - **Namespaced**: `name: { location, namespace: <ns> }`.
//!   - **Unnamespaced**: `name: { location, namespace: false }`.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use crate::config::project::Project;
use crate::hash::{dependency_id, DependencyId};

// ─── Data Types ────────────────────────────────────────────────────

/// Where a dependency comes from and how its data is namespaced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyInfo {
    pub location: String,
    /// `None` disables namespace isolation.
    pub namespace: Option<String>,
}

impl DependencyInfo {
    pub fn new(location: impl Into<String>, namespace: Option<String>) -> Self {
        DependencyInfo {
            location: location.into(),
            namespace: namespace.filter(|ns| !ns.is_empty()),
        }
    }
}

/// A declared dependency, plus what resolution learned about it.
#[derive(Clone, Debug)]
pub struct Dependency {
    pub name: String,
    pub info: DependencyInfo,
    /// The fetched content's own manifest, if it is a project.
    pub project: Option<Project>,
    dir: Option<PathBuf>,
}

impl Dependency {
    pub fn new(name: impl Into<String>, info: DependencyInfo) -> Self {
        Dependency {
            name: name.into(),
            info,
            project: None,
            dir: None,
        }
    }

    pub fn location(&self) -> &str {
        &self.info.location
    }

    pub fn namespace(&self) -> Option<&str> {
        self.info.namespace.as_deref()
    }

    pub fn id(&self) -> DependencyId {
        dependency_id(self.namespace(), self.location())
    }

    /// Directory this dependency occupies under `root_dir`.
    pub fn dir(&self, root_dir: &Path) -> PathBuf {
        root_dir.join(self.id().to_hex())
    }

    /// Directory set by the last resolve or load.
    pub fn resolved_dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub(crate) fn set_resolved_dir(&mut self, dir: PathBuf) {
        self.dir = Some(dir);
    }

    /// The nested project's source root, or the dependency directory.
    pub fn source_dir(&self) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        match self.project.as_ref().and_then(|p| p.source.as_deref()) {
            Some(source) => Some(dir.join(source)),
            None => Some(dir.clone()),
        }
    }

    /// The nested project's test root, if it declares one.
    pub fn test_dir(&self) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        let tests = self.project.as_ref()?.tests.as_deref()?;
        Some(dir.join(tests))
    }
}

/// Dependency map keyed by dependency name.
#[derive(Clone, Debug, Default)]
pub struct Dependencies(BTreeMap<String, Dependency>);

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert or replace the dependency declared under `name`.
    pub fn set(&mut self, name: &str, info: DependencyInfo) {
        self.0.insert(name.to_string(), Dependency::new(name, info));
    }
}

impl Deref for Dependencies {
    type Target = BTreeMap<String, Dependency>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Dependencies {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<(String, DependencyInfo)> for Dependencies {
    fn from_iter<I: IntoIterator<Item = (String, DependencyInfo)>>(iter: I) -> Self {
        let mut deps = Dependencies::new();
        for (name, info) in iter {
            deps.set(&name, info);
        }
        deps
    }
}

mod parse;
mod resolve;
mod tree;

pub use resolve::Resolver;
pub use tree::walk_dependencies;

#[cfg(test)]
mod tests;
