use std::path::{Path, PathBuf};

use crate::config::project::Project;
use crate::config::settings::Settings;
use crate::error::{Error, Result};
use crate::fetch::{Fetch, Fetchers, GitFetch, LocalCopy, Location, Progress, TracingProgress};
use crate::hash::DependencyId;
use crate::rewrite::{NamespaceRewriter, OpaRefactor, RootMove};

use super::Dependency;

// ─── Resolver ──────────────────────────────────────────────────────

/// Fetches dependencies and their transitive dependencies into
/// content-addressed directories, then isolates each namespaced one.
///
/// Resolution is sequential and depth-first. Each dependency's directory is
/// destroyed and recreated, so nothing from a previous pass survives.
pub struct Resolver {
    fetchers: Fetchers,
    rewriter: Box<dyn NamespaceRewriter>,
    progress: Box<dyn Progress>,
}

impl Default for Resolver {
    fn default() -> Self {
        Resolver::new(&Settings::default())
    }
}

impl Resolver {
    pub fn new(settings: &Settings) -> Self {
        Resolver {
            fetchers: Fetchers::new(
                GitFetch::new(&settings.git, settings.shallow_clone),
                LocalCopy,
            ),
            rewriter: Box::new(OpaRefactor::new(&settings.opa)),
            progress: Box::new(TracingProgress),
        }
    }

    pub fn with_git_fetch(mut self, fetch: impl Fetch + 'static) -> Self {
        self.fetchers.git = Box::new(fetch);
        self
    }

    pub fn with_local_fetch(mut self, fetch: impl Fetch + 'static) -> Self {
        self.fetchers.local = Box::new(fetch);
        self
    }

    pub fn with_rewriter(mut self, rewriter: impl NamespaceRewriter + 'static) -> Self {
        self.rewriter = Box::new(rewriter);
        self
    }

    pub fn with_progress(mut self, progress: impl Progress + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    /// Resolve every dependency of `project` into a fresh
    /// `.opa/dependencies`. The first failure aborts the whole pass.
    pub fn resolve_project(&self, project: &mut Project) -> Result<()> {
        let root_dir = project.dependencies_dir();
        let base_dir = project.dir().to_path_buf();

        if root_dir.exists() {
            std::fs::remove_dir_all(&root_dir).map_err(|e| Error::io(&root_dir, e))?;
        }
        std::fs::create_dir_all(&root_dir).map_err(|e| Error::io(&root_dir, e))?;

        for dep in project.dependencies.values_mut() {
            self.resolve(dep, &root_dir, &base_dir)?;
        }
        tracing::info!(
            count = project.dependencies.len(),
            root = %root_dir.display(),
            "dependencies resolved"
        );
        Ok(())
    }

    /// Resolve one dependency into `root_dir`. Relative local locations are
    /// taken relative to `base_dir`, the declaring manifest's directory.
    pub fn resolve(&self, dep: &mut Dependency, root_dir: &Path, base_dir: &Path) -> Result<()> {
        let mut active = Vec::new();
        self.resolve_guarded(dep, root_dir, base_dir, &mut active)
    }

    /// `active` holds the dependencies currently being resolved, outermost
    /// first; meeting one of them again means the graph has a cycle.
    fn resolve_guarded(
        &self,
        dep: &mut Dependency,
        root_dir: &Path,
        base_dir: &Path,
        active: &mut Vec<(DependencyId, String)>,
    ) -> Result<()> {
        let id = dep.id();
        if active.iter().any(|(seen, _)| *seen == id) {
            let mut chain: Vec<String> = active.iter().map(|(_, name)| name.clone()).collect();
            chain.push(dep.name.clone());
            return Err(Error::DependencyCycle { chain });
        }

        active.push((id, dep.name.clone()));
        let result = self.resolve_one(dep, root_dir, base_dir, active);
        active.pop();
        result.map_err(|e| e.in_dependency(&dep.name))
    }

    fn resolve_one(
        &self,
        dep: &mut Dependency,
        root_dir: &Path,
        base_dir: &Path,
        active: &mut Vec<(DependencyId, String)>,
    ) -> Result<()> {
        let target_dir = dep.dir(root_dir);
        tracing::debug!(
            dependency = %dep.name,
            location = %dep.location(),
            dir = %target_dir.display(),
            "resolving"
        );

        if target_dir.exists() {
            std::fs::remove_dir_all(&target_dir).map_err(|e| Error::io(&target_dir, e))?;
        }
        std::fs::create_dir_all(&target_dir).map_err(|e| Error::io(&target_dir, e))?;

        let location = Location::parse(dep.location(), base_dir)?;
        self.fetchers
            .fetch(&location, &target_dir, self.progress.as_ref())?;

        dep.project = Project::read_optional(&target_dir)?;
        dep.set_resolved_dir(target_dir.clone());

        if let Some(nested) = dep.project.as_mut() {
            let nested_base = nested_base_dir(&location, &target_dir);
            tracing::debug!(
                dependency = %dep.name,
                count = nested.dependencies.len(),
                base = %nested_base.display(),
                "resolving transitive dependencies"
            );
            for child in nested.dependencies.values_mut() {
                self.resolve_guarded(child, &target_dir, &nested_base, active)?;
            }
        }

        if let Some(namespace) = dep.namespace() {
            let dirs = rewrite_dirs(dep)?;
            let mapping = RootMove::namespaced(namespace);
            if dirs.is_empty() {
                tracing::debug!(dependency = %dep.name, "nothing to rewrite");
            } else {
                tracing::debug!(dependency = %dep.name, mapping = %mapping, "rewriting namespace");
                self.rewriter
                    .rewrite(&dirs, &mapping)
                    .map_err(|source| Error::NamespaceRewriteFailed {
                        namespace: namespace.to_string(),
                        source,
                    })?;
            }
        }

        tracing::info!(dependency = %dep.name, id = ?dep.id(), "resolved");
        Ok(())
    }
}

/// Relative locations in a fetched manifest are relative to where that
/// manifest came from: the local source directory, or the clone.
fn nested_base_dir(location: &Location, target_dir: &Path) -> PathBuf {
    match location {
        Location::Local(source) if source.is_file() => source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| target_dir.to_path_buf()),
        Location::Local(source) => source.clone(),
        Location::Git { .. } => target_dir.to_path_buf(),
    }
}

/// Source and test directories to rewrite. A directory that directly holds
/// resolved child dependencies is replaced by its other entries, so data
/// the children already moved is not moved again.
fn rewrite_dirs(dep: &Dependency) -> Result<Vec<PathBuf>> {
    let children: Vec<&Path> = dep
        .project
        .iter()
        .flat_map(|p| p.dependencies.values())
        .filter_map(|child| child.resolved_dir())
        .collect();

    let mut dirs = Vec::new();
    for dir in dep.source_dir().into_iter().chain(dep.test_dir()) {
        if !children.iter().any(|c| c.parent() == Some(dir.as_path())) {
            dirs.push(dir);
            continue;
        }
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(|e| Error::io(&dir, e))? {
            let path = entry.map_err(|e| Error::io(&dir, e))?.path();
            if !children.contains(&path.as_path()) {
                entries.push(path);
            }
        }
        entries.sort();
        dirs.extend(entries);
    }
    Ok(dirs)
}
