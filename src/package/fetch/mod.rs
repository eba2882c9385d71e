//! Fetch strategies: how a dependency's content gets into its directory.
//!
//! A location string is parsed into a [`Location`]; [`Fetchers`] then hands
//! it to the strategy for its variant:
//!   - **Git** (`git+<url>[#<ref>]`): clone, then check out the ref.
//!   - **Local** (`file:<path>` or a bare path): recursive copy.
//!
//! Both leave the target directory populated as the dependency's own
//! project root.

use std::path::Path;

use crate::error::Result;

mod git;
mod local;
mod location;

pub use git::GitFetch;
pub use local::{copy_tree, LocalCopy};
pub use location::Location;

// ─── Progress ──────────────────────────────────────────────────────

/// Sink for progress output produced while fetching.
pub trait Progress {
    fn report(&self, line: &str);
}

/// Forwards progress lines as debug-level tracing events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingProgress;

impl Progress for TracingProgress {
    fn report(&self, line: &str) {
        tracing::debug!(target: "odm::fetch", "{}", line);
    }
}

/// Discards all progress output.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl Progress for Silent {
    fn report(&self, _line: &str) {}
}

// ─── Strategy ──────────────────────────────────────────────────────

/// A way of materializing a location into a directory.
pub trait Fetch {
    fn fetch(&self, location: &Location, target_dir: &Path, progress: &dyn Progress) -> Result<()>;
}

/// One strategy per location kind.
pub struct Fetchers {
    pub git: Box<dyn Fetch>,
    pub local: Box<dyn Fetch>,
}

impl Fetchers {
    pub fn new(git: impl Fetch + 'static, local: impl Fetch + 'static) -> Self {
        Fetchers {
            git: Box::new(git),
            local: Box::new(local),
        }
    }

    /// Dispatch to the strategy matching the location's variant.
    pub fn fetch(
        &self,
        location: &Location,
        target_dir: &Path,
        progress: &dyn Progress,
    ) -> Result<()> {
        match location {
            Location::Git { .. } => self.git.fetch(location, target_dir, progress),
            Location::Local(_) => self.local.fetch(location, target_dir, progress),
        }
    }
}
