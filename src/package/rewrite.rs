//! Namespace isolation for fetched dependencies.
//!
//! A namespaced dependency has the root data path of every policy under its
//! directories moved from `data` to `data.<namespace>`, so merging several
//! dependencies cannot collide at the document root. The move itself is
//! done by an external tool behind [`NamespaceRewriter`].

use std::fmt;
use std::path::PathBuf;
use std::process::Command;

use crate::error::BoxError;

const DATA_ROOT: &str = "data";

/// A root data path move, rendered as `from:to`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootMove {
    pub from: String,
    pub to: String,
}

impl RootMove {
    /// `data` → `data.<namespace>`.
    pub fn namespaced(namespace: &str) -> Self {
        RootMove {
            from: DATA_ROOT.to_string(),
            to: format!("{}.{}", DATA_ROOT, namespace),
        }
    }
}

impl fmt::Display for RootMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.from, self.to)
    }
}

/// Applies a root move in place to every policy under `dirs`.
pub trait NamespaceRewriter {
    fn rewrite(&self, dirs: &[PathBuf], mapping: &RootMove) -> Result<(), BoxError>;
}

/// Runs `opa refactor move`.
#[derive(Clone, Debug)]
pub struct OpaRefactor {
    opa: PathBuf,
}

impl Default for OpaRefactor {
    fn default() -> Self {
        OpaRefactor::new("opa")
    }
}

impl OpaRefactor {
    pub fn new(opa: impl Into<PathBuf>) -> Self {
        OpaRefactor { opa: opa.into() }
    }

    fn args(dirs: &[PathBuf], mapping: &RootMove) -> Vec<String> {
        let mut args = vec![
            "refactor".to_string(),
            "move".to_string(),
            "-p".to_string(),
            mapping.to_string(),
            "-w".to_string(),
        ];
        args.extend(dirs.iter().map(|d| d.to_string_lossy().into_owned()));
        args
    }
}

impl NamespaceRewriter for OpaRefactor {
    fn rewrite(&self, dirs: &[PathBuf], mapping: &RootMove) -> Result<(), BoxError> {
        tracing::debug!(mapping = %mapping, dirs = ?dirs, "opa refactor move");
        let output = Command::new(&self.opa)
            .args(Self::args(dirs, mapping))
            .output()
            .map_err(|e| format!("cannot run `{}`: {}", self.opa.display(), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "`{} refactor move` exited with {}: {}",
                self.opa.display(),
                output.status,
                stderr.trim()
            )
            .into());
        }
        Ok(())
    }
}
