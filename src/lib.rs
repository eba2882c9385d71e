//! odm: dependency manager for OPA policy-bundle projects.
//!
//! Reads `opa.project`, fetches each declared dependency into a
//! content-addressed directory under `.opa/dependencies/`, resolves the
//! dependencies' own dependencies beneath them, and moves every namespaced
//! dependency's data under `data.<namespace>`.

pub mod config;
pub mod error;
pub mod package;

// Re-exports for flat `odm::X` paths used by the CLI and tests
pub use config::project;
pub use config::settings;
pub use package::fetch;
pub use package::hash;
pub use package::manifest;
pub use package::rewrite;

pub use config::project::Project;
pub use config::settings::Settings;
pub use error::{Error, Result};
pub use package::manifest::{Dependency, DependencyInfo, Resolver};
