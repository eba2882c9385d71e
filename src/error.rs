//! Error types for odm.
//!
//! Every failure is a variant of [`Error`]. Failures inside a dependency's
//! resolution chain are wrapped in [`Error::Dependency`] at each level of
//! the recursion, so the error a caller finally sees names the full path of
//! dependencies that led to it.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed cause carried by errors that wrap an external tool failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid dependency location `{location}`: {reason}")]
    InvalidLocation { location: String, reason: String },

    #[error("unsupported dependency location `{location}`")]
    UnsupportedLocation { location: String },

    #[error("dependency {} does not exist", path.display())]
    DependencyNotFound { path: PathBuf },

    #[error("failed to fetch `{location}`: {source}")]
    FetchFailed {
        location: String,
        #[source]
        source: BoxError,
    },

    #[error("project file {} does not exist", path.display())]
    ManifestNotFound { path: PathBuf },

    #[error("failed to parse project file {}: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to serialize project file {}: {source}", path.display())]
    ManifestSerialize {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to rewrite namespace `{namespace}`: {source}")]
    NamespaceRewriteFailed {
        namespace: String,
        #[source]
        source: BoxError,
    },

    #[error("project file {} already exists", path.display())]
    ProjectFileConflict { path: PathBuf },

    #[error("dependency cycle detected: {}", chain.join(" -> "))]
    DependencyCycle { chain: Vec<String> },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dependency `{name}`: {source}")]
    Dependency {
        name: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap this error with the name of the dependency it occurred in.
    pub(crate) fn in_dependency(self, name: &str) -> Self {
        Error::Dependency {
            name: name.to_string(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with all dependency context stripped.
    pub fn root_cause(&self) -> &Error {
        let mut err = self;
        while let Error::Dependency { source, .. } = err {
            err = &**source;
        }
        err
    }

    /// Names of the dependencies this error passed through, outermost first.
    pub fn dependency_chain(&self) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut err = self;
        while let Error::Dependency { name, source } = err {
            chain.push(name.as_str());
            err = &**source;
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_chain_and_root_cause() {
        let err = Error::UnsupportedLocation {
            location: "s3://bucket".to_string(),
        }
        .in_dependency("inner")
        .in_dependency("outer");

        assert_eq!(err.dependency_chain(), vec!["outer", "inner"]);
        assert!(matches!(
            err.root_cause(),
            Error::UnsupportedLocation { .. }
        ));
        assert_eq!(
            err.to_string(),
            "dependency `outer`: dependency `inner`: unsupported dependency location `s3://bucket`"
        );
    }

    #[test]
    fn test_cycle_message() {
        let err = Error::DependencyCycle {
            chain: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(err.to_string(), "dependency cycle detected: a -> b -> a");
    }
}
