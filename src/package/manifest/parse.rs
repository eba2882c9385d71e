use std::collections::BTreeMap;

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use super::{Dependencies, Dependency, DependencyInfo};

// ─── Declaration Forms ─────────────────────────────────────────────

/// One entry of the `dependencies:` map as written in `opa.project`.
///
/// ```yaml
/// dependencies:
///   lib: file:../lib                      # Bare
///   util:                                 # Structured
///     location: git+https://host/util#v2
///     namespace: tools
///   raw:                                  # Structured, not namespaced
///     location: file:../raw
///     namespace: false
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub(super) enum Declaration {
    Bare(String),
    Structured {
        location: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        namespace: Option<NamespaceDecl>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub(super) enum NamespaceDecl {
    /// `true` means "use the key", `false` disables namespacing.
    Enabled(bool),
    Named(String),
}

impl Declaration {
    /// Interpret the declaration found under `key`.
    pub(super) fn into_info(self, key: &str) -> DependencyInfo {
        match self {
            Declaration::Bare(location) => DependencyInfo::new(location, Some(key.to_string())),
            Declaration::Structured {
                location,
                namespace,
            } => {
                let namespace = match namespace {
                    None | Some(NamespaceDecl::Enabled(true)) => Some(key.to_string()),
                    Some(NamespaceDecl::Enabled(false)) => None,
                    Some(NamespaceDecl::Named(ns)) => Some(ns),
                };
                DependencyInfo::new(location, namespace)
            }
        }
    }

    /// The most compact declaration that reads back as `dep`.
    pub(super) fn from_dependency(dep: &Dependency) -> Self {
        let location = dep.info.location.clone();
        match dep.namespace() {
            Some(ns) if ns == dep.name => Declaration::Bare(location),
            Some(ns) => Declaration::Structured {
                location,
                namespace: Some(NamespaceDecl::Named(ns.to_string())),
            },
            None => Declaration::Structured {
                location,
                namespace: Some(NamespaceDecl::Enabled(false)),
            },
        }
    }
}

// ─── Serde ─────────────────────────────────────────────────────────

impl Serialize for Dependencies {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, dep) in self.iter() {
            map.serialize_entry(name, &Declaration::from_dependency(dep))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Dependencies {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // `dependencies:` with no entries reads as null.
        let raw: Option<BTreeMap<String, Declaration>> = Option::deserialize(deserializer)?;
        Ok(raw
            .unwrap_or_default()
            .into_iter()
            .map(|(key, decl)| {
                let info = decl.into_info(&key);
                (key, info)
            })
            .collect())
    }
}
