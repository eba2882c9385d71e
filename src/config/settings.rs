use std::path::PathBuf;

/// Tool settings gathered from the environment.
///
/// Priority: explicit CLI flags, then:
/// 1. `$ODM_GIT`: git executable (default `git`)
/// 2. `$ODM_OPA`: opa executable (default `opa`)
/// 3. `$ODM_SHALLOW_CLONE`: `1` / `true` clones with `--depth 1`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub git: PathBuf,
    pub opa: PathBuf,
    pub shallow_clone: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            git: PathBuf::from("git"),
            opa: PathBuf::from("opa"),
            shallow_clone: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Settings::default();
        Settings {
            git: lookup("ODM_GIT")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.git),
            opa: lookup("ODM_OPA")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.opa),
            shallow_clone: lookup("ODM_SHALLOW_CLONE")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.shallow_clone),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
