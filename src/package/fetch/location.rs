use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

const GIT_PREFIX: &str = "git+";
const FILE_PREFIX: &str = "file:";

/// A parsed dependency location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Location {
    /// `git+<url>[#<ref>]`
    Git {
        url: String,
        reference: Option<String>,
    },
    /// Absolute, normalized filesystem path.
    Local(PathBuf),
}

impl Location {
    /// Parse a location string. Relative local paths are resolved against
    /// `base_dir`, the directory of the manifest that declared them.
    pub fn parse(raw: &str, base_dir: &Path) -> Result<Location> {
        if let Some(rest) = raw.strip_prefix(GIT_PREFIX) {
            return parse_git(raw, rest);
        }

        let path = match raw.strip_prefix(FILE_PREFIX) {
            Some(rest) => rest.strip_prefix("//").unwrap_or(rest),
            None if has_scheme(raw) => {
                return Err(Error::UnsupportedLocation {
                    location: raw.to_string(),
                })
            }
            None => raw,
        };

        if path.is_empty() {
            return Err(Error::InvalidLocation {
                location: raw.to_string(),
                reason: "empty path".to_string(),
            });
        }

        let expanded = expand_path(raw, path)?;
        let absolute = if expanded.is_absolute() {
            expanded
        } else {
            base_dir.join(expanded)
        };
        Ok(Location::Local(normalize(&absolute)))
    }
}

/// Split `<url>[#<ref>]`; at most one `#` is allowed.
fn parse_git(raw: &str, rest: &str) -> Result<Location> {
    let parts: Vec<&str> = rest.split('#').collect();
    if parts.len() > 2 {
        return Err(Error::InvalidLocation {
            location: raw.to_string(),
            reason: "only one tag separator '#' allowed".to_string(),
        });
    }
    let url = parts[0];
    if url.is_empty() {
        return Err(Error::InvalidLocation {
            location: raw.to_string(),
            reason: "missing repository url".to_string(),
        });
    }
    let reference = parts
        .get(1)
        .filter(|r| !r.is_empty())
        .map(|r| r.to_string());
    Ok(Location::Git {
        url: url.to_string(),
        reference,
    })
}

/// `scheme:` prefix of at least two characters. Single letters are left
/// alone so `C:\...` stays a path.
fn has_scheme(s: &str) -> bool {
    let Some((scheme, _)) = s.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    scheme.len() >= 2
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

// ─── Path Expansion ────────────────────────────────────────────────

/// Expand a leading `~` and `$VAR` / `${VAR}` references.
fn expand_path(raw: &str, path: &str) -> Result<PathBuf> {
    let unset = |name: &str| Error::InvalidLocation {
        location: raw.to_string(),
        reason: format!("environment variable `{}` is not set", name),
    };

    let mut out = String::with_capacity(path.len());
    let mut rest = path;

    if rest == "~" || rest.starts_with("~/") {
        let home = std::env::var("HOME").map_err(|_| unset("HOME"))?;
        out.push_str(&home);
        rest = &rest[1..];
    }

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => {
                    return Err(Error::InvalidLocation {
                        location: raw.to_string(),
                        reason: "unterminated `${`".to_string(),
                    })
                }
            }
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };

        if name.is_empty() {
            out.push('$');
            rest = after;
            continue;
        }
        let value = std::env::var(name).map_err(|_| unset(name))?;
        out.push_str(&value);
        rest = &after[consumed..];
    }
    out.push_str(rest);

    Ok(PathBuf::from(out))
}

/// Lexically remove `.` and `..` components.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
