// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Module identifiers: parsing, normalization, and canonical string forms.
//!
//! An identifier names either a repository on the remote host
//! (`github:<owner>/<name>[#<tag>]`) or a module on the local filesystem
//! (`local:<abs-path>`). The canonical string form is the primary key for
//! every registry record, so parsing must round-trip exactly.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use crate::error::ModuleError;

const REMOTE_PREFIX: &str = "github:";
const LOCAL_PREFIX: &str = "local:";

/// A parsed module identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    /// Module hosted on the remote code host.
    Remote { owner: String, name: String, tag: Option<String> },
    /// Module on the local filesystem. Always an absolute, normalized path.
    Local(PathBuf),
}

impl Identifier {
    /// Parse an identifier from its string form.
    ///
    /// Accepts `github:<owner>/<name>[#<tag>]`, `local:<abs-path>`, and
    /// `local:~<rest>` (home-expanded). Anything else is an invalid path.
    pub fn parse(s: &str) -> Result<Self, ModuleError> {
        if let Some(rest) = s.strip_prefix(REMOTE_PREFIX) {
            return parse_remote(rest);
        }
        if let Some(rest) = s.strip_prefix(LOCAL_PREFIX) {
            return parse_local(rest);
        }
        Err(ModuleError::InvalidPath(format!("unrecognized identifier: {s:?}")))
    }

    /// The canonical string form (round-trips through [`Identifier::parse`]).
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Returns the tag for remote identifiers, if any.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Identifier::Remote { tag, .. } => tag.as_deref(),
            Identifier::Local(_) => None,
        }
    }

    /// Returns a copy with the tag replaced (remote identifiers only).
    pub fn with_tag(&self, tag: impl Into<String>) -> Self {
        match self {
            Identifier::Remote { owner, name, .. } => Identifier::Remote {
                owner: owner.clone(),
                name: name.clone(),
                tag: Some(tag.into()),
            },
            Identifier::Local(p) => Identifier::Local(p.clone()),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Identifier::Local(_))
    }
}

fn parse_remote(rest: &str) -> Result<Identifier, ModuleError> {
    let (owner, repo) = rest
        .split_once('/')
        .ok_or_else(|| ModuleError::InvalidPath(format!("missing '/' in {rest:?}")))?;
    let (name, tag) = match repo.split_once('#') {
        Some((name, tag)) => (name, Some(tag)),
        None => (repo, None),
    };

    check_segment(owner)?;
    check_segment(name)?;
    if let Some(tag) = tag {
        check_segment(tag)?;
    }

    Ok(Identifier::Remote {
        owner: owner.to_string(),
        name: name.to_string(),
        tag: tag.map(str::to_string),
    })
}

fn parse_local(rest: &str) -> Result<Identifier, ModuleError> {
    if rest.is_empty() {
        return Err(ModuleError::InvalidPath("empty local path".to_string()));
    }

    let expanded = expand_home(rest)?;
    if !expanded.is_absolute() {
        return Err(ModuleError::InvalidPath(format!("local path not absolute: {rest:?}")));
    }

    let normalized = normalize(&expanded)
        .ok_or_else(|| ModuleError::InvalidPath(format!("local path escapes root: {rest:?}")))?;
    Ok(Identifier::Local(normalized))
}

/// Expand a leading `~` to the current user's home directory.
fn expand_home(raw: &str) -> Result<PathBuf, ModuleError> {
    if raw == "~" {
        return home_dir();
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        return Ok(home_dir()?.join(rest));
    }
    if raw.starts_with('~') {
        // `~user` expansion is not supported
        return Err(ModuleError::InvalidPath(format!("unsupported home reference: {raw:?}")));
    }
    Ok(PathBuf::from(raw))
}

fn home_dir() -> Result<PathBuf, ModuleError> {
    dirs::home_dir().ok_or_else(|| ModuleError::InvalidPath("no home directory".to_string()))
}

/// Lexically normalize a path: drop `.` segments, resolve `..` against the
/// parent, and strip trailing separators. Returns `None` if a `..` segment
/// would climb past the root.
fn normalize(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::RootDir | Component::Prefix(_) => out.push(comp.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    return None;
                }
                // Popping the root itself also escapes
                if out.as_os_str().is_empty() {
                    return None;
                }
            }
            Component::Normal(c) => out.push(c),
        }
    }
    Some(out)
}

/// Owner, name, and tag segments are restricted to `[A-Za-z0-9._-]`.
fn check_segment(s: &str) -> Result<(), ModuleError> {
    if s.is_empty() {
        return Err(ModuleError::InvalidPath("empty identifier segment".to_string()));
    }
    match s.chars().find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '.' | '_' | '-')) {
        Some(c) => Err(ModuleError::InvalidPath(format!("illegal character {c:?} in {s:?}"))),
        None => Ok(()),
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Remote { owner, name, tag: Some(tag) } => {
                write!(f, "{REMOTE_PREFIX}{owner}/{name}#{tag}")
            }
            Identifier::Remote { owner, name, tag: None } => {
                write!(f, "{REMOTE_PREFIX}{owner}/{name}")
            }
            Identifier::Local(path) => write!(f, "{LOCAL_PREFIX}{}", path.display()),
        }
    }
}

impl FromStr for Identifier {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identifier::parse(s)
    }
}

impl serde::Serialize for Identifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Identifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Identifier::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "identifier_tests.rs"]
mod tests;
