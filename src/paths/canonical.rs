//! Lexical path normalization and the [`CanonicalPath`] newtype.
//!
//! Everything here is string-level: no filesystem access, no symlink
//! resolution. Paths are POSIX-style; a backslash is treated as a separator
//! so `a\..\b` cannot smuggle a parent segment past the checks.

use crate::paths::error::AccessError;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Result of [`normalize_lexical`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    pub absolute: bool,
    /// A `..` segment survived normalization. `..` is never folded into its
    /// parent: its presence alone is what callers reject.
    pub has_parent_segment: bool,
}

/// Collapses separator runs, drops `.` segments and trailing separators.
pub fn normalize_lexical(raw: &str) -> Normalized {
    let unified = raw.replace('\\', "/");
    let absolute = unified.starts_with('/');
    let mut has_parent_segment = false;
    let mut segments = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                has_parent_segment = true;
                segments.push(segment);
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    let text = if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    };
    Normalized {
        text,
        absolute,
        has_parent_segment,
    }
}

/// Absolute, normalized, traversal-free path. The only form handed to
/// filesystem operations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalPath(String);

impl CanonicalPath {
    /// Normalizes `raw` and rejects anything that is not absolute or still
    /// carries a `..` segment.
    pub fn parse(raw: &str) -> Result<Self, AccessError> {
        if raw.contains('\0') {
            return Err(AccessError::InvalidExpression {
                expression: raw.escape_default().to_string(),
                reason: "path contains a NUL byte".to_string(),
            });
        }
        let normalized = normalize_lexical(raw);
        if normalized.has_parent_segment {
            return Err(AccessError::PathTraversal {
                path: raw.to_string(),
            });
        }
        if !normalized.absolute {
            return Err(AccessError::NotAbsolute {
                path: raw.to_string(),
            });
        }
        Ok(Self(normalized.text))
    }

    pub fn from_path(path: &Path) -> Result<Self, AccessError> {
        let raw = path.to_str().ok_or_else(|| AccessError::InvalidExpression {
            expression: path.display().to_string(),
            reason: "path is not valid UTF-8".to_string(),
        })?;
        Self::parse(raw)
    }

    pub(crate) fn from_normalized(normalized: Normalized) -> Self {
        debug_assert!(normalized.absolute && !normalized.has_parent_segment);
        Self(normalized.text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Boundary-safe containment: equal to `root`, or below it with a
    /// separator right after the root. `/data/out-fake` is not within
    /// `/data/out`.
    pub fn is_within(&self, root: &CanonicalPath) -> bool {
        if self.0 == root.0 {
            return true;
        }
        if root.0 == "/" {
            return true;
        }
        self.0
            .strip_prefix(root.0.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Appends a single already-validated segment.
    pub(crate) fn join_segment(&self, segment: &str) -> Result<Self, AccessError> {
        Self::parse(&format!("{}/{}", self.0, segment))
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<Path> for CanonicalPath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

impl AsRef<str> for CanonicalPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
