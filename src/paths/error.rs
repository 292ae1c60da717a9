use std::fmt;

/// Message shown to end users for every security rejection. Full detail
/// stays in the server-side log.
pub const PUBLIC_SECURITY_MESSAGE: &str = "Security violation: access denied";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

impl AccessKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("unknown variable `{{{variable}}}` in path expression `{expression}`")]
    UnknownVariable {
        variable: String,
        expression: String,
    },
    #[error("invalid path expression `{expression}`: {reason}")]
    InvalidExpression { expression: String, reason: String },
    #[error("invalid variable `{name}`: {reason}")]
    InvalidVariable { name: String, reason: String },
    #[error("path `{path}` is not absolute")]
    NotAbsolute { path: String },
    #[error("Security violation: path traversal detected in `{path}`")]
    PathTraversal { path: String },
    #[error("Security violation: {access} access denied for `{path}`: {reason}")]
    SecurityViolation {
        access: AccessKind,
        path: String,
        reason: String,
    },
    #[error("Security violation: `{path}` resolves through a symlink to `{target}` outside the allowed roots")]
    SymlinkEscape { path: String, target: String },
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl AccessError {
    pub fn is_security_violation(&self) -> bool {
        matches!(
            self,
            Self::PathTraversal { .. } | Self::SecurityViolation { .. } | Self::SymlinkEscape { .. }
        )
    }

    /// Text safe to show to an end user: security rejections collapse to a
    /// generic message, everything else keeps its detail.
    pub fn public_message(&self) -> String {
        if self.is_security_violation() {
            PUBLIC_SECURITY_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }

    pub(crate) fn denied(access: AccessKind, path: &str, reason: impl Into<String>) -> Self {
        Self::SecurityViolation {
            access,
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_variants_share_message_prefix() {
        let errors = [
            AccessError::PathTraversal {
                path: "/a/../b".to_string(),
            },
            AccessError::denied(AccessKind::Write, "/etc/passwd", "outside output root"),
            AccessError::SymlinkEscape {
                path: "/out/link".to_string(),
                target: "/etc".to_string(),
            },
        ];
        for err in errors {
            assert!(err.is_security_violation());
            assert!(
                err.to_string().starts_with("Security violation:"),
                "unexpected message: {err}"
            );
            assert_eq!(err.public_message(), PUBLIC_SECURITY_MESSAGE);
        }
    }

    #[test]
    fn unknown_variable_names_the_placeholder() {
        let err = AccessError::UnknownVariable {
            variable: "missing".to_string(),
            expression: "{missing}/x".to_string(),
        };
        assert!(!err.is_security_violation());
        assert_eq!(
            err.public_message(),
            "unknown variable `{missing}` in path expression `{missing}/x`"
        );
    }
}
