use crate::paths::canonical::{normalize_lexical, CanonicalPath};
use crate::paths::error::{AccessError, AccessKind};
use crate::paths::roots::Roots;
use tracing::warn;

/// The single write allow-list entry, taken from configuration.
///
/// Independent of the resolver: callers may hand it any string, so it
/// re-normalizes and re-checks traversal on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteGuard {
    output_root: CanonicalPath,
}

impl WriteGuard {
    pub fn new(roots: &Roots) -> Self {
        Self {
            output_root: roots.output_root.clone(),
        }
    }

    pub fn output_root(&self) -> &CanonicalPath {
        &self.output_root
    }

    /// Accepts the output root itself or a proper descendant of it and
    /// returns the normalized candidate. Anything else is a
    /// [`AccessError::SecurityViolation`].
    pub fn validate_write_path(&self, candidate: &str) -> Result<CanonicalPath, AccessError> {
        let reject = |reason: &str| -> Result<CanonicalPath, AccessError> {
            warn!(
                candidate,
                output_root = %self.output_root,
                reason,
                "rejected write path"
            );
            Err(AccessError::denied(AccessKind::Write, candidate, reason))
        };

        if candidate.contains('\0') {
            return reject("path contains a NUL byte");
        }
        let normalized = normalize_lexical(candidate);
        if normalized.has_parent_segment {
            return reject("path traversal segment");
        }
        if !normalized.absolute {
            return reject("path must be absolute");
        }

        let path = CanonicalPath::from_normalized(normalized);
        if !path.is_within(&self.output_root) {
            return reject("outside the output root");
        }
        Ok(path)
    }
}

/// Free-function form of [`WriteGuard::validate_write_path`] for callers
/// holding only the configured roots.
pub fn validate_write_path(candidate: &str, roots: &Roots) -> Result<CanonicalPath, AccessError> {
    WriteGuard::new(roots).validate_write_path(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> WriteGuard {
        let roots = Roots::new("/data", "/data/core", "/data/bundles", "/data/agent-outputs")
            .expect("roots");
        WriteGuard::new(&roots)
    }

    #[test]
    fn accepts_root_and_descendants() {
        let guard = guard();
        for candidate in [
            "/data/agent-outputs",
            "/data/agent-outputs/",
            "/data/agent-outputs/run-1/report.md",
            "/data//agent-outputs/./run-1//report.md",
        ] {
            let accepted = guard.validate_write_path(candidate).expect(candidate);
            assert!(accepted.as_str().starts_with("/data/agent-outputs"));
        }
    }

    #[test]
    fn rejects_prefix_siblings() {
        let guard = guard();
        for candidate in [
            "/data/agent-outputs-fake",
            "/data/agent-outputs-fake/x.md",
            "/data/agent-out",
            "/data/agent-outputsx",
        ] {
            let err = guard.validate_write_path(candidate).expect_err(candidate);
            assert!(matches!(err, AccessError::SecurityViolation { .. }), "{candidate}");
        }
    }

    #[test]
    fn rejects_everything_outside_the_output_root() {
        let guard = guard();
        for candidate in [
            "/data",
            "/data/core/tasks/workflow.md",
            "/data/src/main.rs",
            "/data/.git/config",
            "/data/node_modules/pkg/index.js",
            "/tmp/out.md",
            "/",
        ] {
            let err = guard.validate_write_path(candidate).expect_err(candidate);
            assert!(err.to_string().starts_with("Security violation:"), "{err}");
        }
    }

    #[test]
    fn rejects_traversal_relative_and_nul_candidates() {
        let guard = guard();
        for candidate in [
            "/data/agent-outputs/../secrets",
            "/data/agent-outputs/a/../b.md",
            "agent-outputs/x.md",
            "/data/agent-outputs/a\0b",
        ] {
            let err = guard.validate_write_path(candidate).expect_err(candidate);
            assert!(err.is_security_violation(), "{candidate}: {err}");
        }
    }

    #[test]
    fn free_function_uses_configured_output_root() {
        let roots = Roots::new("/proj", "/proj/core", "/proj/bundles", "/proj/out")
            .expect("roots");
        assert!(validate_write_path("/proj/out/a.md", &roots).is_ok());
        assert!(validate_write_path("/proj/core/a.md", &roots).is_err());
    }
}
