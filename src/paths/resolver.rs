//! Symbolic path resolution.
//!
//! `{name}` placeholders are looked up in a [`VariableContext`] and replaced
//! in a single pass; replacement text is never rescanned. Resolution is
//! all-or-nothing: one unknown name fails the whole expression.

use crate::paths::canonical::{normalize_lexical, CanonicalPath};
use crate::paths::context::VariableContext;
use crate::paths::error::AccessError;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placeholder<'a> {
    start: usize,
    end: usize,
    name: &'a str,
}

/// Finds every `{name}` in `expression`. A `{` with no closing brace is
/// literal text.
fn scan_placeholders(expression: &str) -> Result<Vec<Placeholder<'_>>, AccessError> {
    let mut placeholders = Vec::new();
    let mut offset = 0;

    while let Some(open) = expression[offset..].find('{') {
        let start = offset + open;
        let after_open = start + 1;
        let Some(close) = expression[after_open..].find('}') else {
            break;
        };
        let name = &expression[after_open..after_open + close];
        if let Some(reason) = malformed_name(name) {
            return Err(AccessError::InvalidExpression {
                expression: expression.to_string(),
                reason: format!("malformed placeholder `{{{name}}}`: {reason}"),
            });
        }
        let end = after_open + close + 1;
        placeholders.push(Placeholder { start, end, name });
        offset = end;
    }

    Ok(placeholders)
}

/// Only names that could never be looked up are malformed. Anything else
/// goes to the context and fails as an unknown variable if absent.
fn malformed_name(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("placeholder name is empty")
    } else if name.contains(['/', '\\']) {
        Some("placeholder name contains a path separator")
    } else if name.contains('{') {
        Some("placeholder name contains a brace")
    } else {
        None
    }
}

/// Rewrites a symbolic path expression into a [`CanonicalPath`].
///
/// # Errors
/// - [`AccessError::UnknownVariable`] for the first placeholder missing from
///   `context`; nothing is substituted in that case.
/// - [`AccessError::PathTraversal`] if the substituted and normalized path has
///   a `..` segment anywhere, wherever it came from.
/// - [`AccessError::InvalidExpression`] for NUL bytes or malformed
///   placeholders, [`AccessError::NotAbsolute`] for a relative result.
pub fn resolve_path(
    expression: &str,
    context: &VariableContext,
) -> Result<CanonicalPath, AccessError> {
    if expression.contains('\0') {
        return Err(AccessError::InvalidExpression {
            expression: expression.escape_default().to_string(),
            reason: "path contains a NUL byte".to_string(),
        });
    }

    let placeholders = scan_placeholders(expression)?;
    let mut values = Vec::with_capacity(placeholders.len());
    for placeholder in &placeholders {
        let Some(value) = context.get(placeholder.name) else {
            debug!(
                variable = placeholder.name,
                expression, "path expression references unknown variable"
            );
            return Err(AccessError::UnknownVariable {
                variable: placeholder.name.to_string(),
                expression: expression.to_string(),
            });
        };
        values.push(value);
    }

    let mut substituted = String::with_capacity(expression.len());
    let mut cursor = 0;
    for (placeholder, value) in placeholders.iter().zip(values) {
        substituted.push_str(&expression[cursor..placeholder.start]);
        substituted.push_str(value.as_str());
        cursor = placeholder.end;
    }
    substituted.push_str(&expression[cursor..]);

    let normalized = normalize_lexical(&substituted);
    if normalized.has_parent_segment {
        warn!(
            expression,
            resolved = %normalized.text,
            "rejected path expression containing a traversal segment"
        );
        return Err(AccessError::PathTraversal {
            path: expression.to_string(),
        });
    }
    if !normalized.absolute {
        return Err(AccessError::NotAbsolute {
            path: normalized.text,
        });
    }

    let canonical = CanonicalPath::from_normalized(normalized);
    debug!(expression, resolved = %canonical, "resolved path expression");
    Ok(canonical)
}
