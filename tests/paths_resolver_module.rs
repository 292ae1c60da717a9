use bundlefs::paths::{
    normalize_lexical, resolve_path, validate_write_path, AccessError, Roots, VariableContext,
    BUNDLE_ROOT, CORE_ROOT, PROJECT_ROOT,
};
use bundlefs::shared::ids::BundleId;
use proptest::prelude::*;
use std::sync::Arc;
use std::thread;

fn sample_roots() -> Roots {
    Roots::new("/proj", "/proj/core", "/proj/bundles", "/proj/agent-outputs").expect("roots")
}

fn bundle_context(bundle: &str) -> VariableContext {
    let bundle = BundleId::parse(bundle).expect("bundle id");
    VariableContext::for_bundle(&sample_roots(), Some(&bundle)).expect("context")
}

#[test]
fn end_to_end_core_path_resolves_but_cannot_be_written() {
    let context = VariableContext::from_pairs([
        (BUNDLE_ROOT, "/proj/bundles/x"),
        (CORE_ROOT, "/proj/core"),
        (PROJECT_ROOT, "/proj"),
    ])
    .expect("context");

    let resolved = resolve_path("{core-root}/tasks/workflow.md", &context).expect("resolve");
    assert_eq!(resolved.as_str(), "/proj/core/tasks/workflow.md");

    let err = validate_write_path(resolved.as_str(), &sample_roots()).expect_err("write denied");
    assert!(matches!(err, AccessError::SecurityViolation { .. }));
    assert!(err.to_string().starts_with("Security violation:"));
}

#[test]
fn output_root_variable_resolves_to_a_writable_path() {
    let resolved = resolve_path("{output-root}/reports/summary.md", &bundle_context("x"))
        .expect("resolve");
    let accepted = validate_write_path(resolved.as_str(), &sample_roots()).expect("writable");
    assert_eq!(accepted.as_str(), "/proj/agent-outputs/reports/summary.md");
}

#[test]
fn bundles_resolve_the_same_expression_independently() {
    let expression = "{bundle-root}/workflows/intake/workflow.yaml";
    let bmm = resolve_path(expression, &bundle_context("bmm")).expect("bmm");
    let cis = resolve_path(expression, &bundle_context("cis")).expect("cis");

    assert_ne!(bmm, cis);
    assert!(bmm.as_str().contains("/bmm/"));
    assert!(cis.as_str().contains("/cis/"));
}

#[test]
fn no_bundle_context_points_at_bundles_root() {
    let context = VariableContext::for_bundle(&sample_roots(), None).expect("context");
    let resolved = resolve_path("{bundle-root}", &context).expect("resolve");
    assert_eq!(resolved.as_str(), "/proj/bundles");
}

#[test]
fn unknown_variable_is_named_in_the_error() {
    let err = resolve_path("{bundle-root}/{docs-root}/a.md", &bundle_context("x"))
        .expect_err("unknown");
    assert!(err.to_string().contains("{docs-root}"), "{err}");
    assert!(!err.is_security_violation());
}

#[test]
fn backslash_parent_segment_is_traversal() {
    let err = resolve_path("{bundle-root}\\..\\..\\etc\\passwd", &bundle_context("x"))
        .expect_err("traversal");
    assert!(matches!(err, AccessError::PathTraversal { .. }));
}

#[test]
fn concurrent_resolution_shares_one_context() {
    let context = Arc::new(bundle_context("x"));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let context = Arc::clone(&context);
            thread::spawn(move || {
                resolve_path(&format!("{{bundle-root}}/agents/a{i}.md"), &context)
                    .expect("resolve")
                    .to_string()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(
            handle.join().expect("join"),
            format!("/proj/bundles/x/agents/a{i}.md")
        );
    }
}

fn segment() -> impl Strategy<Value = String> {
    "[a-z0-9_-]{1,8}"
}

proptest! {
    #[test]
    fn expressions_without_placeholders_equal_their_normalization(
        segments in prop::collection::vec(segment(), 0..6),
        doubled in any::<bool>(),
    ) {
        let separator = if doubled { "//" } else { "/" };
        let expression = format!("/{}", segments.join(separator));
        let resolved = resolve_path(&expression, &bundle_context("x")).expect("resolve");
        prop_assert_eq!(resolved.as_str(), normalize_lexical(&expression).text);
    }

    #[test]
    fn any_parent_segment_is_rejected(
        before in prop::collection::vec(segment(), 0..4),
        after in prop::collection::vec(segment(), 0..4),
    ) {
        let mut parts = before;
        parts.push("..".to_string());
        parts.extend(after);
        let expression = format!("{{bundle-root}}/{}", parts.join("/"));
        let err = resolve_path(&expression, &bundle_context("x")).expect_err("traversal");
        let is_traversal = matches!(err, AccessError::PathTraversal { .. });
        prop_assert!(is_traversal);
    }

    #[test]
    fn resolved_bundle_paths_stay_under_the_bundle_root(
        segments in prop::collection::vec(segment(), 1..6),
    ) {
        let context = bundle_context("x");
        let root = context.get(BUNDLE_ROOT).expect("bundle root").clone();
        let resolved = resolve_path(&format!("{{bundle-root}}/{}", segments.join("/")), &context)
            .expect("resolve");
        prop_assert!(resolved.is_within(&root));
        prop_assert!(!resolved.as_str().contains(".."));
    }
}
