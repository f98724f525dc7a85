//! Access decision integration tests
//!
//! Covers the ACL matching rules end to end:
//! - empty requirements and empty ACLs
//! - the `* *` full wildcard and method wildcards
//! - multi-segment `*` and single-segment `:param` path patterns
//! - OR semantics across requirements and across grants
//! - actions without a method token

use grid::access_control::{
    AccessControlEntry, AccessDecision, AclIndex, PathPattern, authorize, is_authorized,
};
use rstest::rstest;

// =============================================================================
// Test Helpers
// =============================================================================

fn acl(actions: &[&str]) -> Vec<AccessControlEntry> {
    vec![AccessControlEntry::new(actions.iter().copied())]
}

const NO_REQUIREMENTS: &[&str] = &[];

// =============================================================================
// 1. Degenerate inputs
// =============================================================================

mod degenerate_inputs {
    use super::*;

    #[test]
    fn test_no_requirements_always_allowed() {
        assert!(is_authorized(&[], NO_REQUIREMENTS));
        assert!(is_authorized(&acl(&["GET /a"]), NO_REQUIREMENTS));
    }

    #[test]
    fn test_empty_acl_denies() {
        assert!(!is_authorized(&[], &["GET /tasks-service/x"]));
    }

    #[test]
    fn test_entries_without_actions_deny() {
        let acl = vec![AccessControlEntry::default(), AccessControlEntry::default()];
        assert!(!is_authorized(&acl, &["GET /tasks-service/x"]));
    }

    #[test]
    fn test_denial_reason_names_requirements() {
        let decision = authorize(&acl(&["GET /a"]), &["POST /b", "PUT /c"]);
        match decision {
            AccessDecision::Denied(reason) => {
                assert!(reason.contains("POST /b"));
                assert!(reason.contains("PUT /c"));
            }
            AccessDecision::Allowed => panic!("expected denial"),
        }
    }

    #[test]
    fn test_empty_acl_reason() {
        assert_eq!(
            authorize(&[], &["GET /a"]),
            AccessDecision::Denied("user has no ACL entries".to_string())
        );
    }
}

// =============================================================================
// 2. Wildcards
// =============================================================================

mod wildcards {
    use super::*;

    #[rstest]
    #[case("GET /anything")]
    #[case("DELETE /users/1/roles")]
    #[case("PATCH /")]
    #[case("/no-method")]
    fn test_full_wildcard_grants_everything(#[case] required: &str) {
        assert!(is_authorized(&acl(&["* *"]), &[required]));
    }

    #[rstest]
    #[case("GET /users/1", true)]
    #[case("POST /users/1", true)]
    #[case("DELETE /users/1", true)]
    #[case("GET /groups/1", false)]
    fn test_method_wildcard(#[case] required: &str, #[case] expected: bool) {
        assert_eq!(is_authorized(&acl(&["* /users/:id"]), &[required]), expected);
    }

    #[rstest]
    #[case("GET /tasks-service/abc", true)]
    #[case("GET /tasks-service/abc/def", true)]
    #[case("GET /tasks-service/abc/def/ghi", true)]
    #[case("POST /tasks-service/abc", false)]
    #[case("GET /tasks-service", false)]
    #[case("GET /other-service/abc", false)]
    fn test_trailing_wildcard_spans_segments(#[case] required: &str, #[case] expected: bool) {
        assert_eq!(
            is_authorized(&acl(&["GET /tasks-service/*"]), &[required]),
            expected
        );
    }

    #[test]
    fn test_path_wildcard_with_specific_method() {
        let acl = acl(&["GET *"]);
        assert!(is_authorized(&acl, &["GET /anything/at/all"]));
        assert!(!is_authorized(&acl, &["POST /anything"]));
    }

    #[test]
    fn test_double_star_acts_as_single_wildcard() {
        let acl = acl(&["GET /files/**"]);
        assert!(is_authorized(&acl, &["GET /files/a/b/c"]));
        assert!(!is_authorized(&acl, &["GET /docs/a"]));
    }
}

// =============================================================================
// 3. Exact and parameterised paths
// =============================================================================

mod paths {
    use super::*;

    #[test]
    fn test_exact_match() {
        let acl = acl(&["GET /tasks-service/list"]);
        assert!(is_authorized(&acl, &["GET /tasks-service/list"]));
        assert!(!is_authorized(&acl, &["GET /tasks-service/list/1"]));
        assert!(!is_authorized(&acl, &["POST /tasks-service/list"]));
    }

    #[test]
    fn test_required_pattern_matches_identical_grant() {
        assert!(is_authorized(
            &acl(&["GET /tasks-service/*"]),
            &["GET /tasks-service/*"]
        ));
    }

    #[rstest]
    #[case("GET /users/42", true)]
    #[case("GET /users/abc-def", true)]
    #[case("GET /users/42/roles", false)]
    #[case("GET /users/", false)]
    #[case("GET /users", false)]
    fn test_param_matches_one_segment(#[case] required: &str, #[case] expected: bool) {
        assert_eq!(is_authorized(&acl(&["GET /users/:id"]), &[required]), expected);
    }

    #[test]
    fn test_params_between_literals() {
        let acl = acl(&["PUT /orgs/:org/members/:member"]);
        assert!(is_authorized(&acl, &["PUT /orgs/acme/members/7"]));
        assert!(!is_authorized(&acl, &["PUT /orgs/acme/teams/7"]));
        assert!(!is_authorized(&acl, &["PUT /orgs/acme/x/members/7"]));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let acl = acl(&["GET /reports/q1.csv"]);
        assert!(is_authorized(&acl, &["GET /reports/q1.csv"]));
        assert!(!is_authorized(&acl, &["GET /reports/q1xcsv"]));
    }

    #[test]
    fn test_trailing_slash_is_significant() {
        let acl = acl(&["GET /tasks"]);
        assert!(!is_authorized(&acl, &["GET /tasks/"]));
    }
}

// =============================================================================
// 4. OR semantics
// =============================================================================

mod or_semantics {
    use super::*;

    #[test]
    fn test_any_requirement_suffices() {
        let acl = acl(&["GET /b"]);
        assert!(is_authorized(&acl, &["GET /a", "GET /b"]));
        assert!(!is_authorized(&acl, &["GET /a", "GET /c"]));
    }

    #[test]
    fn test_grants_merge_across_entries() {
        let acl = vec![
            AccessControlEntry::new(["GET /users/:id"]),
            AccessControlEntry::new(["POST /users/:id"]),
        ];
        assert!(is_authorized(&acl, &["GET /users/1"]));
        assert!(is_authorized(&acl, &["POST /users/1"]));
        assert!(!is_authorized(&acl, &["DELETE /users/1"]));
    }

    #[test]
    fn test_index_merges_methods_per_path() {
        let index = AclIndex::build(&[
            AccessControlEntry::new(["GET /a", "POST /a"]),
            AccessControlEntry::new(["DELETE /a", "GET /b"]),
        ]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.methods("/a").map(|m| m.len()), Some(3));
        assert!(index.methods("/c").is_none());
    }
}

// =============================================================================
// 5. Actions without a method
// =============================================================================

mod bare_paths {
    use super::*;

    #[test]
    fn test_bare_path_grants_any_method_on_that_path() {
        let acl = acl(&["/health"]);
        assert!(is_authorized(&acl, &["GET /health"]));
        assert!(is_authorized(&acl, &["POST /health"]));
        assert!(!is_authorized(&acl, &["GET /other"]));
    }

    #[test]
    fn test_bare_star_grants_everything() {
        assert!(is_authorized(&acl(&["*"]), &["GET /anything"]));
    }

    #[test]
    fn test_bare_literal_never_widens() {
        assert!(!is_authorized(&acl(&["garbage"]), &["GET /anything"]));
        assert!(is_authorized(&acl(&["garbage"]), &["GET garbage"]));
    }
}

// =============================================================================
// 6. Determinism
// =============================================================================

#[test]
fn test_decision_is_idempotent() {
    let acl = acl(&["GET /tasks-service/*", "* /users/:id"]);
    let required = ["GET /tasks-service/x", "DELETE /users/9"];

    let first = authorize(&acl, &required);
    for _ in 0..10 {
        assert_eq!(authorize(&acl, &required), first);
    }
}

#[test]
fn test_pattern_keeps_source() {
    let pattern = PathPattern::compile("/files/:id");
    assert_eq!(pattern.as_str(), "/files/:id");
    assert!(pattern.matches("/files/1"));
    assert!(!pattern.matches(""));
}
