use filter_syntax::*;

fn assert_valid(query: &str) {
    let verdict = validate_filter_query(query);
    assert!(verdict.valid, "{query:?}: {:?}", verdict.error);
    assert!(verdict.error.is_none(), "{query:?}");
}

fn assert_invalid(query: &str) -> String {
    let verdict = validate_filter_query(query);
    assert!(!verdict.valid, "{query:?} should be rejected");
    verdict.error.expect("invalid verdict without message")
}

#[test]
fn prefixes_ending_at_token_boundaries_are_accepted() {
    let query = "service:api AND NOT duration_ms:>=500 OR id:IN (a, b)";
    for end in [0, 7, 8, 11, 15, 19, 31, 34, 37, 40, 43, 46, 48, 50] {
        assert_valid(&query[..end]);
    }
}

#[test]
fn keystroke_sequences_stay_quiet() {
    for q in [
        "s",
        "se",
        "service",
        "service:",
        "service:a",
        "service:api ",
        "service:api AND",
        "service:api AND ",
        "service:api AND NOT",
        "service:api AND NOT (",
        "url:NOT",
        "url:NOT ",
        "url:NOT LIKE",
        "url:NOT LIKE ",
        "trace_id:in ( abc ,",
    ] {
        assert_valid(q);
    }
}

#[test]
fn typing_inside_an_open_group_or_list_stays_quiet() {
    for q in [
        "trace_id:IN (abc12",
        "trace_id:IN (abc123, def",
        "(status:error OR status:timeout",
        "service:api AND (a:1",
        "((a:1 AND b:2) OR c:3",
        "NOT (env:dev",
    ] {
        assert_valid(q);
    }
}

#[test]
fn closed_groups_still_need_valid_content() {
    // The group is closed, so running out of input is not the problem.
    assert_eq!(assert_invalid("(a:1) b:2"), "expected end of input, found field");
    assert_eq!(assert_invalid("(a:1 b:2"), "expected ')', found field");
    assert_eq!(assert_invalid("x:IN (a b"), "expected ')', found value");
}

#[test]
fn structural_mistakes_are_reported() {
    assert_eq!(assert_invalid("service::api"), "expected value, found operator");
    assert_eq!(assert_invalid("a:1)"), "expected end of input, found ')'");
    assert_eq!(assert_invalid("AND a:1"), "expected field or '(', found logical operator");
    assert_eq!(assert_invalid("a:1 b:2"), "expected end of input, found field");
    assert_eq!(assert_invalid("x:IN a"), "expected '(', found value");
}

#[test]
fn half_typed_keywords_are_not_tolerated() {
    // `AN` is read as the next field, which cannot follow a condition.
    assert_eq!(assert_invalid("service:api AN"), "expected end of input, found field");
}

#[test]
fn error_text_has_no_position_suffix() {
    let message = assert_invalid("service::api");
    assert!(!message.contains("at byte"));
}
