mod common;
use common::*;
use filter_syntax::*;

#[test]
fn or_has_lower_precedence_than_and() {
    let node = parse_ok("a:1 OR b:2 AND c:3");
    let (left, right) = as_or(&node);
    leaf_is(left, "a", OperatorKind::Equals, 1.0);
    let (b, c) = as_and(right);
    leaf_is(b, "b", OperatorKind::Equals, 2.0);
    leaf_is(c, "c", OperatorKind::Equals, 3.0);
}

#[test]
fn chains_fold_left() {
    let node = parse_ok("a:1 AND b:2 AND c:3");
    let (left, right) = as_and(&node);
    leaf_is(right, "c", OperatorKind::Equals, 3.0);
    let (a, b) = as_and(left);
    leaf_is(a, "a", OperatorKind::Equals, 1.0);
    leaf_is(b, "b", OperatorKind::Equals, 2.0);

    let node = parse_ok("a:1 OR b:2 OR c:3");
    let (left, _) = as_or(&node);
    as_or(left);
}

#[test]
fn not_binds_tighter_than_and() {
    let node = parse_ok("NOT service:api AND status:error");
    let (left, right) = as_and(&node);
    string_leaf_is(as_not(left), "service", "api");
    string_leaf_is(right, "status", "error");
}

#[test]
fn keywords_are_case_insensitive() {
    let node = parse_ok("a:1 and not b:2 or c:3");
    let (left, _) = as_or(&node);
    let (_, negated) = as_and(left);
    as_not(negated);
}

#[test]
fn redundant_parentheses_disappear() {
    let node = parse_ok("(((service:api)))");
    string_leaf_is(&node, "service", "api");
}

#[test]
fn in_lists_hold_typed_values() {
    let node = parse_ok("trace_id:IN (x, y, z)");
    leaf_is(
        &node,
        "trace_id",
        OperatorKind::In,
        Value::List(vec!["x".into(), "y".into(), "z".into()]),
    );

    let node = parse_ok("status:NOT IN (500, 502, \"n/a\")");
    leaf_is(
        &node,
        "status",
        OperatorKind::NotIn,
        Value::List(vec![500.0.into(), 502.0.into(), "n/a".into()]),
    );
    assert_eq!(as_leaf(&node).value_kind(), ValueKind::Number);
}

#[test]
fn single_item_lists_are_still_lists() {
    let node = parse_ok("env:IN (prod)");
    leaf_is(&node, "env", OperatorKind::In, Value::List(vec!["prod".into()]));
}

#[test]
fn equals_sign_is_an_equality_operator() {
    string_leaf_is(&parse_ok("service=api"), "service", "api");
    string_leaf_is(&parse_ok("service = api"), "service", "api");
}

#[test]
fn values_may_look_like_fields_or_keywords() {
    string_leaf_is(&parse_ok("status:status"), "status", "status");
    string_leaf_is(&parse_ok("level:INFO"), "level", "INFO");
    string_leaf_is(&parse_ok("os:android"), "os", "android");
    let node = parse_ok("ANDroid:yes OR ORacle:no");
    let (left, right) = as_or(&node);
    string_leaf_is(left, "ANDroid", "yes");
    string_leaf_is(right, "ORacle", "no");
}

#[test]
fn hyphens_are_values_only() {
    string_leaf_is(&parse_ok("framework:symfony-php"), "framework", "symfony-php");
    let err = parse_err("service-name:api");
    assert_eq!(err.message, "expected operator, found value");
}

#[test]
fn grammar_violations_name_expected_and_found() {
    let cases = [
        ("service::bad", "expected value, found operator"),
        ("service:", "expected value, found end of input"),
        ("service", "expected operator, found end of input"),
        ("(a:1", "expected ')', found end of input"),
        ("a:1)", "expected end of input, found ')'"),
        ("a:1 OR", "expected field or '(', found end of input"),
        ("()", "expected field or '(', found ')'"),
        ("x:IN (a b)", "expected ')', found value"),
        ("x:IN (a,)", "expected value, found ')'"),
        ("\"quoted\":1", "expected field or '(', found value"),
    ];
    for (query, message) in cases {
        assert_eq!(parse_err(query).message, message, "{query}");
    }
}

#[test]
fn blank_input_has_no_ast() {
    assert_eq!(parse_query("").unwrap(), None);
    assert_eq!(parse_query(" \t\r\n").unwrap(), None);
}

#[test]
fn deep_nesting_parses() {
    let depth = 64;
    let query = format!("{}a:1{}", "(".repeat(depth), ")".repeat(depth));
    leaf_is(&parse_ok(&query), "a", OperatorKind::Equals, 1.0);

    let chain = (0..200).map(|i| format!("f{i}:{i}")).collect::<Vec<_>>().join(" AND ");
    let node = parse_ok(&chain);
    assert_eq!(node.comparisons().count(), 200);
}
