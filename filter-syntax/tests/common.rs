#![allow(dead_code)]
//! Shared helpers for `filter-syntax` integration tests.

use filter_syntax::*;

pub fn parse_ok(input: &str) -> Node {
    match parse_query(input) {
        Ok(Some(node)) => node,
        Ok(None) => panic!("expected an AST for {input:?}"),
        Err(err) => panic!("failed to parse {input:?}: {err}"),
    }
}

pub fn parse_err(input: &str) -> ParseError {
    parse_query(input).unwrap_err()
}

pub fn as_and(node: &Node) -> (&Node, &Node) {
    match node {
        Node::And(left, right) => (left, right),
        other => panic!("expected And, got: {other:?}"),
    }
}

pub fn as_or(node: &Node) -> (&Node, &Node) {
    match node {
        Node::Or(left, right) => (left, right),
        other => panic!("expected Or, got: {other:?}"),
    }
}

pub fn as_not(node: &Node) -> &Node {
    match node {
        Node::Not(operand) => operand,
        other => panic!("expected Not, got: {other:?}"),
    }
}

pub fn as_leaf(node: &Node) -> &Comparison {
    match node {
        Node::Comparison(comparison) => comparison,
        other => panic!("expected Comparison, got: {other:?}"),
    }
}

pub fn leaf_is(node: &Node, field: &str, operator: OperatorKind, value: impl Into<Value>) {
    let leaf = as_leaf(node);
    assert_eq!(leaf.field, field);
    assert_eq!(leaf.operator, operator);
    assert_eq!(leaf.value, value.into());
}

pub fn string_leaf_is(node: &Node, field: &str, value: &str) {
    leaf_is(node, field, OperatorKind::Equals, value);
}

/// Parses, prints and parses again; both trees must agree.
pub fn assert_round_trip(input: &str) {
    let first = parse_ok(input);
    let printed = to_query_string(&first);
    let second = parse_query(&printed)
        .unwrap_or_else(|err| panic!("canonical form {printed:?} of {input:?} failed: {err}"))
        .unwrap_or_else(|| panic!("canonical form {printed:?} of {input:?} is blank"));
    assert_eq!(first, second, "{input:?} -> {printed:?}");
}

pub fn chip_texts(query: &str) -> Vec<&str> {
    extract_chips_with_positions(query)
        .iter()
        .map(|chip| chip.text(query).expect("chip span out of range"))
        .collect()
}
