use crate::ast::{Comparison, LogicalOp, Node, Value};
use crate::lexer::{is_field_char, numeric_literal_len};
use std::fmt::{self, Write as _};

/// Prints a node as query text.
///
/// Output is canonical rather than minimal: both operands of AND/OR are
/// parenthesized, NOT always wraps its operand, and operators use their
/// canonical symbol. Parsing the output gives back an equal tree, with one
/// exception: the grammar only escapes the quote character, so a string that
/// needs quotes and ends in a backslash (`C:\dir\`) cannot be written and
/// reads back with a trailing quote instead.
///
/// ```
/// use filter_syntax::{parse_query, to_query_string};
/// let node = parse_query("a:1 or b = 2 and NOT c:>3").unwrap().unwrap();
/// assert_eq!(to_query_string(&node), "(a:1) OR ((b:2) AND (NOT (c:>3)))");
/// ```
pub fn to_query_string(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Comparison(comparison) => write_comparison(out, comparison),
        Node::Not(operand) => {
            out.push_str("NOT (");
            write_node(out, operand);
            out.push(')');
        }
        Node::And(left, right) => write_binary(out, left, LogicalOp::And, right),
        Node::Or(left, right) => write_binary(out, left, LogicalOp::Or, right),
    }
}

fn write_binary(out: &mut String, left: &Node, op: LogicalOp, right: &Node) {
    write_operand(out, left);
    out.push(' ');
    out.push_str(op.keyword());
    out.push(' ');
    write_operand(out, right);
}

fn write_operand(out: &mut String, node: &Node) {
    out.push('(');
    write_node(out, node);
    out.push(')');
}

fn write_comparison(out: &mut String, comparison: &Comparison) {
    out.push_str(&comparison.field);
    out.push_str(comparison.operator.symbol());
    if comparison.operator.is_word() {
        out.push(' ');
    }
    write_value(out, &comparison.value);
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::String(text) => write_string(out, text),
        Value::Number(number) => {
            let _ = write!(out, "{number}");
        }
        Value::Boolean(flag) => out.push_str(if *flag { "true" } else { "false" }),
        Value::List(items) => {
            out.push('(');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                write_value(out, item);
            }
            out.push(')');
        }
    }
}

fn write_string(out: &mut String, text: &str) {
    if !needs_quotes(text) {
        out.push_str(text);
        return;
    }
    out.push('"');
    for ch in text.chars() {
        if ch == '"' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
}

// Spaces and colons always force quotes. Anything the lexer would read back
// as a different token (numbers, booleans, keywords, structural characters,
// a leading operator) is quoted as well so the text reparses to a string.
fn needs_quotes(text: &str) -> bool {
    let Some(first) = text.chars().next() else {
        return true;
    };
    if matches!(first, '"' | '\'' | '=') {
        return true;
    }
    if text
        .chars()
        .any(|ch| ch.is_whitespace() || ch.is_control() || matches!(ch, ':' | '(' | ')' | ',' | '"'))
    {
        return true;
    }
    numeric_literal_len(text) == Some(text.len())
        || text.eq_ignore_ascii_case("true")
        || text.eq_ignore_ascii_case("false")
        || (text.chars().all(is_field_char) && LogicalOp::from_keyword(text).is_some())
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_query_string(self))
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_comparison(&mut out, self);
        f.write_str(&out)
    }
}
