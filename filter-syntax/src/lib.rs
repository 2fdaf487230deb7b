//! # Trace filter query syntax
//!
//! `filter-syntax` is the engine behind the dashboard's filter box. It turns
//! queries such as `service:api AND (status:error OR duration_ms:>500)` into
//! a typed AST, prints ASTs back as canonical query text, tells the box
//! whether what the user typed so far is acceptable, and maps each condition
//! back onto the exact range of the raw text so the UI can draw removable
//! chips over it.
//!
//! Nothing here executes filters; the backend does that. Every function is
//! pure and re-parses from scratch.
//!
//! ## Example
//! ```
//! use filter_syntax::{parse_query, to_query_string, Node, OperatorKind, Value};
//!
//! let node = parse_query("service:api AND duration_ms:>500").unwrap().unwrap();
//! let Node::And(left, right) = &node else { panic!() };
//! // leaves keep the order they were written in
//! assert!(matches!(&**left, Node::Comparison(leaf) if leaf.field == "service"));
//! assert!(matches!(&**right, Node::Comparison(leaf)
//!     if leaf.operator == OperatorKind::GreaterThan && leaf.value == Value::Number(500.0)));
//!
//! assert_eq!(to_query_string(&node), "(service:api) AND (duration_ms:>500)");
//! ```

mod ast;
mod chips;
mod lexer;
mod parser;
mod serialize;
mod validate;

pub use ast::*;
pub use chips::{ChipSpan, extract_chips_with_positions, remove_filter_condition};
pub use lexer::{LexDiagnostic, Lexed, Token, TokenKind, tokenize, tokenize_with_diagnostics};
pub use parser::{ParseError, parse};
pub use serialize::to_query_string;
pub use validate::{Validation, validate_filter_query};

/// Tokenizes and parses a query. Blank input has no AST and yields
/// `Ok(None)`.
///
/// ```
/// use filter_syntax::parse_query;
/// assert!(parse_query("   ").unwrap().is_none());
/// assert!(parse_query("service:").is_err());
/// ```
pub fn parse_query(query: &str) -> Result<Option<Node>, ParseError> {
    parse(&tokenize(query))
}

/// Parses and re-prints a query in canonical form, as done when the user
/// commits the filter box. Blank input normalizes to `""`.
///
/// ```
/// use filter_syntax::normalize_query;
/// assert_eq!(normalize_query("status = 'has space'").unwrap(), "status:\"has space\"");
/// ```
pub fn normalize_query(query: &str) -> Result<String, ParseError> {
    Ok(parse_query(query)?
        .map(|node| to_query_string(&node))
        .unwrap_or_default())
}
