use crate::lexer::{Token, TokenKind, tokenize};
use crate::parser::parse;
use once_cell::sync::Lazy;
use regex::Regex;

/// Verdict for the filter box. `error` is set exactly when `valid` is false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub error: Option<String>,
}

impl Validation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(message.into()),
        }
    }
}

static TRAILING_OPERATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?::(?:>=|<=|!=|>|<|(?:NOT\s+)?(?:IN|LIKE)|NOT)?|=)\s*$")
        .expect("valid trailing operator regex")
});

static DANGLING_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:^|[\s(])(?:AND|OR|NOT)\s*$").expect("valid keyword regex"));

static BARE_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[A-Za-z_][A-Za-z0-9_.]*\s*$").expect("valid identifier regex"));

/// Checks a query while the user is still typing it.
///
/// Empty input is valid. Input that looks unfinished (`service:`,
/// `a:1 AND`, a lone `service`) is reported valid so the box doesn't flash
/// an error mid-keystroke. Everything else must parse; the grammar itself is
/// not relaxed.
///
/// ```
/// use filter_syntax::validate_filter_query;
/// assert!(validate_filter_query("service:").valid);
/// assert!(validate_filter_query("service:api AND status:error").valid);
/// let verdict = validate_filter_query("service::bad");
/// assert!(!verdict.valid);
/// assert_eq!(verdict.error.as_deref(), Some("expected value, found operator"));
/// ```
pub fn validate_filter_query(query: &str) -> Validation {
    if query.trim().is_empty() || looks_incomplete(query) {
        return Validation::ok();
    }

    let tokens = tokenize(query);
    match parse(&tokens) {
        Ok(_) => Validation::ok(),
        Err(err) if err.is_end_of_input() && ends_mid_condition(&tokens) => Validation::ok(),
        Err(err) => Validation::invalid(err.message),
    }
}

/// Textual check: ends with an operator or a dangling keyword, or is a single
/// bare identifier.
fn looks_incomplete(query: &str) -> bool {
    TRAILING_OPERATOR.is_match(query)
        || DANGLING_KEYWORD.is_match(query)
        || BARE_IDENTIFIER.is_match(query)
}

/// Structural check after the parser ran out of input: the last real token
/// leaves a condition open, or a group or `IN` list is still unclosed.
fn ends_mid_condition(tokens: &[Token]) -> bool {
    let last_opens_condition = tokens
        .iter()
        .rev()
        .find(|token| token.kind != TokenKind::Eof)
        .is_some_and(|token| {
            matches!(
                token.kind,
                TokenKind::Operator
                    | TokenKind::LogicalOp
                    | TokenKind::Field
                    | TokenKind::LParen
                    | TokenKind::Comma
            )
        });
    last_opens_condition || has_unclosed_paren(tokens)
}

fn has_unclosed_paren(tokens: &[Token]) -> bool {
    let depth = tokens.iter().fold(0isize, |depth, token| match token.kind {
        TokenKind::LParen => depth + 1,
        TokenKind::RParen => depth - 1,
        _ => depth,
    });
    depth > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_queries_are_valid() {
        assert_eq!(validate_filter_query(""), Validation::ok());
        assert_eq!(validate_filter_query(" \t\n"), Validation::ok());
    }

    #[test]
    fn complete_queries_are_valid() {
        for query in [
            "service:api",
            "status:error",
            "duration_ms:>1000",
            "service:api AND status:200",
            "(status_code:>=400 AND status_code:<500) OR error:true",
            "tags.http_request.method:GET",
            "url:LIKE \"/api/*\"",
            "trace_id:IN (abc123, def456)",
            "name:\"has space\"",
            "framework:symfony-php",
        ] {
            assert_eq!(validate_filter_query(query), Validation::ok(), "{query}");
        }
    }

    #[test]
    fn unfinished_input_is_tolerated() {
        for query in [
            "service:",
            "service",
            "service   ",
            "duration_ms:>=",
            "trace_id:IN",
            "url:not like",
            "service:api AND",
            "service:api or ",
            "NOT",
            "service:api AND sta",
            "trace_id:IN (abc,",
            "trace_id:IN (",
            "(service:api AND (",
        ] {
            assert!(validate_filter_query(query).valid, "{query}");
        }
    }

    #[test]
    fn malformed_input_surfaces_parser_message() {
        let verdict = validate_filter_query("service::bad");
        assert!(!verdict.valid);
        assert_eq!(verdict.error.as_deref(), Some("expected value, found operator"));


        let verdict = validate_filter_query("a:1 b:2");
        assert_eq!(verdict.error.as_deref(), Some("expected end of input, found field"));

        let verdict = validate_filter_query("a:1)");
        assert!(!verdict.valid);
    }

    #[test]
    fn open_groups_and_lists_are_still_being_typed() {
        assert_eq!(validate_filter_query("(a:1 OR b:2"), Validation::ok());
        assert_eq!(validate_filter_query("trace_id:IN (abc12"), Validation::ok());
        assert!(has_unclosed_paren(&tokenize("((a:1)")));
        assert!(!has_unclosed_paren(&tokenize("(a:1))")));
    }

    #[test]
    fn keyword_prefixes_are_not_dangling_keywords() {
        let verdict = validate_filter_query("a:1 brand");
        assert!(!verdict.valid);
        assert!(!looks_incomplete("os:android"));
    }
}
