use crate::ast::{Comparison, LogicalOp, Node, OperatorKind, Span, Value, ValueKind};
use crate::lexer::{Token, TokenKind};
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
    /// Kind of the token the parser stopped at.
    pub found: TokenKind,
}

impl ParseError {
    /// True when the query simply stopped early, which is what a user
    /// mid-keystroke produces.
    pub fn is_end_of_input(&self) -> bool {
        self.found == TokenKind::Eof
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.position)
    }
}

impl std::error::Error for ParseError {}

/// Builds the AST for a token stream. A stream holding nothing but
/// [`TokenKind::Eof`] has no AST and yields `Ok(None)`.
///
/// Grammar, lowest precedence first:
///
/// ```text
/// expression  := orExpr
/// orExpr      := andExpr ( 'OR' andExpr )*
/// andExpr     := notExpr ( 'AND' notExpr )*
/// notExpr     := 'NOT' notExpr | comparison
/// comparison  := '(' expression ')' | FIELD operator (value | inList)
/// inList      := '(' value (',' value)* ')'
/// ```
pub fn parse(tokens: &[Token]) -> Result<Option<Node>, ParseError> {
    Parser::new(tokens).parse()
}

/// Recursive descent over the token slice. AND/OR fold left so
/// `a AND b AND c` becomes `(a AND b) AND c`.
struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn parse(mut self) -> Result<Option<Node>, ParseError> {
        if self.peek_kind() == TokenKind::Eof {
            return Ok(None);
        }
        let node = self.parse_or()?;
        if self.peek_kind() != TokenKind::Eof {
            return Err(self.unexpected("end of input"));
        }
        Ok(Some(node))
    }

    fn parse_or(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_and()?;
        while self.consume_logical(LogicalOp::Or) {
            let right = self.parse_and()?;
            left = Node::or(left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_not()?;
        while self.consume_logical(LogicalOp::And) {
            let right = self.parse_not()?;
            left = Node::and(left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Node, ParseError> {
        if self.consume_logical(LogicalOp::Not) {
            let operand = self.parse_not()?;
            return Ok(Node::not(operand));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Node, ParseError> {
        match self.peek_kind() {
            TokenKind::LParen => {
                self.pos += 1;
                let inner = self.parse_or()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Field => {
                let field = self.expect(TokenKind::Field)?;
                let operator_token = self.expect(TokenKind::Operator)?;
                let operator = operator_kind(operator_token);

                let (value, last) = if operator.takes_list() {
                    self.parse_list()?
                } else {
                    let token = self.expect(TokenKind::Value)?;
                    (value_of(token), token.span)
                };

                Ok(Node::Comparison(Comparison {
                    field: field.text.clone(),
                    operator,
                    value,
                    span: Some(field.span.to(last)),
                }))
            }
            _ => Err(self.unexpected("field or '('")),
        }
    }

    // `(v1, v2, ...)` with at least one value. Returns the closing paren's span
    // so the condition's span covers the whole list.
    fn parse_list(&mut self) -> Result<(Value, Span), ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut items = vec![value_of(self.expect(TokenKind::Value)?)];
        while self.peek_kind() == TokenKind::Comma {
            self.pos += 1;
            items.push(value_of(self.expect(TokenKind::Value)?));
        }
        let close = self.expect(TokenKind::RParen)?;
        Ok((Value::List(items), close.span))
    }

    fn consume_logical(&mut self, op: LogicalOp) -> bool {
        let matched = self
            .tokens
            .get(self.pos)
            .and_then(Token::logical_op)
            .is_some_and(|found| found == op);
        if matched {
            self.pos += 1;
        }
        matched
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&'t Token, ParseError> {
        let tokens = self.tokens;
        match tokens.get(self.pos) {
            Some(token) if token.kind == kind => {
                self.pos += 1;
                Ok(token)
            }
            _ => Err(self.unexpected(kind.describe())),
        }
    }

    // Token streams built by hand may omit the trailing EOF; running off the
    // end reads as EOF.
    fn peek_kind(&self) -> TokenKind {
        self.tokens
            .get(self.pos)
            .map_or(TokenKind::Eof, |token| token.kind)
    }

    fn position(&self) -> usize {
        match self.tokens.get(self.pos) {
            Some(token) => token.span.start,
            None => self.tokens.last().map_or(0, |token| token.span.end),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let found = self.peek_kind();
        ParseError {
            message: format!("expected {expected}, found {found}"),
            position: self.position(),
            found,
        }
    }
}

// The lexer only emits known operators; hand-built streams fall back to
// equality.
fn operator_kind(token: &Token) -> OperatorKind {
    OperatorKind::from_symbol(&token.text).unwrap_or_else(|| {
        warn!(operator = %token.text, "unknown operator, treating as EQUALS");
        OperatorKind::Equals
    })
}

fn value_of(token: &Token) -> Value {
    match token.value_kind {
        Some(ValueKind::Number) => match token.text.parse::<f64>() {
            Ok(number) => Value::Number(number),
            Err(_) => Value::String(token.text.clone()),
        },
        Some(ValueKind::Boolean) => Value::Boolean(token.text.eq_ignore_ascii_case("true")),
        Some(ValueKind::String) | None => Value::String(token.text.clone()),
    }
}
