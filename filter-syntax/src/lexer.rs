use crate::ast::{LogicalOp, OperatorKind, Span, ValueKind};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Field,
    Operator,
    Value,
    LogicalOp,
    LParen,
    RParen,
    Comma,
    Eof,
}

impl TokenKind {
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Field => "field",
            TokenKind::Operator => "operator",
            TokenKind::Value => "value",
            TokenKind::LogicalOp => "logical operator",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Comma => "','",
            TokenKind::Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// One lexeme. For values `text` holds the decoded literal (quotes removed,
/// `\"` unescaped); `span` always covers the raw source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub value_kind: Option<ValueKind>,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            value_kind: None,
            span,
        }
    }

    pub fn value(text: impl Into<String>, value_kind: ValueKind, span: Span) -> Self {
        Self {
            kind: TokenKind::Value,
            text: text.into(),
            value_kind: Some(value_kind),
            span,
        }
    }

    pub fn logical_op(&self) -> Option<LogicalOp> {
        match self.kind {
            TokenKind::LogicalOp => LogicalOp::from_keyword(&self.text),
            _ => None,
        }
    }
}

/// Things the lexer tolerated instead of failing on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexDiagnostic {
    /// A character no token can start with was skipped.
    DroppedChar { ch: char, position: usize },
    /// A quoted value ran to the end of the input without its closing quote.
    UnterminatedQuote { position: usize },
}

impl fmt::Display for LexDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexDiagnostic::DroppedChar { ch, position } => {
                write!(f, "dropped character {ch:?} at byte {position}")
            }
            LexDiagnostic::UnterminatedQuote { position } => {
                write!(f, "unterminated quoted value starting at byte {position}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<LexDiagnostic>,
}

/// Splits a query into tokens. Never fails; the stream always ends with
/// [`TokenKind::Eof`].
///
/// ```
/// use filter_syntax::{tokenize, TokenKind};
/// let kinds: Vec<_> = tokenize("status:error").into_iter().map(|t| t.kind).collect();
/// assert_eq!(kinds, [TokenKind::Field, TokenKind::Operator, TokenKind::Value, TokenKind::Eof]);
/// ```
pub fn tokenize(query: &str) -> Vec<Token> {
    tokenize_with_diagnostics(query).tokens
}

/// Same as [`tokenize`] but also reports what was skipped or patched up.
pub fn tokenize_with_diagnostics(query: &str) -> Lexed {
    Lexer::new(query).run()
}

/// What the next word should be read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexMode {
    /// Start of a condition: identifiers are field names.
    ExpectField,
    /// Right after a scalar operator.
    ExpectValue,
    /// Right after `IN`/`NOT IN`, before the list's `(`.
    ExpectList,
    /// Between the parentheses of an `IN` list.
    InList,
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    mode: LexMode,
    lexed: Lexed,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            mode: LexMode::ExpectField,
            lexed: Lexed::default(),
        }
    }

    fn run(mut self) -> Lexed {
        loop {
            self.skip_ws();
            let Some(ch) = self.peek_char() else {
                break;
            };
            let start = self.pos;

            match ch {
                '(' => {
                    self.advance_char();
                    self.push(TokenKind::LParen, start);
                    self.mode = match self.mode {
                        LexMode::ExpectList => LexMode::InList,
                        _ => LexMode::ExpectField,
                    };
                    continue;
                }
                ')' => {
                    self.advance_char();
                    self.push(TokenKind::RParen, start);
                    self.mode = LexMode::ExpectField;
                    continue;
                }
                ',' => {
                    self.advance_char();
                    self.push(TokenKind::Comma, start);
                    if self.mode != LexMode::InList {
                        self.mode = LexMode::ExpectField;
                    }
                    continue;
                }
                _ => {}
            }

            // After an operator the next word is a value even when it spells a
            // keyword, so `flag:NOT` compares against "NOT".
            if self.mode == LexMode::ExpectField && self.consume_logical_keyword() {
                self.push(TokenKind::LogicalOp, start);
                continue;
            }

            if let Some(len) = self.match_operator() {
                self.pos += len;
                let kind = OperatorKind::from_symbol(&self.input[start..self.pos]);
                self.push(TokenKind::Operator, start);
                self.mode = match kind {
                    Some(kind) if kind.takes_list() => LexMode::ExpectList,
                    _ => LexMode::ExpectValue,
                };
                continue;
            }

            if self.mode == LexMode::ExpectField && is_field_start(ch) {
                self.advance_while(is_field_char);
                self.push(TokenKind::Field, start);
                continue;
            }

            if !self.lex_value(start) {
                self.advance_char();
                debug!(?ch, position = start, "lexer dropped character");
                self.lexed
                    .diagnostics
                    .push(LexDiagnostic::DroppedChar { ch, position: start });
            }
        }

        let end = self.input.len();
        self.lexed
            .tokens
            .push(Token::new(TokenKind::Eof, "", Span::new(end, end)));
        self.lexed
    }

    // Quoted string, number, boolean, then a bare run. Returns false when
    // nothing could be read at the cursor.
    fn lex_value(&mut self, start: usize) -> bool {
        let rest = self.remaining();
        let token = if let Some(quote) = rest.chars().next().filter(|&c| matches!(c, '"' | '\'')) {
            let text = self.read_quoted(quote);
            Token::value(text, ValueKind::String, Span::new(start, self.pos))
        } else if let Some(len) = numeric_literal_len(rest).filter(|&len| ends_value(&rest[len..])) {
            self.pos += len;
            Token::value(&rest[..len], ValueKind::Number, Span::new(start, self.pos))
        } else if let Some(len) = boolean_literal_len(rest) {
            self.pos += len;
            Token::value(&rest[..len], ValueKind::Boolean, Span::new(start, self.pos))
        } else {
            self.advance_while(|ch| !is_value_terminator(ch) && !ch.is_control());
            if self.pos == start {
                return false;
            }
            let text = &self.input[start..self.pos];
            Token::value(text, ValueKind::String, Span::new(start, self.pos))
        };

        self.lexed.tokens.push(token);
        if self.mode != LexMode::InList {
            self.mode = LexMode::ExpectField;
        }
        true
    }

    // Only the quote character itself can be escaped; any other backslash is
    // kept as typed.
    fn read_quoted(&mut self, quote: char) -> String {
        let open = self.pos;
        self.advance_char();
        let mut text = String::new();
        while let Some(ch) = self.peek_char() {
            self.advance_char();
            if ch == '\\' && self.peek_char() == Some(quote) {
                self.advance_char();
                text.push(quote);
                continue;
            }
            if ch == quote {
                return text;
            }
            text.push(ch);
        }

        self.lexed
            .diagnostics
            .push(LexDiagnostic::UnterminatedQuote { position: open });
        text
    }

    fn consume_logical_keyword(&mut self) -> bool {
        for op in [LogicalOp::And, LogicalOp::Or, LogicalOp::Not] {
            if let Some(len) = keyword_len(self.remaining(), op.keyword()) {
                self.pos += len;
                return true;
            }
        }
        false
    }

    // Longest match first: `:NOT IN`, `:NOT LIKE`, `:>=`, `:<=`, `:!=`,
    // `:IN`, `:LIKE`, `:>`, `:<`, then a lone `:` or `=`.
    fn match_operator(&self) -> Option<usize> {
        let rest = self.remaining();
        if let Some(after_colon) = rest.strip_prefix(':') {
            if let Some(len) = word_operator_len(after_colon) {
                return Some(1 + len);
            }
            for symbol in [">=", "<=", "!=", ">", "<"] {
                if after_colon.starts_with(symbol) {
                    return Some(1 + symbol.len());
                }
            }
            return Some(1);
        }
        rest.starts_with('=').then_some(1)
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let text = &self.input[start..self.pos];
        self.lexed
            .tokens
            .push(Token::new(kind, text, Span::new(start, self.pos)));
    }

    fn skip_ws(&mut self) {
        self.advance_while(char::is_whitespace);
    }

    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek_char() {
            if !predicate(ch) {
                break;
            }
            self.advance_char();
        }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance_char(&mut self) {
        if let Some(ch) = self.peek_char() {
            self.pos += ch.len_utf8();
        }
    }
}

/// Length of `keyword` at the start of `rest` when it stands alone: followed
/// by whitespace or the end of input, so `ANDroid` stays a field.
fn keyword_len(rest: &str, keyword: &str) -> Option<usize> {
    let candidate = rest.get(..keyword.len())?;
    if !candidate.eq_ignore_ascii_case(keyword) {
        return None;
    }
    match rest[keyword.len()..].chars().next() {
        None => Some(keyword.len()),
        Some(ch) if ch.is_whitespace() => Some(keyword.len()),
        Some(_) => None,
    }
}

// `IN`/`LIKE`, optionally preceded by `NOT` and any run of whitespace.
fn word_operator_len(rest: &str) -> Option<usize> {
    if let Some(not_len) = keyword_len(rest, "NOT") {
        let after = &rest[not_len..];
        let gap = after.len() - after.trim_start().len();
        if let Some(len) = ["IN", "LIKE"]
            .into_iter()
            .find_map(|word| operator_word_len(&after[gap..], word))
        {
            return Some(not_len + gap + len);
        }
    }
    ["IN", "LIKE"]
        .into_iter()
        .find_map(|word| operator_word_len(rest, word))
}

// Operator words may touch their argument (`:IN(`, `:LIKE"x"`) but not an
// identifier character, so `level:INFO` keeps `INFO` as the value.
fn operator_word_len(rest: &str, word: &str) -> Option<usize> {
    let candidate = rest.get(..word.len())?;
    if !candidate.eq_ignore_ascii_case(word) {
        return None;
    }
    match rest[word.len()..].chars().next() {
        None => Some(word.len()),
        Some(ch) if ch.is_whitespace() || matches!(ch, '(' | '"' | '\'') => Some(word.len()),
        Some(_) => None,
    }
}

/// Length of a `-?[0-9]+(\.[0-9]+)?` prefix.
pub(crate) fn numeric_literal_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut idx = usize::from(bytes.first() == Some(&b'-'));
    let int_start = idx;
    while bytes.get(idx).is_some_and(u8::is_ascii_digit) {
        idx += 1;
    }
    if idx == int_start {
        return None;
    }
    if bytes.get(idx) == Some(&b'.') && bytes.get(idx + 1).is_some_and(u8::is_ascii_digit) {
        idx += 1;
        while bytes.get(idx).is_some_and(u8::is_ascii_digit) {
            idx += 1;
        }
    }
    Some(idx)
}

fn boolean_literal_len(rest: &str) -> Option<usize> {
    ["TRUE", "FALSE"].into_iter().find_map(|word| {
        let candidate = rest.get(..word.len())?;
        (candidate.eq_ignore_ascii_case(word) && ends_value(&rest[word.len()..])).then_some(word.len())
    })
}

fn ends_value(rest: &str) -> bool {
    rest.chars().next().is_none_or(is_value_terminator)
}

pub(crate) fn is_value_terminator(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, ':' | '(' | ')' | ',')
}

pub(crate) fn is_field_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

pub(crate) fn is_field_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.')
}
