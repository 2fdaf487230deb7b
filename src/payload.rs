use filter_syntax::{
    ChipSpan, Comparison, LexDiagnostic, Lexed, Node, Token, TokenKind, Validation, Value,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// JSON shape of an AST node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodePayload {
    #[serde(rename_all = "camelCase")]
    Comparison {
        field: String,
        operator: &'static str,
        value: Json,
        value_kind: &'static str,
    },
    /// `AND`/`OR` fill `left` and `right`; `NOT` fills `operand` only.
    Logical {
        operator: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        left: Option<Box<NodePayload>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        right: Option<Box<NodePayload>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        operand: Option<Box<NodePayload>>,
    },
}

impl From<&Comparison> for NodePayload {
    fn from(comparison: &Comparison) -> Self {
        NodePayload::Comparison {
            field: comparison.field.clone(),
            operator: comparison.operator.name(),
            value: value_to_json(&comparison.value),
            value_kind: comparison.value_kind().as_str(),
        }
    }
}

impl From<&Node> for NodePayload {
    fn from(node: &Node) -> Self {
        match node {
            Node::Comparison(comparison) => comparison.into(),
            Node::And(left, right) => binary("AND", left, right),
            Node::Or(left, right) => binary("OR", left, right),
            Node::Not(operand) => NodePayload::Logical {
                operator: "NOT",
                left: None,
                right: None,
                operand: Some(Box::new((&**operand).into())),
            },
        }
    }
}

fn binary(operator: &'static str, left: &Node, right: &Node) -> NodePayload {
    NodePayload::Logical {
        operator,
        left: Some(Box::new(left.into())),
        right: Some(Box::new(right.into())),
        operand: None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub error: Option<String>,
}

impl From<Validation> for ValidationResponse {
    fn from(Validation { valid, error }: Validation) -> Self {
        Self { valid, error }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChipPayload {
    pub field: String,
    pub operator: &'static str,
    pub value: Json,
    pub value_kind: &'static str,
    /// Offsets in UTF-16 code units, the way the dashboard indexes strings.
    /// `query.slice(startIndex, endIndex)` is the condition as typed.
    pub start_index: usize,
    pub end_index: usize,
    /// Canonical text of the condition, shown on the chip.
    pub label: String,
}

impl ChipPayload {
    /// Builds the payload for a chip extracted from `query`.
    pub fn new(query: &str, chip: ChipSpan) -> Self {
        let ChipSpan {
            field,
            operator,
            value,
            start,
            end,
        } = chip;
        let comparison = Comparison::new(field, operator, value);
        Self {
            label: comparison.to_string(),
            value: value_to_json(&comparison.value),
            value_kind: comparison.value_kind().as_str(),
            operator: operator.name(),
            field: comparison.field,
            start_index: utf16_offset(query, start),
            end_index: utf16_offset(query, end),
        }
    }
}

// Byte offset to UTF-16 offset. Offsets past the end clamp to the length.
fn utf16_offset(text: &str, byte_offset: usize) -> usize {
    text.char_indices()
        .take_while(|&(idx, _)| idx < byte_offset)
        .map(|(_, ch)| ch.len_utf16())
        .sum()
}

/// Chip removal as sent by the UI. `operator` is the operator name
/// (`"NOT_EQUALS"`) or its query symbol (`":!="`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveConditionRequest {
    pub query: String,
    pub field: String,
    pub operator: String,
    #[serde(default)]
    pub value: Json,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    pub kind: &'static str,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_kind: Option<&'static str>,
    pub start: usize,
    pub end: usize,
}

impl From<Token> for TokenPayload {
    fn from(token: Token) -> Self {
        Self {
            kind: token_kind_name(token.kind),
            value_kind: token.value_kind.map(|kind| kind.as_str()),
            start: token.span.start,
            end: token.span.end,
            text: token.text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensResponse {
    pub tokens: Vec<TokenPayload>,
    pub diagnostics: Vec<String>,
}

impl From<Lexed> for TokensResponse {
    fn from(Lexed { tokens, diagnostics }: Lexed) -> Self {
        Self {
            tokens: tokens.into_iter().map(TokenPayload::from).collect(),
            diagnostics: diagnostics.iter().map(LexDiagnostic::to_string).collect(),
        }
    }
}

fn token_kind_name(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Field => "field",
        TokenKind::Operator => "operator",
        TokenKind::Value => "value",
        TokenKind::LogicalOp => "logicalOp",
        TokenKind::LParen => "lParen",
        TokenKind::RParen => "rParen",
        TokenKind::Comma => "comma",
        TokenKind::Eof => "eof",
    }
}

/// Whole numbers go out as JSON integers so `500` doesn't show up as `500.0`.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::String(text) => Json::String(text.clone()),
        Value::Number(number) => {
            if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
                Json::from(*number as i64)
            } else {
                serde_json::Number::from_f64(*number).map_or(Json::Null, Json::Number)
            }
        }
        Value::Boolean(flag) => Json::Bool(*flag),
        Value::List(items) => Json::Array(items.iter().map(value_to_json).collect()),
    }
}

/// Inverse of [`value_to_json`] for values arriving from the UI. `null`
/// reads as the empty string; objects keep their JSON text.
pub fn json_to_value(json: &Json) -> Value {
    match json {
        Json::String(text) => Value::String(text.clone()),
        Json::Number(number) => number
            .as_f64()
            .map_or_else(|| Value::String(number.to_string()), Value::Number),
        Json::Bool(flag) => Value::Boolean(*flag),
        Json::Array(items) => Value::List(items.iter().map(json_to_value).collect()),
        Json::Null => Value::String(String::new()),
        Json::Object(_) => Value::String(json.to_string()),
    }
}
