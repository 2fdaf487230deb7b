use std::fmt;

/// Half-open byte range `[start, end)` into the query text a token or
/// condition was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Comparison operators a condition can use.
///
/// The UI talks about operators by their `SCREAMING_SNAKE_CASE` name
/// ([`OperatorKind::name`]); query text uses the symbol ([`OperatorKind::symbol`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    /// `field:value` or `field=value`.
    ///
    /// ```
    /// use filter_syntax::{parse_query, Node, OperatorKind};
    /// let Some(Node::Comparison(leaf)) = parse_query("service:api").unwrap() else { panic!() };
    /// assert_eq!(leaf.operator, OperatorKind::Equals);
    /// ```
    Equals,
    /// `field:!=value`.
    NotEquals,
    /// `field:>value`.
    ///
    /// ```
    /// use filter_syntax::{parse_query, Node, OperatorKind};
    /// let Some(Node::Comparison(leaf)) = parse_query("duration_ms:>1000").unwrap() else { panic!() };
    /// assert_eq!(leaf.operator, OperatorKind::GreaterThan);
    /// ```
    GreaterThan,
    /// `field:<value`.
    LessThan,
    /// `field:>=value`.
    GreaterThanOrEqual,
    /// `field:<=value`.
    LessThanOrEqual,
    /// `field:LIKE pattern`.
    ///
    /// ```
    /// use filter_syntax::{parse_query, Node, OperatorKind};
    /// let Some(Node::Comparison(leaf)) = parse_query("url:LIKE \"/api/*\"").unwrap() else { panic!() };
    /// assert_eq!(leaf.operator, OperatorKind::Like);
    /// ```
    Like,
    /// `field:NOT LIKE pattern`.
    NotLike,
    /// `field:IN (a, b)`.
    ///
    /// ```
    /// use filter_syntax::{parse_query, Node, OperatorKind};
    /// let Some(Node::Comparison(leaf)) = parse_query("trace_id:IN (abc123, def456)").unwrap() else { panic!() };
    /// assert_eq!(leaf.operator, OperatorKind::In);
    /// ```
    In,
    /// `field:NOT IN (a, b)`.
    NotIn,
}

impl OperatorKind {
    pub const ALL: [OperatorKind; 10] = [
        OperatorKind::Equals,
        OperatorKind::NotEquals,
        OperatorKind::GreaterThan,
        OperatorKind::LessThan,
        OperatorKind::GreaterThanOrEqual,
        OperatorKind::LessThanOrEqual,
        OperatorKind::Like,
        OperatorKind::NotLike,
        OperatorKind::In,
        OperatorKind::NotIn,
    ];

    /// Canonical spelling used when printing queries.
    pub fn symbol(self) -> &'static str {
        match self {
            OperatorKind::Equals => ":",
            OperatorKind::NotEquals => ":!=",
            OperatorKind::GreaterThan => ":>",
            OperatorKind::LessThan => ":<",
            OperatorKind::GreaterThanOrEqual => ":>=",
            OperatorKind::LessThanOrEqual => ":<=",
            OperatorKind::Like => ":LIKE",
            OperatorKind::NotLike => ":NOT LIKE",
            OperatorKind::In => ":IN",
            OperatorKind::NotIn => ":NOT IN",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OperatorKind::Equals => "EQUALS",
            OperatorKind::NotEquals => "NOT_EQUALS",
            OperatorKind::GreaterThan => "GREATER_THAN",
            OperatorKind::LessThan => "LESS_THAN",
            OperatorKind::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            OperatorKind::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            OperatorKind::Like => "LIKE",
            OperatorKind::NotLike => "NOT_LIKE",
            OperatorKind::In => "IN",
            OperatorKind::NotIn => "NOT_IN",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Maps raw operator text as the lexer saw it (`:>=`, `=`, `:not   in`)
    /// to an operator. Case and inner whitespace are not significant.
    pub fn from_symbol(text: &str) -> Option<Self> {
        let normalized = text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();
        let kind = match normalized.as_str() {
            ":" | "=" => OperatorKind::Equals,
            ":!=" => OperatorKind::NotEquals,
            ":>" => OperatorKind::GreaterThan,
            ":<" => OperatorKind::LessThan,
            ":>=" => OperatorKind::GreaterThanOrEqual,
            ":<=" => OperatorKind::LessThanOrEqual,
            ":LIKE" => OperatorKind::Like,
            ":NOT LIKE" => OperatorKind::NotLike,
            ":IN" => OperatorKind::In,
            ":NOT IN" => OperatorKind::NotIn,
            _ => return None,
        };
        Some(kind)
    }

    /// `IN` and `NOT IN` take a parenthesized value list.
    pub fn takes_list(self) -> bool {
        matches!(self, OperatorKind::In | OperatorKind::NotIn)
    }

    /// Word operators need a space before their value to stay recognizable.
    pub(crate) fn is_word(self) -> bool {
        matches!(
            self,
            OperatorKind::Like | OperatorKind::NotLike | OperatorKind::In | OperatorKind::NotIn
        )
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

impl LogicalOp {
    pub fn keyword(self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
            LogicalOp::Not => "NOT",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        [LogicalOp::And, LogicalOp::Or, LogicalOp::Not]
            .into_iter()
            .find(|op| op.keyword().eq_ignore_ascii_case(word))
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Number,
    Boolean,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
        }
    }
}

/// Right-hand side of a condition. `List` only ever appears under `IN` and
/// `NOT IN` and holds scalar values.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    Boolean(bool),
    List(Vec<Value>),
}

impl Value {
    /// Kind of the value; a list reports the kind of its first element.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Number(_) => ValueKind::Number,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::List(items) => items.first().map_or(ValueKind::String, Value::kind),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }

    /// String-wise equality: `200` matches `"200"`, lists match element by
    /// element, and a list never matches a scalar.
    pub fn loosely_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(left), Value::List(right)) => {
                left.len() == right.len()
                    && left
                        .iter()
                        .zip(right)
                        .all(|(l, r)| l.to_string() == r.to_string())
            }
            (Value::List(_), _) | (_, Value::List(_)) => false,
            _ => self.to_string() == other.to_string(),
        }
    }
}

/// Unquoted text of the value. Use the serializer for query syntax.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(text) => f.write_str(text),
            Value::Number(number) => write!(f, "{number}"),
            Value::Boolean(flag) => write!(f, "{flag}"),
            Value::List(items) => {
                f.write_str("(")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::String(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::String(text)
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Value::Number(number)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Boolean(flag)
    }
}

/// A `field operator value` leaf.
///
/// `span` locates the condition in the text it was parsed from; conditions
/// built by hand carry `None`. Equality ignores the span.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub field: String,
    pub operator: OperatorKind,
    pub value: Value,
    pub span: Option<Span>,
}

impl Comparison {
    pub fn new(field: impl Into<String>, operator: OperatorKind, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
            span: None,
        }
    }

    pub fn value_kind(&self) -> ValueKind {
        self.value.kind()
    }

    pub fn matches(&self, field: &str, operator: OperatorKind, value: &Value) -> bool {
        self.field == field && self.operator == operator && self.value.loosely_equals(value)
    }
}

impl PartialEq for Comparison {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field && self.operator == other.operator && self.value == other.value
    }
}

/// Parsed filter expression. `And`/`Or` always own both operands and `Not`
/// exactly one, so the tree can't be half built.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Comparison(Comparison),
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Not(Box<Node>),
}

impl Node {
    pub fn and(left: Node, right: Node) -> Node {
        Node::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Node, right: Node) -> Node {
        Node::Or(Box::new(left), Box::new(right))
    }

    pub fn not(operand: Node) -> Node {
        Node::Not(Box::new(operand))
    }

    pub fn logical_op(&self) -> Option<LogicalOp> {
        match self {
            Node::Comparison(_) => None,
            Node::And(..) => Some(LogicalOp::And),
            Node::Or(..) => Some(LogicalOp::Or),
            Node::Not(_) => Some(LogicalOp::Not),
        }
    }

    /// Leaves in depth-first, left-to-right order.
    pub fn comparisons(&self) -> Comparisons<'_> {
        Comparisons { stack: vec![self] }
    }
}

impl From<Comparison> for Node {
    fn from(comparison: Comparison) -> Self {
        Node::Comparison(comparison)
    }
}

pub struct Comparisons<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Comparisons<'a> {
    type Item = &'a Comparison;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                Node::Comparison(comparison) => return Some(comparison),
                Node::And(left, right) | Node::Or(left, right) => {
                    self.stack.push(right);
                    self.stack.push(left);
                }
                Node::Not(operand) => self.stack.push(operand),
            }
        }
        None
    }
}

/// First condition on `field`, e.g. the `service:` value that drives the
/// service picker.
///
/// ```
/// use filter_syntax::{find_comparison, parse_query};
/// let node = parse_query("status:error AND service:api").unwrap().unwrap();
/// let leaf = find_comparison(&node, "service").unwrap();
/// assert_eq!(leaf.value.as_str(), Some("api"));
/// ```
pub fn find_comparison<'a>(node: &'a Node, field: &str) -> Option<&'a Comparison> {
    node.comparisons().find(|comparison| comparison.field == field)
}
