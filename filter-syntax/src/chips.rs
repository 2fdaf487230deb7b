use crate::ast::{Comparison, Node, OperatorKind, Span, Value};
use crate::parse_query;
use crate::serialize::to_query_string;
use tracing::debug;

/// One condition of a query together with where it sits in the raw text.
///
/// `start..end` indexes the exact string the chip was extracted from and
/// goes stale as soon as that string changes.
#[derive(Debug, Clone, PartialEq)]
pub struct ChipSpan {
    pub field: String,
    pub operator: OperatorKind,
    pub value: Value,
    pub start: usize,
    pub end: usize,
}

impl ChipSpan {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Slice of `query` the chip covers, if it still fits.
    pub fn text<'q>(&self, query: &'q str) -> Option<&'q str> {
        query.get(self.start..self.end)
    }
}

/// Conditions of `query` with their byte ranges, ordered by position.
///
/// Never fails: an unparsable query has no chips. Each condition maps to its
/// own occurrence, so `status:404 OR status:404` yields two distinct ranges.
///
/// ```
/// use filter_syntax::extract_chips_with_positions;
/// let query = "service:api AND status:error";
/// let chips = extract_chips_with_positions(query);
/// let texts: Vec<_> = chips.iter().map(|chip| chip.text(query).unwrap()).collect();
/// assert_eq!(texts, ["service:api", "status:error"]);
/// ```
pub fn extract_chips_with_positions(query: &str) -> Vec<ChipSpan> {
    let node = match parse_query(query) {
        Ok(Some(node)) => node,
        Ok(None) => return Vec::new(),
        Err(error) => {
            debug!(%error, "query has no chips");
            return Vec::new();
        }
    };

    let mut chips: Vec<ChipSpan> = node
        .comparisons()
        .filter_map(|comparison| chip_for(query, comparison))
        .collect();
    chips.sort_by_key(|chip| chip.start);
    chips
}

// Leaves without a usable span are skipped rather than guessed at.
fn chip_for(query: &str, comparison: &Comparison) -> Option<ChipSpan> {
    let span = comparison.span?;
    if span.is_empty() || span.end > query.len() {
        return None;
    }
    Some(ChipSpan {
        field: comparison.field.clone(),
        operator: comparison.operator,
        value: comparison.value.clone(),
        start: span.start,
        end: span.end,
    })
}

/// Drops the first condition matching `field`, `operator` and `value` and
/// prints what is left.
///
/// Values compare by their string form (lists element by element). A logical
/// node that loses an operand collapses into the survivor, so no dangling
/// `AND`/`OR`/`NOT` is left behind; removing the last condition gives `""`.
/// When the query doesn't parse or nothing matches, the query comes back
/// untouched.
///
/// ```
/// use filter_syntax::{remove_filter_condition, OperatorKind, Value};
/// let query = "service:api AND status:error";
/// let rest = remove_filter_condition(query, "status", OperatorKind::Equals, &Value::from("error"));
/// assert_eq!(rest, "service:api");
/// ```
pub fn remove_filter_condition(
    query: &str,
    field: &str,
    operator: OperatorKind,
    value: &Value,
) -> String {
    let node = match parse_query(query) {
        Ok(Some(node)) => node,
        Ok(None) => return query.to_string(),
        Err(error) => {
            debug!(%error, "cannot remove condition from unparsable query");
            return query.to_string();
        }
    };

    let mut pruner = Pruner {
        target: |comparison: &Comparison| comparison.matches(field, operator, value),
        removed: false,
    };
    let pruned = pruner.prune(&node);
    if !pruner.removed {
        debug!(field, %operator, %value, "no condition to remove");
        return query.to_string();
    }
    pruned.map(|node| to_query_string(&node)).unwrap_or_default()
}

struct Pruner<F> {
    target: F,
    removed: bool,
}

impl<F: Fn(&Comparison) -> bool> Pruner<F> {
    // Copies the tree minus the first matching leaf.
    fn prune(&mut self, node: &Node) -> Option<Node> {
        match node {
            Node::Comparison(comparison) => {
                if !self.removed && (self.target)(comparison) {
                    self.removed = true;
                    None
                } else {
                    Some(node.clone())
                }
            }
            Node::Not(operand) => self.prune(operand).map(Node::not),
            Node::And(left, right) => {
                let left = self.prune(left);
                let right = self.prune(right);
                collapse(left, right, Node::and)
            }
            Node::Or(left, right) => {
                let left = self.prune(left);
                let right = self.prune(right);
                collapse(left, right, Node::or)
            }
        }
    }
}

fn collapse(left: Option<Node>, right: Option<Node>, join: fn(Node, Node) -> Node) -> Option<Node> {
    match (left, right) {
        (Some(left), Some(right)) => Some(join(left, right)),
        (Some(survivor), None) | (None, Some(survivor)) => Some(survivor),
        (None, None) => None,
    }
}
