use crate::payload::{
    ChipPayload, NodePayload, RemoveConditionRequest, TokensResponse, ValidationResponse,
    json_to_value,
};
use filter_syntax::{
    OperatorKind, Value, extract_chips_with_positions, find_comparison, normalize_query,
    parse_query, remove_filter_condition, tokenize_with_diagnostics, validate_filter_query,
};
use tracing::{debug, warn};

/// AST of the query for programmatic inspection. Blank input has none.
pub fn parse_filter(query: &str) -> Result<Option<NodePayload>, String> {
    debug!(query, "parse_filter");
    let node = parse_query(query).map_err(|e| e.to_string())?;
    Ok(node.as_ref().map(NodePayload::from))
}

pub fn validate_filter(query: &str) -> ValidationResponse {
    let verdict = validate_filter_query(query);
    debug!(query, valid = verdict.valid, "validate_filter");
    verdict.into()
}

/// Canonical text for the committed query. The error is the parser's message
/// so the box can show it instead of committing.
pub fn normalize_filter(query: &str) -> Result<String, String> {
    debug!(query, "normalize_filter");
    normalize_query(query).map_err(|e| e.message)
}

pub fn filter_chips(query: &str) -> Vec<ChipPayload> {
    let chips: Vec<ChipPayload> = extract_chips_with_positions(query)
        .into_iter()
        .map(|chip| ChipPayload::new(query, chip))
        .collect();
    debug!(query, chips = chips.len(), "filter_chips");
    chips
}

/// Query text without the chip the user closed. Unknown operators leave the
/// query untouched, like any other miss.
pub fn remove_condition(request: RemoveConditionRequest) -> String {
    let RemoveConditionRequest {
        query,
        field,
        operator,
        value,
    } = request;
    debug!(query, field, operator, %value, "remove_condition");

    let Some(operator) = operator_from_ui(&operator) else {
        warn!(operator, "unknown operator in remove request");
        return query;
    };
    remove_filter_condition(&query, &field, operator, &json_to_value(&value))
}

/// Value of the first `service` condition, used to preselect the service
/// dropdown. Unparsable queries have none.
pub fn service_of(query: &str) -> Option<String> {
    let node = parse_query(query).ok()??;
    let comparison = find_comparison(&node, "service")?;
    match &comparison.value {
        Value::List(_) => None,
        value => Some(value.to_string()),
    }
}

pub fn tokenize_filter(query: &str) -> TokensResponse {
    let lexed = tokenize_with_diagnostics(query);
    if !lexed.diagnostics.is_empty() {
        debug!(query, diagnostics = ?lexed.diagnostics, "tokenize_filter");
    }
    lexed.into()
}

fn operator_from_ui(text: &str) -> Option<OperatorKind> {
    OperatorKind::from_name(text).or_else(|| OperatorKind::from_symbol(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_filter_reports_errors_as_text() {
        assert_eq!(parse_filter("  "), Ok(None));
        assert_eq!(
            parse_filter("service::bad"),
            Err("expected value, found operator (at byte 8)".to_string())
        );
        assert!(matches!(
            parse_filter("service:api"),
            Ok(Some(NodePayload::Comparison { operator: "EQUALS", .. }))
        ));
    }

    #[test]
    fn validate_filter_tolerates_typing() {
        assert_eq!(
            validate_filter("service:"),
            ValidationResponse {
                valid: true,
                error: None
            }
        );
        let verdict = validate_filter("service::bad");
        assert!(!verdict.valid);
        assert_eq!(
            serde_json::to_value(verdict).unwrap(),
            json!({"valid": false, "error": "expected value, found operator"})
        );
    }

    #[test]
    fn normalize_filter_returns_canonical_text() {
        assert_eq!(
            normalize_filter("a:1 and b:2 and c:3").as_deref(),
            Ok("((a:1) AND (b:2)) AND (c:3)")
        );
        assert_eq!(
            normalize_filter("(a:1").unwrap_err(),
            "expected ')', found end of input"
        );
    }

    #[test]
    fn chips_point_into_raw_text() {
        let query = "service:api AND status:error";
        let chips = filter_chips(query);
        let texts: Vec<_> = chips
            .iter()
            .map(|chip| &query[chip.start_index..chip.end_index])
            .collect();
        assert_eq!(texts, ["service:api", "status:error"]);
        assert_eq!(chips[1].label, "status:error");
    }

    #[test]
    fn remove_condition_accepts_names_and_symbols() {
        let request = |operator: &str, value| RemoveConditionRequest {
            query: "service:api AND duration_ms:>500".into(),
            field: "duration_ms".into(),
            operator: operator.into(),
            value,
        };
        assert_eq!(remove_condition(request("GREATER_THAN", json!(500))), "service:api");
        assert_eq!(remove_condition(request(":>", json!("500"))), "service:api");
        assert_eq!(
            remove_condition(request("BETWEEN", json!(500))),
            "service:api AND duration_ms:>500"
        );
    }

    #[test]
    fn remove_condition_from_json_request() {
        let request = serde_json::from_value(json!({
            "query": "trace_id:IN (abc123, def456) OR service:api",
            "field": "trace_id",
            "operator": "IN",
            "value": ["abc123", "def456"],
        }))
        .unwrap();
        assert_eq!(remove_condition(request), "service:api");
    }

    #[test]
    fn service_of_reads_first_service_condition() {
        assert_eq!(
            service_of("env:prod AND (service:checkout OR service:cart)").as_deref(),
            Some("checkout")
        );
        assert_eq!(service_of("service:IN (a, b)"), None);
        assert_eq!(service_of("env:prod"), None);
        assert_eq!(service_of("service:"), None);
    }

    #[test]
    fn tokenize_filter_surfaces_diagnostics() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
        let response = tokenize_filter("name:\"open");
        assert_eq!(
            response.diagnostics,
            ["unterminated quoted value starting at byte 5"]
        );
        assert_eq!(response.tokens[2].text, "open");
    }
}
