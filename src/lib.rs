//! Bridge between the dashboard's filter box and `filter-syntax`.
//!
//! Every function takes what the UI sends (a query string or a deserialized
//! request) and returns serde payloads with camelCase keys. Failures come back
//! as `String`s the UI can show as-is; nothing here panics on user input.

mod commands;
mod payload;

pub use commands::{
    filter_chips, normalize_filter, parse_filter, remove_condition, service_of, tokenize_filter,
    validate_filter,
};
pub use payload::{
    ChipPayload, NodePayload, RemoveConditionRequest, TokenPayload, TokensResponse,
    ValidationResponse, json_to_value, value_to_json,
};
