mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use filter_syntax::{
    Node, extract_chips_with_positions, normalize_query, parse_query, tokenize_with_diagnostics,
};
use serde::Serialize;
use trace_query::{
    NodePayload, RemoveConditionRequest, TokensResponse, filter_chips, remove_condition,
    validate_filter,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log)?;
    let json = cli.json;

    match cli.command {
        Command::Tokens { query } => {
            let lexed = tokenize_with_diagnostics(&query);
            if json {
                return print_json(&TokensResponse::from(lexed));
            }
            for token in &lexed.tokens {
                println!(
                    "{:>4}..{:<4} {:<16} {:?}",
                    token.span.start,
                    token.span.end,
                    token.kind.to_string(),
                    token.text
                );
            }
            for diagnostic in &lexed.diagnostics {
                eprintln!("warning: {diagnostic}");
            }
        }
        Command::Parse { query } => {
            let node = parse_query(&query).with_context(|| format!("Failed to parse {query:?}"))?;
            if json {
                return print_json(&node.as_ref().map(NodePayload::from));
            }
            match node {
                Some(node) => print_tree(&node, 0),
                None => println!("(empty)"),
            }
        }
        Command::Validate { query } => {
            let verdict = validate_filter(&query);
            if json {
                print_json(&verdict)?;
            } else if verdict.valid {
                println!("valid");
            }
            if let Some(error) = verdict.error {
                bail!("invalid query: {error}");
            }
        }
        Command::Format { query } => {
            let canonical =
                normalize_query(&query).with_context(|| format!("Failed to format {query:?}"))?;
            if json {
                return print_json(&canonical);
            }
            println!("{canonical}");
        }
        Command::Chips { query } => {
            if json {
                return print_json(&filter_chips(&query));
            }
            // Byte ranges here; the JSON payload carries UTF-16 offsets.
            for chip in extract_chips_with_positions(&query) {
                println!(
                    "{:>4}..{:<4} {:<40} {} {} {}",
                    chip.start,
                    chip.end,
                    chip.text(&query).unwrap_or_default(),
                    chip.field,
                    chip.operator,
                    chip.value
                );
            }
        }
        Command::Remove {
            query,
            field,
            operator,
            value,
        } => {
            let value = serde_json::from_str(&value).unwrap_or_else(|e| {
                debug!(%e, "value is not JSON, using it as a string");
                serde_json::Value::String(value)
            });
            let rest = remove_condition(RemoveConditionRequest {
                query,
                field,
                operator,
                value,
            });
            if json {
                return print_json(&rest);
            }
            println!("{rest}");
        }
    }
    Ok(())
}

fn init_logging(default_filter: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .with_context(|| format!("Invalid log filter {default_filter:?}"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn print_json<T: Serialize>(payload: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(payload).context("Failed to encode JSON")?;
    println!("{text}");
    Ok(())
}

fn print_tree(node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        Node::Comparison(comparison) => println!(
            "{indent}{} {} {} ({})",
            comparison.field,
            comparison.operator,
            comparison.value,
            comparison.value_kind().as_str()
        ),
        Node::And(left, right) | Node::Or(left, right) => {
            if let Some(op) = node.logical_op() {
                println!("{indent}{}", op.keyword());
            }
            print_tree(left, depth + 1);
            print_tree(right, depth + 1);
        }
        Node::Not(operand) => {
            println!("{indent}NOT");
            print_tree(operand, depth + 1);
        }
    }
}
