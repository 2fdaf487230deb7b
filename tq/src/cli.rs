use clap::{Parser, Subcommand};

#[derive(Parser)]
#[clap(about = "Inspect trace filter queries")]
pub struct Cli {
    #[clap(long, global = true, default_value = "false")]
    /// Print the JSON payloads the dashboard receives.
    pub json: bool,
    #[clap(long, global = true, default_value = "warn")]
    /// Log filter, used when RUST_LOG is unset.
    pub log: String,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the token stream and lexer diagnostics.
    Tokens { query: String },
    /// Print the AST.
    Parse { query: String },
    /// Check a query the way the filter box does while typing.
    Validate { query: String },
    /// Print the canonical form of a query.
    Format { query: String },
    /// List conditions with their byte ranges.
    Chips { query: String },
    /// Drop one condition and print the rest.
    Remove {
        query: String,
        #[clap(long)]
        field: String,
        /// Operator name (`EQUALS`) or symbol (`:>=`).
        #[clap(long, default_value = "EQUALS")]
        operator: String,
        /// JSON literal (`500`, `["a","b"]`); anything else is taken as a string.
        #[clap(long)]
        value: String,
    },
}
