use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Compact,
}

#[derive(Parser)]
#[command(name = "ghq")]
#[command(about = "Run GitHub GraphQL queries and inspect their state", version)]
#[command(after_help = "EXAMPLES:
    ghq viewer                                  Show the authenticated user
    ghq query '{ viewer { login } }'            Run a query
    ghq query -f repo.graphql --var owner=rust-lang --var name=rust
    ghq replay renders.jsonl                    Replay a sequence of renders")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json, compact)
    #[arg(long, short = 'o', global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Output as JSON (alias for --format json)
    #[arg(long, global = true, hide = true)]
    pub json: bool,

    /// Suppress informational messages
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Show debug logs and detailed error information
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Get the effective output format, considering --json flag
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a GraphQL query and print its final state
    #[command(after_help = "EXAMPLES:
    ghq query '{ viewer { login name } }'
    ghq query '{ viewer { login } }' --select /viewer/login
    echo '{ rateLimit { remaining } }' | ghq query -
    ghq query -f issues.graphql --variables '{\"first\": 10}'")]
    Query(QueryArgs),
    /// Show the authenticated user
    #[command(after_help = "EXAMPLES:
    ghq viewer
    ghq viewer --json")]
    Viewer,
    /// Feed a file of renders through one query view
    #[command(after_help = "EXAMPLES:
    ghq replay renders.jsonl

Each line is a JSON object: {\"query\": \"...\", \"variables\": {...}}.
Consecutive identical lines reuse the previous result.")]
    Replay {
        /// Path to a JSON-lines file
        file: PathBuf,
    },
    /// Generate shell completions
    #[command(after_help = "EXAMPLES:
    ghq completions bash > ~/.bash_completion.d/ghq
    ghq completions zsh > ~/.zfunc/_ghq
    ghq completions fish > ~/.config/fish/completions/ghq.fish")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Initialize configuration file interactively
    #[command(after_help = "EXAMPLES:
    ghq init")]
    Init,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Query text, or "-" to read it from stdin
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub query: Option<String>,

    /// Read the query from a file
    #[arg(long, short)]
    pub file: Option<PathBuf>,

    /// Variable as name=value; value is parsed as JSON, falling back to a string
    #[arg(long = "var", value_name = "NAME=VALUE")]
    pub vars: Vec<String>,

    /// All variables as a JSON object
    #[arg(long)]
    pub variables: Option<String>,

    /// Store only the value at this JSON Pointer (e.g. /viewer/login)
    #[arg(long, short)]
    pub select: Option<String>,
}
