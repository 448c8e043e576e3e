use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GhQueryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("GraphQL errors: {}", messages.join(", "))]
    GraphQL { messages: Vec<String> },

    #[error("Empty response from API")]
    EmptyResponse,

    #[error("Failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error(
        "No GitHub token found. Set GITHUB_TOKEN env var or add token to ~/.config/ghq/config.toml"
    )]
    MissingToken,

    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid variable: {0}")]
    InvalidVariable(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Query failed: {0}")]
    QueryFailed(String),
}

pub type Result<T> = std::result::Result<T, GhQueryError>;
