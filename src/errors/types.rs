use thiserror::Error;

#[derive(Debug, Error)]
pub enum CiphertraceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No input provided: {0}")]
    EmptyInput(String),

    #[error("Unsupported file: {0}")]
    UnsupportedFile(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Scan cancelled: {0}")]
    Cancelled(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Permission error: {0}")]
    Permission(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
