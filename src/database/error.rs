use thiserror::Error;

/// Failures while reading configuration or catalog files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid name hint pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Failures at the database boundary. None of these abort an analysis.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No database url configured")]
    NotConfigured,

    #[error("Connection timed out after {0} ms")]
    ConnectTimeout(u64),

    #[error("Lookup timed out after {0} ms")]
    Timeout(u64),

    #[error("Postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
}
