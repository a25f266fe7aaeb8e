use thiserror::Error;

/// Errors surfaced by the embedded query engine layer.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Anything DuckDB reports: parse failures on malformed files,
    /// execution errors, connection setup.
    #[error("query engine error: {0}")]
    Duck(#[from] duckdb::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("scratch path is not valid UTF-8")]
    NonUtf8Path,
}
