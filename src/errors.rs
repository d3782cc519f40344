use thiserror::Error;

/// Error type that captures common ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Invalid action: {0}")]
    InvalidAction(String),
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Corrupt record {id}: {reason}")]
    CorruptRecord { id: i64, reason: String },
}

/// Raised when inbound text cannot be read as `<amount> [description]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("`{0}` is not a number")]
    InvalidAmount(String),
    #[error("`{0}` has no numeric value")]
    NanAmount(String),
}

impl LedgerError {
    /// Wraps a poisoned-lock message so callers do not depend on std sync types.
    pub(crate) fn poisoned(what: &str) -> Self {
        LedgerError::StoreUnavailable(format!("{what} lock poisoned"))
    }
}
