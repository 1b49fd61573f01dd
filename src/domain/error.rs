//! Domain error types.
//!
//! Per-instrument data problems (short series, missing quotes) are never errors:
//! the engine excludes the instrument for the day and continues. The variants
//! here cover the boundaries that do surface as `Result`s — configuration,
//! account/capital queries, order submission and adapter I/O.

/// Top-level error type for mintrend.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("account query failed for {account}: {reason}")]
    AccountQuery { account: String, reason: String },

    #[error("order rejected for {symbol}: {reason}")]
    OrderRejected { symbol: String, reason: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&EngineError> for std::process::ExitCode {
    fn from(err: &EngineError) -> Self {
        let code: u8 = match err {
            EngineError::Io(_) => 1,
            EngineError::ConfigParse { .. }
            | EngineError::ConfigMissing { .. }
            | EngineError::ConfigInvalid { .. } => 2,
            EngineError::Data { .. } => 3,
            EngineError::AccountQuery { .. } | EngineError::OrderRejected { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
