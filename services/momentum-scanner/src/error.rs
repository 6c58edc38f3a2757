//! Scanner error taxonomy

use data_retrieval::DataRetrievalError;

/// Errors surfaced by the scanner pipeline
///
/// Payloads are plain strings so outcomes can be cloned into reports.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScanError {
    /// Network failure reaching an external service
    #[error("transport error: {0}")]
    Transport(String),

    /// The reasoning service answered with a non-success status
    #[error("reasoning service returned {status}: {body}")]
    Service { status: u16, body: String },

    /// The reasoning service answered without a parseable structured payload
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Missing credential or out-of-range setting; fatal to the whole run
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The market listing could not be fetched
    #[error("market data unavailable: {0}")]
    MarketData(String),
}

impl From<DataRetrievalError> for ScanError {
    fn from(e: DataRetrievalError) -> Self {
        ScanError::MarketData(e.to_string())
    }
}

impl From<config::ConfigError> for ScanError {
    fn from(e: config::ConfigError) -> Self {
        ScanError::Configuration(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
