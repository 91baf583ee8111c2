/// Domain-specific error types for the pricing engine.
/// Every failure reaches the caller as a typed value. The engine must:
/// - Never return a partial quote
/// - Never turn an invalid input into NaN or infinity
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("market data unavailable for {symbol} after {attempts} attempts{}", last_error_suffix(.last_error))]
    DataUnavailable {
        symbol: String,
        attempts: u32,
        last_error: Option<String>,
    },

    #[error("insufficient data: {points} price points, need at least 3")]
    InsufficientData { points: usize },

    #[error("invalid pricing parameters: {0}")]
    InvalidParameters(String),

    #[error("invalid price series: {0}")]
    InvalidSeries(String),

    #[error("risk-free rate {rate} outside plausible range [{min}, {max}]")]
    RateOutOfBounds { rate: f64, min: f64, max: f64 },

    #[error("config error: {0}")]
    Config(String),
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    last_error
        .as_deref()
        .map(|e| format!(" (last error: {e})"))
        .unwrap_or_default()
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Failure of a single provider attempt. Only these count toward the
/// fetcher's retry budget.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("network error: {0}")]
    Network(String),

    #[error("provider HTTP error: {status} {body}")]
    Http { status: u16, body: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("provider reported error: {0}")]
    Upstream(String),

    #[error("provider returned an empty series")]
    Empty,
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        FeedError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        FeedError::Parse(e.to_string())
    }
}

impl From<EngineError> for FeedError {
    fn from(e: EngineError) -> Self {
        FeedError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_unavailable_message_includes_last_error() {
        let err = EngineError::DataUnavailable {
            symbol: "AAPL".into(),
            attempts: 3,
            last_error: Some("HTTP 429".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("AAPL"), "msg={msg}");
        assert!(msg.contains("3 attempts"), "msg={msg}");
        assert!(msg.contains("HTTP 429"), "msg={msg}");
    }

    #[test]
    fn test_data_unavailable_without_last_error() {
        let err = EngineError::DataUnavailable {
            symbol: "^TNX".into(),
            attempts: 1,
            last_error: None,
        };
        assert_eq!(err.to_string(), "market data unavailable for ^TNX after 1 attempts");
    }
}
