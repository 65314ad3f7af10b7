use thiserror::Error;

/// Failures that can occur while producing an index reading.
///
/// None of these escape `IndexCalculator::compute` or `IndexService`; they are
/// logged and replaced with neutral values there.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("No market data available")]
    DataUnavailable,

    #[error("Computation undefined: {0}")]
    ComputationUndefined(String),

    #[error("Upstream market data request failed: {0}")]
    UpstreamFailure(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl IndexError {
    pub fn undefined(msg: impl Into<String>) -> Self {
        IndexError::ComputationUndefined(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        IndexError::UpstreamFailure(msg.into())
    }
}

impl From<reqwest::Error> for IndexError {
    fn from(err: reqwest::Error) -> Self {
        IndexError::UpstreamFailure(err.to_string())
    }
}

impl From<config::ConfigError> for IndexError {
    fn from(err: config::ConfigError) -> Self {
        IndexError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
