use thiserror::Error;

/// Errors from baseline learning, detection and the monitoring loop.
#[derive(Debug, Error)]
pub enum SentinelError {
    #[error("invalid argument: {name} -- {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("detector has not been trained: call learn_normal(samples) first")]
    NotTrained,

    #[error("monitor output failed: {0}")]
    Output(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl SentinelError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        SentinelError::InvalidArgument {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for SentinelError {
    fn from(e: std::io::Error) -> Self {
        SentinelError::Output(e.to_string())
    }
}

impl From<config::ConfigError> for SentinelError {
    fn from(e: config::ConfigError) -> Self {
        SentinelError::Config(e.to_string())
    }
}

/// Convenience type alias for sentinel results.
pub type SentinelResult<T> = Result<T, SentinelError>;
