//! Error types for the plan-finder front end.

use plan_search::DiscoveryError;

/// Top-level error type for the command-line front end.
#[derive(Debug, thiserror::Error)]
pub enum FinderError {
    /// Config file could not be parsed or written.
    #[error("config error: {0}")]
    Config(String),

    /// Discovery refused to run.
    #[error("discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, FinderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_errors_convert() {
        let err: FinderError = DiscoveryError::Configuration("blank name".into()).into();
        assert_eq!(
            err.to_string(),
            "discovery error: configuration error: blank name"
        );
    }

    #[test]
    fn io_errors_convert() {
        let err: FinderError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.to_string().starts_with("I/O error"));
    }
}
