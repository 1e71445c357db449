//! Domain error types.

/// Top-level error type for algotrader.
#[derive(Debug, thiserror::Error)]
pub enum AlgotraderError {
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

    #[error("short_window ({short}) must be less than long_window ({long})")]
    InvalidWindows { short: usize, long: usize },

    #[error("data feed error: {reason}")]
    DataFeed { reason: String },

    #[error("http error: {reason}")]
    Http { reason: String },

    #[error("broker rejected {action} {quantity} {symbol}: {reason}")]
    Broker {
        symbol: String,
        action: String,
        quantity: u64,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AlgotraderError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        AlgotraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(section: &str, key: &str) -> Self {
        AlgotraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }

    pub(crate) fn data_feed(reason: impl Into<String>) -> Self {
        AlgotraderError::DataFeed {
            reason: reason.into(),
        }
    }
}

impl From<csv::Error> for AlgotraderError {
    fn from(err: csv::Error) -> Self {
        AlgotraderError::DataFeed {
            reason: format!("CSV error: {err}"),
        }
    }
}

impl From<&AlgotraderError> for std::process::ExitCode {
    fn from(err: &AlgotraderError) -> Self {
        let code: u8 = match err {
            AlgotraderError::Io(_) => 1,
            AlgotraderError::ConfigParse { .. }
            | AlgotraderError::ConfigMissing { .. }
            | AlgotraderError::ConfigInvalid { .. }
            | AlgotraderError::InvalidWindows { .. } => 2,
            AlgotraderError::DataFeed { .. } | AlgotraderError::Http { .. } => 3,
            AlgotraderError::Broker { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_windows_message() {
        let err = AlgotraderError::InvalidWindows { short: 20, long: 5 };
        assert_eq!(
            err.to_string(),
            "short_window (20) must be less than long_window (5)"
        );
    }

    #[test]
    fn config_helpers_build_expected_variants() {
        let err = AlgotraderError::missing("strategy", "long_window");
        assert_eq!(err.to_string(), "missing config key [strategy] long_window");

        let err = AlgotraderError::invalid("backtest", "initial_cash", "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid config value [backtest] initial_cash: must be positive"
        );
    }

    #[test]
    fn broker_message_names_the_order() {
        let err = AlgotraderError::Broker {
            symbol: "INFY".into(),
            action: "buy".into(),
            quantity: 3,
            reason: "insufficient margin".into(),
        };
        assert_eq!(
            err.to_string(),
            "broker rejected buy 3 INFY: insufficient margin"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AlgotraderError = io.into();
        assert!(matches!(err, AlgotraderError::Io(_)));
    }
}
