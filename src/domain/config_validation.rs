//! Configuration validation.
//!
//! Validates config sections before a run starts.

use crate::domain::error::AlgotraderError;
use crate::domain::strategy::{DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW, MovingAverageCross};
use crate::ports::config_port::ConfigPort;

pub const LIVE_FEEDS: &[&str] = &["stooq", "kite"];

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), AlgotraderError> {
    let short = config.uint_or("strategy", "short_window", DEFAULT_SHORT_WINDOW as u64)?;
    let long = config.uint_or("strategy", "long_window", DEFAULT_LONG_WINDOW as u64)?;
    // Same rules, in the same order, as constructing the strategy.
    MovingAverageCross::new(short as usize, long as usize).map(|_| ())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), AlgotraderError> {
    validate_positive_cash(config, "backtest", "initial_cash")
}

pub fn validate_paper_config(config: &dyn ConfigPort) -> Result<(), AlgotraderError> {
    validate_positive_cash(config, "paper", "starting_cash")?;
    validate_non_negative(config, "paper", "delay_s")
}

pub fn validate_live_config(config: &dyn ConfigPort) -> Result<(), AlgotraderError> {
    config.require_string("live", "symbol")?;
    validate_positive_cash(config, "live", "starting_cash")?;
    validate_non_negative(config, "live", "interval_s")?;

    if let Some(feed) = config.get_string("live", "feed") {
        let feed = feed.trim().to_lowercase();
        if !LIVE_FEEDS.contains(&feed.as_str()) {
            return Err(AlgotraderError::invalid(
                "live",
                "feed",
                format!("unknown feed '{feed}', expected one of {}", LIVE_FEEDS.join(", ")),
            ));
        }
    }

    config.require_string("kite", "api_key")?;
    config.require_string("kite", "access_token")?;
    Ok(())
}

fn validate_positive_cash(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), AlgotraderError> {
    if let Some(value) = config.get_double(section, key)? {
        if !(value.is_finite() && value > 0.0) {
            return Err(AlgotraderError::invalid(
                section,
                key,
                format!("{key} must be positive"),
            ));
        }
    }
    Ok(())
}

fn validate_non_negative(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), AlgotraderError> {
    if let Some(value) = config.get_double(section, key)? {
        if !(value.is_finite() && value >= 0.0) {
            return Err(AlgotraderError::invalid(
                section,
                key,
                format!("{key} must be non-negative"),
            ));
        }
    }
    Ok(())
}
