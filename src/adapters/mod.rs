//! Concrete adapter implementations for ports and bar sources.

pub mod csv_adapter;
pub mod file_config_adapter;
#[cfg(feature = "live")]
pub mod kite_adapter;
pub mod polling;
#[cfg(feature = "live")]
pub mod stooq_adapter;
pub mod trade_log;
