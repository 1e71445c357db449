//! Core domain types and logic.

pub mod bar;
pub mod signal;
pub mod moving_average;
pub mod strategy;
pub mod ledger;
pub mod backtest;
pub mod paper;
pub mod metrics;
pub mod config_validation;
pub mod error;
