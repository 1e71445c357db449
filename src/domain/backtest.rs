//! Backtest engine and event loop.
//!
//! BacktestConfig defines backtest parameters.

use tracing::{debug, info};

use crate::domain::bar::Bar;
use crate::domain::ledger::{Ledger, Trade};
use crate::domain::strategy::{Strategy, StrategyState};

pub const DEFAULT_INITIAL_CASH: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_cash: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_cash: DEFAULT_INITIAL_CASH,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    /// Post-bar equity, one entry per input bar.
    pub equity_curve: Vec<f64>,
    pub trades: Vec<Trade>,
}

impl BacktestResult {
    pub fn final_equity(&self) -> Option<f64> {
        self.equity_curve.last().copied()
    }
}

/// Replays a finite bar sequence through a strategy and a fresh ledger.
#[derive(Debug, Clone)]
pub struct Backtester<S> {
    strategy: S,
    config: BacktestConfig,
}

impl<S: Strategy> Backtester<S> {
    pub fn new(strategy: S, config: BacktestConfig) -> Self {
        Backtester { strategy, config }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Each call starts from a fresh state and ledger, so runs are repeatable.
    pub fn run(&self, bars: &[Bar]) -> BacktestResult {
        let mut state = StrategyState::new();
        let mut ledger = Ledger::new(self.config.initial_cash);
        let mut equity_curve = Vec::with_capacity(bars.len());

        for bar in bars {
            let signal = self.strategy.on_bar(&mut state, bar);
            if let Some(trade) = ledger.apply(&bar.timestamp, signal, bar.close) {
                debug!(
                    timestamp = %trade.timestamp,
                    action = %trade.action,
                    price = trade.price,
                    shares = trade.shares,
                    cash = trade.cash_after,
                    "backtest fill"
                );
            }
            state.sync_position(ledger.position());
            equity_curve.push(ledger.equity(bar.close));
        }

        info!(
            bars = bars.len(),
            trades = ledger.trades().len(),
            final_equity = equity_curve.last().copied().unwrap_or(ledger.cash()),
            "backtest complete"
        );

        BacktestResult {
            equity_curve,
            trades: ledger.into_trades(),
        }
    }
}
