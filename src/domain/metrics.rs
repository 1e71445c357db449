//! Performance metrics and statistics for a backtest run.

use super::backtest::BacktestResult;
use super::ledger::Trade;
use super::signal::Action;

const PERIODS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub initial_cash: f64,
    pub final_equity: f64,
    pub total_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: usize,
    pub fills: usize,
    pub round_trips: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub win_rate: f64,
    pub realized_pnl: f64,
}

impl Metrics {
    pub fn compute(result: &BacktestResult, initial_cash: f64) -> Self {
        let final_equity = result.final_equity().unwrap_or(initial_cash);

        let total_return = if initial_cash > 0.0 {
            (final_equity - initial_cash) / initial_cash
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(&result.equity_curve);
        let sharpe_ratio = compute_sharpe(&result.equity_curve);

        let pnls = round_trip_pnls(&result.trades);
        let trades_won = pnls.iter().filter(|&&p| p > 0.0).count();
        let trades_lost = pnls.iter().filter(|&&p| p < 0.0).count();
        let win_rate = if pnls.is_empty() {
            0.0
        } else {
            trades_won as f64 / pnls.len() as f64
        };

        Metrics {
            initial_cash,
            final_equity,
            total_return,
            sharpe_ratio,
            max_drawdown,
            max_drawdown_duration,
            fills: result.trades.len(),
            round_trips: pnls.len(),
            trades_won,
            trades_lost,
            win_rate,
            realized_pnl: pnls.iter().sum(),
        }
    }
}

/// PnL of each completed buy..sell cycle. Buys accumulate cost until the
/// liquidating sell; an open position at the end is not counted.
pub fn round_trip_pnls(trades: &[Trade]) -> Vec<f64> {
    let mut pnls = Vec::new();
    let mut open_cost = 0.0_f64;
    let mut open = false;

    for trade in trades {
        let notional = trade.shares as f64 * trade.price;
        match trade.action {
            Action::Buy => {
                open_cost += notional;
                open = true;
            }
            Action::Sell if open => {
                pnls.push(notional - open_cost);
                open_cost = 0.0;
                open = false;
            }
            Action::Sell => {}
        }
    }

    pnls
}

/// Largest peak-to-trough decline as a fraction of the peak, and the
/// longest run of bars spent below a prior peak.
fn compute_drawdown(equity_curve: &[f64]) -> (f64, usize) {
    let Some(&first) = equity_curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    let mut max_duration = 0usize;
    let mut duration = 0usize;

    for &equity in equity_curve {
        if equity >= peak {
            peak = equity;
            duration = 0;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - equity) / peak);
            duration += 1;
            max_duration = max_duration.max(duration);
        }
    }

    (max_dd, max_duration)
}

fn compute_sharpe(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect();

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        mean / stddev * PERIODS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}
