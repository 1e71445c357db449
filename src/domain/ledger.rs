//! Cash/position ledger and fill rules.
//!
//! The single set of accounting rules shared by the backtester and the
//! paper/live brokers:
//! 1. Buy sizes to whole affordable shares: floor(cash / price)
//! 2. A buy that cannot afford one share is skipped
//! 3. Sell liquidates the whole position
//! 4. Sell with no position is skipped
//!
//! Cash and position never go negative, and the position never exceeds
//! [`MAX_POSITION`] so it always fits the strategy's signed mirror.

use crate::domain::signal::{Action, Signal};

/// Largest position the ledger will hold.
pub const MAX_POSITION: u64 = i64::MAX as u64;

/// A sized order produced by [`Ledger::quote`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    action: Action,
    price: f64,
    shares: u64,
}

impl Fill {
    pub fn action(&self) -> Action {
        self.action
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn shares(&self) -> u64 {
        self.shares
    }

    pub fn notional(&self) -> f64 {
        self.shares as f64 * self.price
    }
}

/// One executed fill, with the ledger state right after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub timestamp: String,
    pub action: Action,
    pub price: f64,
    pub shares: u64,
    pub cash_after: f64,
    pub position_after: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    cash: f64,
    position: u64,
    trades: Vec<Trade>,
}

impl Ledger {
    /// Negative or non-finite starting cash is clamped to zero.
    pub fn new(initial_cash: f64) -> Self {
        let cash = if initial_cash.is_finite() && initial_cash > 0.0 {
            initial_cash
        } else {
            0.0
        };
        Ledger {
            cash,
            position: 0,
            trades: Vec::new(),
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn into_trades(self) -> Vec<Trade> {
        self.trades
    }

    /// cash + position * mark_price
    pub fn equity(&self, mark_price: f64) -> f64 {
        self.cash + self.position as f64 * mark_price
    }

    /// Size an order without touching the ledger. `None` means the action is
    /// a no-op at this price.
    pub fn quote(&self, action: Action, price: f64) -> Option<Fill> {
        if !(price.is_finite() && price > 0.0) {
            return None;
        }
        match action {
            Action::Buy => {
                let room = MAX_POSITION - self.position;
                if self.cash <= 0.0 || room == 0 {
                    return None;
                }
                let affordable = (self.cash / price).floor();
                if affordable < 1.0 {
                    return None;
                }
                // `as` saturates; the cap keeps the result within `room`.
                let mut shares = (affordable as u64).min(room);
                // Guard the floor against rounding pushing cost above cash.
                if shares as f64 * price > self.cash {
                    shares -= 1;
                }
                (shares > 0).then_some(Fill {
                    action,
                    price,
                    shares,
                })
            }
            Action::Sell => (self.position > 0).then_some(Fill {
                action,
                price,
                shares: self.position,
            }),
        }
    }

    /// Book a fill. Returns `None` and leaves the ledger untouched when the
    /// fill is not executable here: a buy costing more than the cash on hand
    /// or pushing the position past [`MAX_POSITION`], or a sell of more
    /// shares than are held.
    pub fn commit(&mut self, timestamp: &str, fill: Fill) -> Option<Trade> {
        if fill.shares == 0 || !(fill.price.is_finite() && fill.price > 0.0) {
            return None;
        }
        match fill.action {
            Action::Buy => {
                let cost = fill.notional();
                let position = self
                    .position
                    .checked_add(fill.shares)
                    .filter(|&p| p <= MAX_POSITION)?;
                if cost > self.cash {
                    return None;
                }
                self.cash -= cost;
                self.position = position;
            }
            Action::Sell => {
                self.position = self.position.checked_sub(fill.shares)?;
                self.cash += fill.notional();
            }
        }

        let trade = Trade {
            timestamp: timestamp.to_string(),
            action: fill.action,
            price: fill.price,
            shares: fill.shares,
            cash_after: self.cash,
            position_after: self.position,
        };
        self.trades.push(trade.clone());
        Some(trade)
    }

    /// Apply a signal at `price`. Hold, unaffordable buys and sells with no
    /// position leave the ledger unchanged and return `None`.
    pub fn apply(&mut self, timestamp: &str, signal: Signal, price: f64) -> Option<Trade> {
        let fill = self.quote(signal.action()?, price)?;
        self.commit(timestamp, fill)
    }
}
