//! Strategy contract and the moving-average crossover strategy.

use crate::domain::bar::Bar;
use crate::domain::error::AlgotraderError;
use crate::domain::moving_average::sma_last;
use crate::domain::signal::Signal;

pub const DEFAULT_SHORT_WINDOW: usize = 5;
pub const DEFAULT_LONG_WINDOW: usize = 20;

/// Rolling state for one run. Owned by the orchestrator and lent to the
/// strategy on every bar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyState {
    /// Mirror of the executed position; written only by the orchestrator.
    pub position: i64,
    /// Every close seen so far, in arrival order.
    pub prices: Vec<f64>,
}

impl StrategyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror an executed long position. Counts beyond `i64::MAX` saturate
    /// rather than wrap negative.
    pub fn sync_position(&mut self, shares: u64) {
        self.position = i64::try_from(shares).unwrap_or(i64::MAX);
    }
}

/// Given the rolling state and a new bar, produce a signal.
///
/// Implementations append the bar to `state.prices` and must not touch
/// `state.position`.
pub trait Strategy {
    fn on_bar(&self, state: &mut StrategyState, bar: &Bar) -> Signal;
}

impl<S: Strategy + ?Sized> Strategy for &S {
    fn on_bar(&self, state: &mut StrategyState, bar: &Bar) -> Signal {
        (**self).on_bar(state, bar)
    }
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn on_bar(&self, state: &mut StrategyState, bar: &Bar) -> Signal {
        (**self).on_bar(state, bar)
    }
}

/// Long/flat crossover of a short and a long simple moving average.
#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverageCross {
    short_window: usize,
    long_window: usize,
}

impl MovingAverageCross {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self, AlgotraderError> {
        if short_window >= long_window {
            return Err(AlgotraderError::InvalidWindows {
                short: short_window,
                long: long_window,
            });
        }
        if short_window == 0 {
            return Err(AlgotraderError::invalid(
                "strategy",
                "short_window",
                "short_window must be at least 1",
            ));
        }
        Ok(Self {
            short_window,
            long_window,
        })
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }
}

impl Default for MovingAverageCross {
    fn default() -> Self {
        Self {
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
        }
    }
}

impl Strategy for MovingAverageCross {
    fn on_bar(&self, state: &mut StrategyState, bar: &Bar) -> Signal {
        state.prices.push(bar.close);

        let (Some(short_ma), Some(long_ma)) = (
            sma_last(&state.prices, self.short_window),
            sma_last(&state.prices, self.long_window),
        ) else {
            return Signal::Hold;
        };

        if short_ma > long_ma && state.position <= 0 {
            Signal::Buy
        } else if short_ma < long_ma && state.position >= 0 {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}
