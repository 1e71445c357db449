//! Paper and live trading over a bar stream.
//!
//! `PaperTrader` drives a strategy bar by bar and routes buy/sell signals to
//! a [`Broker`]. After every submission the strategy's position is read back
//! from the broker, so the strategy always sees what actually executed.

use tracing::{debug, info};

use crate::domain::bar::Bar;
use crate::domain::error::AlgotraderError;
use crate::domain::ledger::{Ledger, Trade};
use crate::domain::signal::Action;
use crate::domain::strategy::{Strategy, StrategyState};
use crate::ports::order_port::OrderSink;

pub const DEFAULT_STARTING_CASH: f64 = 10_000.0;

/// Where the trader sends orders. `position` is authoritative.
pub trait Broker {
    fn submit(&mut self, bar: &Bar, action: Action) -> Result<Option<Trade>, AlgotraderError>;
    fn position(&self) -> u64;
    fn cash(&self) -> f64;
}

/// In-memory broker that fills every order at the bar close.
#[derive(Debug, Clone, PartialEq)]
pub struct PaperBroker {
    ledger: Ledger,
}

impl PaperBroker {
    pub fn new(starting_cash: f64) -> Self {
        PaperBroker {
            ledger: Ledger::new(starting_cash),
        }
    }

    pub fn orders(&self) -> &[Trade] {
        self.ledger.trades()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}

impl Default for PaperBroker {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_CASH)
    }
}

impl Broker for PaperBroker {
    fn submit(&mut self, bar: &Bar, action: Action) -> Result<Option<Trade>, AlgotraderError> {
        Ok(self
            .ledger
            .quote(action, bar.close)
            .and_then(|fill| self.ledger.commit(&bar.timestamp, fill)))
    }

    fn position(&self) -> u64 {
        self.ledger.position()
    }

    fn cash(&self) -> f64 {
        self.ledger.cash()
    }
}

/// Broker that places real orders through an [`OrderSink`].
///
/// A shadow ledger sizes each order with the same rules as the paper broker.
/// The fill is booked only after the sink accepts the order.
#[derive(Debug)]
pub struct LiveBroker<O> {
    sink: O,
    symbol: String,
    ledger: Ledger,
    order_ids: Vec<String>,
}

impl<O: OrderSink> LiveBroker<O> {
    pub fn new(sink: O, symbol: impl Into<String>, starting_cash: f64) -> Self {
        LiveBroker {
            sink,
            symbol: symbol.into(),
            ledger: Ledger::new(starting_cash),
            order_ids: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Broker order ids, parallel to `ledger().trades()`.
    pub fn order_ids(&self) -> &[String] {
        &self.order_ids
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn sink(&self) -> &O {
        &self.sink
    }
}

impl<O: OrderSink> Broker for LiveBroker<O> {
    fn submit(&mut self, bar: &Bar, action: Action) -> Result<Option<Trade>, AlgotraderError> {
        let Some(fill) = self.ledger.quote(action, bar.close) else {
            return Ok(None);
        };
        let order_id = self.sink.execute(&self.symbol, action, fill.shares())?;
        info!(
            order_id = %order_id,
            symbol = %self.symbol,
            action = %action,
            quantity = fill.shares(),
            "order placed"
        );
        self.order_ids.push(order_id);
        Ok(self.ledger.commit(&bar.timestamp, fill))
    }

    fn position(&self) -> u64 {
        self.ledger.position()
    }

    fn cash(&self) -> f64 {
        self.ledger.cash()
    }
}

/// Runs a strategy against a finite or infinite stream of bars.
#[derive(Debug)]
pub struct PaperTrader<S, B = PaperBroker> {
    strategy: S,
    broker: B,
    state: StrategyState,
}

impl<S: Strategy, B: Broker> PaperTrader<S, B> {
    pub fn new(strategy: S, broker: B) -> Self {
        PaperTrader {
            strategy,
            broker,
            state: StrategyState::new(),
        }
    }

    pub fn state(&self) -> &StrategyState {
        &self.state
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    pub fn into_broker(self) -> B {
        self.broker
    }

    /// Process one bar. Broker errors propagate and leave the state's
    /// position at the broker's last known position.
    pub fn step(&mut self, bar: &Bar) -> Result<Option<Trade>, AlgotraderError> {
        let signal = self.strategy.on_bar(&mut self.state, bar);
        let Some(action) = signal.action() else {
            return Ok(None);
        };

        let result = self.broker.submit(bar, action);
        self.state.sync_position(self.broker.position());
        let trade = result?;

        match &trade {
            Some(t) => debug!(
                timestamp = %t.timestamp,
                action = %t.action,
                price = t.price,
                shares = t.shares,
                cash = t.cash_after,
                position = t.position_after,
                "paper fill"
            ),
            None => debug!(timestamp = %bar.timestamp, %action, "signal not executable, skipped"),
        }
        Ok(trade)
    }

    /// Pull bars one at a time until the stream ends or an error occurs.
    pub fn run<I>(&mut self, stream: I) -> Result<(), AlgotraderError>
    where
        I: IntoIterator<Item = Result<Bar, AlgotraderError>>,
    {
        let mut processed = 0usize;
        for bar in stream {
            self.step(&bar?)?;
            processed += 1;
        }
        info!(
            bars = processed,
            cash = self.broker.cash(),
            position = self.broker.position(),
            "stream ended"
        );
        Ok(())
    }
}
