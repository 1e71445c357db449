#![allow(dead_code)]

use algotrader::domain::bar::Bar;
use algotrader::domain::error::AlgotraderError;
use algotrader::domain::signal::Action;
use algotrader::ports::order_port::OrderSink;

/// Closes that warm up flat, rise into a crossover, then decline
/// until the short average falls back under the long one.
pub const CROSSOVER_CLOSES: [f64; 14] = [
    10.0, 10.0, 10.0, 10.0, 10.0, 11.0, 12.0, 13.0, 14.0, 20.0, 12.0, 9.0, 8.0, 7.0,
];

pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar::new(format!("2024-01-{:02}", i + 1), close))
        .collect()
}

pub fn as_stream(bars: &[Bar]) -> Vec<Result<Bar, AlgotraderError>> {
    bars.iter().cloned().map(Ok).collect()
}

/// Order sink that records orders and can be told to reject the n-th one.
#[derive(Default)]
pub struct MockOrderSink {
    pub orders: Vec<(String, Action, u64)>,
    pub reject_call: Option<usize>,
    calls: usize,
}

impl MockOrderSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(call: usize) -> Self {
        Self {
            reject_call: Some(call),
            ..Self::default()
        }
    }
}

impl OrderSink for MockOrderSink {
    fn execute(
        &mut self,
        symbol: &str,
        action: Action,
        quantity: u64,
    ) -> Result<String, AlgotraderError> {
        self.calls += 1;
        if self.reject_call == Some(self.calls) {
            return Err(AlgotraderError::Broker {
                symbol: symbol.to_string(),
                action: action.to_string(),
                quantity,
                reason: "order rejected".into(),
            });
        }
        self.orders.push((symbol.to_string(), action, quantity));
        Ok(format!("ORD{:04}", self.calls))
    }
}
