//! Property tests for the accounting invariants.

mod common;

use algotrader::domain::backtest::{BacktestConfig, Backtester};
use algotrader::domain::ledger::Ledger;
use algotrader::domain::paper::{Broker, PaperBroker, PaperTrader};
use algotrader::domain::signal::{Action, Signal};
use algotrader::domain::strategy::{MovingAverageCross, Strategy as _, StrategyState};
use common::*;
use proptest::prelude::*;

fn closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.5f64..500.0, 0..120)
}

fn windows() -> impl Strategy<Value = (usize, usize)> {
    (1usize..10).prop_flat_map(|short| (Just(short), (short + 1)..30))
}

fn signal() -> impl Strategy<Value = Signal> {
    prop_oneof![Just(Signal::Buy), Just(Signal::Sell), Just(Signal::Hold)]
}

proptest! {
    #[test]
    fn no_overdraft_no_short_and_equity_identity(
        prices in closes(),
        (short, long) in windows(),
        cash in 1.0f64..100_000.0,
    ) {
        let bars = make_bars(&prices);
        let result = Backtester::new(
            MovingAverageCross::new(short, long).unwrap(),
            BacktestConfig { initial_cash: cash },
        )
        .run(&bars);
        prop_assert_eq!(result.equity_curve.len(), bars.len());

        let mut trader = PaperTrader::new(
            MovingAverageCross::new(short, long).unwrap(),
            PaperBroker::new(cash),
        );
        for (i, bar) in bars.iter().enumerate() {
            trader.step(bar).unwrap();
            let broker = trader.broker();
            prop_assert!(broker.cash() >= 0.0);
            prop_assert!(trader.state().position >= 0);
            prop_assert_eq!(trader.state().position, broker.position() as i64);
            let equity = broker.cash() + broker.position() as f64 * bar.close;
            prop_assert!((result.equity_curve[i] - equity).abs() <= 1e-6 * equity.max(1.0));
        }

        for trade in &result.trades {
            prop_assert!(trade.cash_after >= 0.0);
            prop_assert!(trade.shares > 0);
            if trade.action == Action::Sell {
                prop_assert_eq!(trade.position_after, 0);
            }
        }
    }

    #[test]
    fn warmup_only_holds(
        (short, long) in windows(),
        prices in prop::collection::vec(0.5f64..500.0, 0..30),
    ) {
        let prices: Vec<f64> = prices.into_iter().take(long - 1).collect();
        let strategy = MovingAverageCross::new(short, long).unwrap();
        let mut state = StrategyState::new();
        for bar in make_bars(&prices) {
            prop_assert_eq!(strategy.on_bar(&mut state, &bar), Signal::Hold);
        }

        let result = Backtester::new(strategy, BacktestConfig::default()).run(&make_bars(&prices));
        prop_assert!(result.trades.is_empty());
    }

    #[test]
    fn hold_never_changes_ledger(
        ops in prop::collection::vec((signal(), 0.5f64..500.0), 0..40),
        cash in 0.0f64..50_000.0,
    ) {
        let mut ledger = Ledger::new(cash);
        for (i, (signal, price)) in ops.into_iter().enumerate() {
            let before = ledger.clone();
            let trade = ledger.apply(&format!("t{i}"), signal, price);
            match signal {
                Signal::Hold => {
                    prop_assert!(trade.is_none());
                    prop_assert_eq!(&ledger, &before);
                }
                Signal::Sell if before.position() == 0 => {
                    prop_assert!(trade.is_none());
                    prop_assert_eq!(&ledger, &before);
                }
                Signal::Sell => {
                    prop_assert_eq!(ledger.position(), 0);
                }
                Signal::Buy => {
                    prop_assert!(ledger.position() >= before.position());
                }
            }
            prop_assert!(ledger.cash() >= 0.0);
        }
    }

    #[test]
    fn buy_spends_at_most_available_cash(cash in 0.0f64..1_000_000.0, price in 0.01f64..10_000.0) {
        let mut ledger = Ledger::new(cash);
        match ledger.apply("t", Signal::Buy, price) {
            Some(trade) => {
                prop_assert!(trade.shares as f64 * price <= cash + 1e-9);
                prop_assert!(ledger.cash() <= price * (1.0 + 1e-9));
                prop_assert_eq!(ledger.position(), trade.shares);
            }
            None => prop_assert!(cash < price),
        }
    }
}
