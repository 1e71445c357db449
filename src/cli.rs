//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use crate::adapters::csv_adapter::{CsvBarFeed, CsvStreamingFeed, DEFAULT_STREAM_DELAY};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::trade_log::write_trades_to_path;
use crate::domain::backtest::{BacktestConfig, BacktestResult, Backtester, DEFAULT_INITIAL_CASH};
use crate::domain::config_validation::{
    validate_backtest_config, validate_live_config, validate_paper_config,
    validate_strategy_config,
};
use crate::domain::error::AlgotraderError;
use crate::domain::metrics::Metrics;
use crate::domain::paper::{DEFAULT_STARTING_CASH, PaperBroker, PaperTrader};
use crate::domain::strategy::{DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW, MovingAverageCross};
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "algotrader", about = "Moving-average backtester and paper trader")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over a CSV file of bars
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Bar CSV; overrides [backtest] data
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Write executed trades to this CSV file
        #[arg(long)]
        trades_out: Option<PathBuf>,
    },
    /// Paper trade against a CSV file replayed as a stream
    Paper {
        #[arg(short, long)]
        config: PathBuf,
        /// Bar CSV; overrides [paper] data
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Seconds between bars; overrides [paper] delay_s
        #[arg(long)]
        delay: Option<f64>,
    },
    /// Trade live through Kite Connect
    #[cfg(feature = "live")]
    Live {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// INFO level.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

/// Run one subcommand to completion.
pub fn execute(command: Command) -> Result<(), AlgotraderError> {
    match command {
        Command::Backtest {
            config,
            data,
            trades_out,
        } => run_backtest(&config, data.as_deref(), trades_out.as_deref()),
        Command::Paper {
            config,
            data,
            delay,
        } => run_paper(&config, data.as_deref(), delay),
        #[cfg(feature = "live")]
        Command::Live { config } => run_live(&config),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, AlgotraderError> {
    info!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

pub fn build_strategy(config: &dyn ConfigPort) -> Result<MovingAverageCross, AlgotraderError> {
    let short = config.uint_or("strategy", "short_window", DEFAULT_SHORT_WINDOW as u64)?;
    let long = config.uint_or("strategy", "long_window", DEFAULT_LONG_WINDOW as u64)?;
    MovingAverageCross::new(short as usize, long as usize)
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, AlgotraderError> {
    Ok(BacktestConfig {
        initial_cash: config.double_or("backtest", "initial_cash", DEFAULT_INITIAL_CASH)?,
    })
}

/// Seconds from config or CLI as a `Duration`. Negative, NaN and values too
/// large for a `Duration` are rejected.
pub fn seconds(section: &str, key: &str, value: f64) -> Result<Duration, AlgotraderError> {
    Duration::try_from_secs_f64(value).map_err(|_| {
        let reason = if value.is_nan() || value < 0.0 {
            format!("{key} must be a non-negative number of seconds, got {value}")
        } else {
            format!("{key} is out of range, got {value}")
        };
        AlgotraderError::invalid(section, key, reason)
    })
}

/// CLI path first, then `[section] data`.
pub fn resolve_data_path(
    cli_path: Option<&Path>,
    config: &dyn ConfigPort,
    section: &str,
) -> Result<PathBuf, AlgotraderError> {
    match cli_path {
        Some(p) => Ok(p.to_path_buf()),
        None => config.require_string(section, "data").map(PathBuf::from),
    }
}

fn run_backtest(
    config_path: &Path,
    data: Option<&Path>,
    trades_out: Option<&Path>,
) -> Result<(), AlgotraderError> {
    let config = load_config(config_path)?;
    validate_strategy_config(&config)?;
    validate_backtest_config(&config)?;

    let strategy = build_strategy(&config)?;
    let bt_config = build_backtest_config(&config)?;
    let data_path = resolve_data_path(data, &config, "backtest")?;

    info!(
        "Backtesting SMA({}/{}) over {}",
        strategy.short_window(),
        strategy.long_window(),
        data_path.display()
    );
    let bars = CsvBarFeed::new(&data_path).load()?;
    let backtester = Backtester::new(strategy, bt_config);
    let result = backtester.run(&bars);

    print_summary(&result, backtester.config().initial_cash);

    if let Some(path) = trades_out {
        write_trades_to_path(path, &result.trades)?;
        info!("Wrote {} trades to {}", result.trades.len(), path.display());
    }
    Ok(())
}

pub fn print_summary(result: &BacktestResult, initial_cash: f64) {
    let m = Metrics::compute(result, initial_cash);
    println!("Bars:            {}", result.equity_curve.len());
    println!("Initial cash:    {:.2}", m.initial_cash);
    println!("Final equity:    {:.2}", m.final_equity);
    println!("Total return:    {:.2}%", m.total_return * 100.0);
    println!("Max drawdown:    {:.2}% ({} bars)", m.max_drawdown * 100.0, m.max_drawdown_duration);
    println!("Sharpe ratio:    {:.3}", m.sharpe_ratio);
    println!("Fills:           {}", m.fills);
    println!(
        "Round trips:     {} (won {}, lost {}, win rate {:.1}%)",
        m.round_trips,
        m.trades_won,
        m.trades_lost,
        m.win_rate * 100.0
    );
    println!("Realized PnL:    {:.2}", m.realized_pnl);
}

fn run_paper(
    config_path: &Path,
    data: Option<&Path>,
    delay: Option<f64>,
) -> Result<(), AlgotraderError> {
    let config = load_config(config_path)?;
    validate_strategy_config(&config)?;
    validate_paper_config(&config)?;

    let strategy = build_strategy(&config)?;
    let starting_cash = config.double_or("paper", "starting_cash", DEFAULT_STARTING_CASH)?;
    let delay = match delay {
        Some(secs) => seconds("paper", "delay_s", secs)?,
        None => match config.get_double("paper", "delay_s")? {
            Some(secs) => seconds("paper", "delay_s", secs)?,
            None => DEFAULT_STREAM_DELAY,
        },
    };
    let data_path = resolve_data_path(data, &config, "paper")?;

    info!("Paper trading {} with {:.2} cash", data_path.display(), starting_cash);
    let feed = CsvStreamingFeed::new(&data_path, delay);
    let mut trader = PaperTrader::new(strategy, PaperBroker::new(starting_cash));
    trader.run(feed.stream()?)?;

    let broker = trader.broker();
    println!("Orders:   {}", broker.orders().len());
    println!("Cash:     {:.2}", broker.ledger().cash());
    println!("Position: {}", broker.ledger().position());
    Ok(())
}

#[cfg(feature = "live")]
fn run_live(config_path: &Path) -> Result<(), AlgotraderError> {
    use crate::adapters::kite_adapter::{
        DEFAULT_POLL_INTERVAL as KITE_INTERVAL, KiteBroker, KiteLiveFeed,
    };
    use crate::adapters::stooq_adapter::{
        DEFAULT_POLL_INTERVAL as STOOQ_INTERVAL, DEFAULT_TIMEOUT, StooqLiveFeed,
    };
    use crate::domain::paper::LiveBroker;

    let config = load_config(config_path)?;
    validate_strategy_config(&config)?;
    validate_live_config(&config)?;

    let strategy = build_strategy(&config)?;
    let settings = build_live_settings(&config)?;
    let sink = KiteBroker::new(&settings.credentials, settings.order_params.clone())?;
    let broker = LiveBroker::new(sink, &settings.symbol, settings.starting_cash);
    let mut trader = PaperTrader::new(strategy, broker);

    info!(
        "Live trading {} on {} via {} feed",
        settings.symbol, settings.order_params.exchange, settings.feed
    );
    match settings.feed.as_str() {
        "stooq" => {
            let interval = settings.interval.unwrap_or(STOOQ_INTERVAL);
            let symbol = config
                .get_string("live", "feed_symbol")
                .unwrap_or_else(|| settings.symbol.clone());
            let feed = StooqLiveFeed::new(&symbol, interval, DEFAULT_TIMEOUT)?;
            trader.run(feed.stream())
        }
        _ => {
            let interval = settings.interval.unwrap_or(KITE_INTERVAL);
            let feed = KiteLiveFeed::new(
                &settings.credentials,
                &settings.order_params.exchange,
                &settings.symbol,
                interval,
            )?;
            trader.run(feed.stream())
        }
    }
}

#[cfg(feature = "live")]
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSettings {
    pub symbol: String,
    pub feed: String,
    pub interval: Option<Duration>,
    pub starting_cash: f64,
    pub credentials: crate::adapters::kite_adapter::KiteCredentials,
    pub order_params: crate::adapters::kite_adapter::KiteOrderParams,
}

#[cfg(feature = "live")]
pub fn build_live_settings(config: &dyn ConfigPort) -> Result<LiveSettings, AlgotraderError> {
    use crate::adapters::kite_adapter::{KiteCredentials, KiteOrderParams};

    let defaults = KiteOrderParams::default();
    let or_default = |section: &str, key: &str, default: &str| {
        config
            .get_string(section, key)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    let interval = match config.get_double("live", "interval_s")? {
        Some(secs) => Some(seconds("live", "interval_s", secs)?),
        None => None,
    };

    Ok(LiveSettings {
        symbol: config.require_string("live", "symbol")?,
        feed: or_default("live", "feed", "kite").trim().to_lowercase(),
        interval,
        starting_cash: config.double_or("live", "starting_cash", DEFAULT_STARTING_CASH)?,
        credentials: KiteCredentials {
            api_key: config.require_string("kite", "api_key")?,
            access_token: config.require_string("kite", "access_token")?,
        },
        order_params: KiteOrderParams {
            exchange: or_default("live", "exchange", defaults.exchange.as_str()),
            product: or_default("kite", "product", defaults.product.as_str()),
            order_type: or_default("kite", "order_type", defaults.order_type.as_str()),
            variety: or_default("kite", "variety", defaults.variety.as_str()),
        },
    })
}

fn run_validate(config_path: &Path) -> Result<(), AlgotraderError> {
    let config = load_config(config_path)?;
    validate_strategy_config(&config)?;
    let strategy = build_strategy(&config)?;
    info!(
        "Strategy: SMA crossover short={} long={}",
        strategy.short_window(),
        strategy.long_window()
    );

    validate_backtest_config(&config)?;
    validate_paper_config(&config)?;
    if config.get_string("live", "symbol").is_some() {
        validate_live_config(&config)?;
    }
    println!("Configuration is valid.");
    Ok(())
}
