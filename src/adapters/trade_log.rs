//! CSV trade log writer.

use crate::domain::error::AlgotraderError;
use crate::domain::ledger::Trade;
use std::io::Write;
use std::path::Path;

pub const TRADE_LOG_HEADER: [&str; 6] = [
    "timestamp",
    "action",
    "price",
    "shares",
    "cash_after",
    "position_after",
];

/// Write trades, one row per fill, in execution order.
pub fn write_trades<W: Write>(out: W, trades: &[Trade]) -> Result<(), AlgotraderError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(TRADE_LOG_HEADER)?;
    for trade in trades {
        writer.write_record([
            trade.timestamp.clone(),
            trade.action.to_string(),
            trade.price.to_string(),
            trade.shares.to_string(),
            trade.cash_after.to_string(),
            trade.position_after.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_trades_to_path(path: &Path, trades: &[Trade]) -> Result<(), AlgotraderError> {
    let file = std::fs::File::create(path)?;
    write_trades(file, trades)
}
