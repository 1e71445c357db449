//! Stooq quote feed.
//!
//! Polls Stooq's public CSV quote endpoint for the latest price of one
//! symbol. The endpoint answers with a header and one data row; fields are
//! `N/D` when no quote is available.

use crate::adapters::polling::PollingStream;
use crate::domain::bar::Bar;
use crate::domain::error::AlgotraderError;
use chrono::{NaiveDate, NaiveTime};
use std::time::Duration;

pub const STOOQ_QUOTE_URL: &str = "https://stooq.com/q/l/";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct StooqLiveFeed {
    symbol: String,
    interval: Duration,
    client: reqwest::blocking::Client,
}

impl StooqLiveFeed {
    pub fn new(symbol: &str, interval: Duration, timeout: Duration) -> Result<Self, AlgotraderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AlgotraderError::Http {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            symbol: symbol.to_lowercase(),
            interval,
            client,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn quote_url(&self) -> String {
        format!("{STOOQ_QUOTE_URL}?s={}&f=sd2t2ohlcv&h&e=csv", self.symbol)
    }

    /// One request. `Ok(None)` when Stooq has no quote for the symbol.
    pub fn poll(&self) -> Result<Option<Bar>, AlgotraderError> {
        let body = self
            .client
            .get(self.quote_url())
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| AlgotraderError::Http {
                reason: format!("stooq {}: {e}", self.symbol),
            })?;
        parse_quote_csv(&body)
    }

    pub fn stream(&self) -> PollingStream<impl FnMut() -> Result<Option<Bar>, AlgotraderError> + '_> {
        PollingStream::new(self.interval, move || self.poll())
    }
}

/// Parse a Stooq quote response into a bar stamped `"{Date} {Time}"`.
pub fn parse_quote_csv(body: &str) -> Result<Option<Bar>, AlgotraderError> {
    let body = body.trim();
    if body.lines().count() < 2 {
        return Ok(None);
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());
    let headers = reader.headers()?.clone();
    let Some(record) = reader.records().next() else {
        return Ok(None);
    };
    let record = record?;

    let field = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .and_then(|i| record.get(i))
            .ok_or_else(|| AlgotraderError::data_feed(format!("stooq response has no {name} column")))
    };

    let (date, time, close) = (field("Date")?, field("Time")?, field("Close")?);
    let (Ok(date), Ok(time), Ok(close)) = (
        NaiveDate::parse_from_str(date, "%Y-%m-%d"),
        NaiveTime::parse_from_str(time, "%H:%M:%S"),
        close.parse::<f64>(),
    ) else {
        return Ok(None);
    };
    if !close.is_finite() {
        return Ok(None);
    }

    Ok(Some(Bar::new(
        format!("{} {}", date.format("%Y-%m-%d"), time.format("%H:%M:%S")),
        close,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUOTE: &str = "Symbol,Date,Time,Open,High,Low,Close,Volume\r\n\
        AAPL.US,2024-01-05,22:00:11,181.99,182.76,180.17,181.18,62379661\r\n";

    #[test]
    fn parses_quote_row() {
        let bar = parse_quote_csv(QUOTE).unwrap().unwrap();
        assert_eq!(bar.timestamp, "2024-01-05 22:00:11");
        assert!((bar.close - 181.18).abs() < f64::EPSILON);
    }

    #[test]
    fn no_data_row_is_none() {
        assert_eq!(parse_quote_csv("").unwrap(), None);
        assert_eq!(
            parse_quote_csv("Symbol,Date,Time,Open,High,Low,Close,Volume\n").unwrap(),
            None
        );
    }

    #[test]
    fn not_available_fields_are_none() {
        let body = "Symbol,Date,Time,Open,High,Low,Close,Volume\n\
            XYZ.US,N/D,N/D,N/D,N/D,N/D,N/D,N/D\n";
        assert_eq!(parse_quote_csv(body).unwrap(), None);
    }

    #[test]
    fn non_finite_close_is_none() {
        let body = "Symbol,Date,Time,Open,High,Low,Close,Volume\n\
            XYZ.US,2024-01-05,22:00:11,1,1,1,NaN,0\n";
        assert_eq!(parse_quote_csv(body).unwrap(), None);
    }

    #[test]
    fn missing_close_column_is_error() {
        let body = "Symbol,Date,Time\nAAPL.US,2024-01-05,22:00:11\n";
        assert!(matches!(
            parse_quote_csv(body),
            Err(AlgotraderError::DataFeed { .. })
        ));
    }

    #[test]
    fn symbol_is_lowercased_in_url() {
        let feed = StooqLiveFeed::new("AAPL.US", Duration::ZERO, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(feed.symbol(), "aapl.us");
        assert_eq!(
            feed.quote_url(),
            "https://stooq.com/q/l/?s=aapl.us&f=sd2t2ohlcv&h&e=csv"
        );
    }
}
