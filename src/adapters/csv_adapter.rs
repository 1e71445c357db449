//! CSV file bar feeds.
//!
//! The file needs a header row with at least `timestamp` and `close`
//! columns; other columns are ignored and rows are kept in file order.
//! A close that is NaN or infinite is a feed error.

use crate::domain::bar::Bar;
use crate::domain::error::AlgotraderError;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_STREAM_DELAY: Duration = Duration::from_secs(1);

/// Lazy iterator over the bars of one CSV file.
pub struct CsvBars {
    records: csv::DeserializeRecordsIntoIter<File, Bar>,
    path: PathBuf,
}

impl Iterator for CsvBars {
    type Item = Result<Bar, AlgotraderError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        Some(
            record
                .map_err(|e| AlgotraderError::data_feed(format!("{}: {}", self.path.display(), e)))
                .and_then(|bar| {
                    if bar.close.is_finite() {
                        Ok(bar)
                    } else {
                        Err(AlgotraderError::data_feed(format!(
                            "{}: non-finite close {} at {}",
                            self.path.display(),
                            bar.close,
                            bar.timestamp
                        )))
                    }
                }),
        )
    }
}

fn open_bars(path: &Path) -> Result<CsvBars, AlgotraderError> {
    let file = File::open(path).map_err(|e| {
        AlgotraderError::data_feed(format!("failed to open {}: {}", path.display(), e))
    })?;
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);
    Ok(CsvBars {
        records: reader.into_deserialize(),
        path: path.to_path_buf(),
    })
}

/// Historical bars for backtesting.
pub struct CsvBarFeed {
    path: PathBuf,
}

impl CsvBarFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bars(&self) -> Result<CsvBars, AlgotraderError> {
        open_bars(&self.path)
    }

    /// Read the whole file. The first malformed row fails the load.
    pub fn load(&self) -> Result<Vec<Bar>, AlgotraderError> {
        let bars = self.bars()?.collect::<Result<Vec<_>, _>>()?;
        debug!(path = %self.path.display(), bars = bars.len(), "loaded bars");
        Ok(bars)
    }
}

/// Replays a CSV file as if it were a live feed, pausing after each bar.
pub struct CsvStreamingFeed {
    path: PathBuf,
    delay: Duration,
}

impl CsvStreamingFeed {
    pub fn new(path: impl Into<PathBuf>, delay: Duration) -> Self {
        Self {
            path: path.into(),
            delay,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn stream(&self) -> Result<PacedBars, AlgotraderError> {
        Ok(PacedBars {
            bars: open_bars(&self.path)?,
            delay: self.delay,
            started: false,
        })
    }
}

/// Bars that wait `delay` before each pull after the first, so a consumer
/// sees one bar per interval.
pub struct PacedBars {
    bars: CsvBars,
    delay: Duration,
    started: bool,
}

impl Iterator for PacedBars {
    type Item = Result<Bar, AlgotraderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.started && !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        self.started = true;
        self.bars.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Instant;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_reads_rows_in_file_order() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "bars.csv",
            "timestamp,close\n2024-01-17,115.0\n2024-01-15,105.0\n2024-01-16,110.5\n",
        );
        let bars = CsvBarFeed::new(path).load().unwrap();
        assert_eq!(
            bars,
            vec![
                Bar::new("2024-01-17", 115.0),
                Bar::new("2024-01-15", 105.0),
                Bar::new("2024-01-16", 110.5),
            ]
        );
    }

    #[test]
    fn extra_columns_are_ignored() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "ohlcv.csv",
            "timestamp,open,high,low,close,volume\n2024-01-15,100,110,90,105,50000\n",
        );
        let bars = CsvBarFeed::new(path).load().unwrap();
        assert_eq!(bars, vec![Bar::new("2024-01-15", 105.0)]);
    }

    #[test]
    fn header_only_yields_no_bars() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "empty.csv", "timestamp,close\n");
        assert!(CsvBarFeed::new(path).load().unwrap().is_empty());
    }

    #[test]
    fn missing_close_column_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "bad.csv", "timestamp,price\n2024-01-15,105.0\n");
        let err = CsvBarFeed::new(path).load().unwrap_err();
        assert!(matches!(err, AlgotraderError::DataFeed { .. }));
    }

    #[test]
    fn non_numeric_close_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "bad.csv", "timestamp,close\n2024-01-15,abc\n");
        assert!(CsvBarFeed::new(path).load().is_err());
    }

    #[test]
    fn non_finite_close_is_error() {
        let dir = TempDir::new().unwrap();
        for close in ["NaN", "inf", "-infinity"] {
            let path = write_csv(
                &dir,
                "nan.csv",
                &format!("timestamp,close\n2024-01-15,105.0\n2024-01-16,{close}\n"),
            );
            let err = CsvBarFeed::new(path).load().unwrap_err();
            assert!(
                matches!(err, AlgotraderError::DataFeed { ref reason } if reason.contains("2024-01-16")),
                "{close}: {err}"
            );
        }
    }

    #[test]
    fn streaming_feed_reports_non_finite_close() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "s.csv", "timestamp,close\na,1\nb,NaN\nc,3\n");
        let mut bars = CsvStreamingFeed::new(path, Duration::ZERO).stream().unwrap();
        assert!(bars.next().unwrap().is_ok());
        assert!(matches!(bars.next(), Some(Err(AlgotraderError::DataFeed { .. }))));
    }

    #[test]
    fn missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let err = CsvBarFeed::new(dir.path().join("nope.csv")).load().unwrap_err();
        assert!(matches!(err, AlgotraderError::DataFeed { .. }));
    }

    #[test]
    fn bars_is_lazy_and_reports_row_errors_in_place() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "mixed.csv",
            "timestamp,close\na,1.0\nb,oops\nc,3.0\n",
        );
        let mut bars = CsvBarFeed::new(path).bars().unwrap();
        assert_eq!(bars.next().unwrap().unwrap(), Bar::new("a", 1.0));
        assert!(bars.next().unwrap().is_err());
        assert_eq!(bars.next().unwrap().unwrap(), Bar::new("c", 3.0));
        assert!(bars.next().is_none());
    }

    #[test]
    fn streaming_feed_without_delay() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "s.csv", "timestamp,close\na,1\nb,2\n");
        let feed = CsvStreamingFeed::new(path, Duration::ZERO);
        let bars: Vec<Bar> = feed.stream().unwrap().map(Result::unwrap).collect();
        assert_eq!(bars.len(), 2);
    }

    #[test]
    fn streaming_feed_pauses_between_bars() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "s.csv", "timestamp,close\na,1\nb,2\n");
        let feed = CsvStreamingFeed::new(path, Duration::from_millis(20));
        let start = Instant::now();
        let count = feed.stream().unwrap().count();
        assert_eq!(count, 2);
        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}
