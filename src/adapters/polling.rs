//! Fixed-interval polling turned into a blocking bar stream.

use crate::domain::bar::Bar;
use crate::domain::error::AlgotraderError;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Calls `poll` every `interval` and yields each bar it returns.
///
/// A poll returning `Ok(None)` (no quote available) is skipped. The first
/// error is yielded and ends the stream. Without an error the stream never
/// ends.
pub struct PollingStream<F> {
    poll: F,
    interval: Duration,
    started: bool,
    done: bool,
}

impl<F> PollingStream<F>
where
    F: FnMut() -> Result<Option<Bar>, AlgotraderError>,
{
    pub fn new(interval: Duration, poll: F) -> Self {
        PollingStream {
            poll,
            interval,
            started: false,
            done: false,
        }
    }
}

impl<F> Iterator for PollingStream<F>
where
    F: FnMut() -> Result<Option<Bar>, AlgotraderError>,
{
    type Item = Result<Bar, AlgotraderError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            if self.started && !self.interval.is_zero() {
                thread::sleep(self.interval);
            }
            self.started = true;

            match (self.poll)() {
                Ok(Some(bar)) => {
                    debug!(timestamp = %bar.timestamp, close = bar.close, "polled bar");
                    return Some(Ok(bar));
                }
                Ok(None) => warn!("poll returned no quote"),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}
