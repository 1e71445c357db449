//! Simple moving average over a trailing window of closes.
//!
//! SMA(n) = (P[i-n+1] + ... + P[i]) / n
//! Warmup: fewer than n prices gives no value.

/// Arithmetic mean of the last `period` prices, or `None` while the history
/// is shorter than `period` (or `period` is zero).
pub fn sma_last(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }
    let window = &prices[prices.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn warmup_returns_none() {
        assert_eq!(sma_last(&[1.0, 2.0], 3), None);
        assert_eq!(sma_last(&[], 1), None);
    }

    #[test]
    fn zero_period_returns_none() {
        assert_eq!(sma_last(&[1.0, 2.0, 3.0], 0), None);
    }

    #[test]
    fn uses_only_trailing_window() {
        let prices = [100.0, 10.0, 11.0, 12.0];
        assert_relative_eq!(sma_last(&prices, 3).unwrap(), 11.0);
        assert_relative_eq!(sma_last(&prices, 1).unwrap(), 12.0);
        assert_relative_eq!(sma_last(&prices, 4).unwrap(), 33.25);
    }
}
