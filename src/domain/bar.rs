//! Price bar representation.

use serde::Deserialize;

/// One time step of market data. Ordering is the order of arrival from the
/// source; bars are never re-sorted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Bar {
    pub timestamp: String,
    pub close: f64,
}

impl Bar {
    pub fn new(timestamp: impl Into<String>, close: f64) -> Self {
        Bar {
            timestamp: timestamp.into(),
            close,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_str_and_string() {
        let a = Bar::new("2024-01-15", 105.0);
        let b = Bar::new(String::from("2024-01-15"), 105.0);
        assert_eq!(a, b);
        assert_eq!(a.timestamp, "2024-01-15");
        assert!((a.close - 105.0).abs() < f64::EPSILON);
    }
}
