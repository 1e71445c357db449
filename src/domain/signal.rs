//! Strategy output and executable order sides.

use std::fmt;

/// What a strategy wants to do on the current bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    /// The executable side of this signal; `Hold` has none.
    pub fn action(self) -> Option<Action> {
        match self {
            Signal::Buy => Some(Action::Buy),
            Signal::Sell => Some(Action::Sell),
            Signal::Hold => None,
        }
    }
}

/// The side of an order or fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Buy,
    Sell,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Buy => "buy",
            Action::Sell => "sell",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Action> for Signal {
    fn from(action: Action) -> Self {
        match action {
            Action::Buy => Signal::Buy,
            Action::Sell => Signal::Sell,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_has_no_action() {
        assert_eq!(Signal::Hold.action(), None);
        assert_eq!(Signal::Buy.action(), Some(Action::Buy));
        assert_eq!(Signal::Sell.action(), Some(Action::Sell));
    }

    #[test]
    fn action_display() {
        assert_eq!(Action::Buy.to_string(), "buy");
        assert_eq!(Action::Sell.to_string(), "sell");
    }

    #[test]
    fn action_into_signal() {
        assert_eq!(Signal::from(Action::Buy), Signal::Buy);
        assert_eq!(Signal::from(Action::Sell), Signal::Sell);
    }
}
