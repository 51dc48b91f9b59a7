//! Trade side and signal events.

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side of the compensating trade.
    pub fn reversed(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// +1 for buys, -1 for sells (applied to position quantity).
    pub fn sign(self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A BUY/SELL recommendation emitted by a strategy for a single tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalEvent {
    pub symbol: String,
    pub action: Side,
    pub price: f64,
    pub timestamp: NaiveDateTime,
}
