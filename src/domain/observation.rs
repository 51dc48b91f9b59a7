//! Price observation (tick) representation.

use chrono::NaiveDateTime;

/// One timestamped price reading for one instrument.
///
/// Produced by ingestion adapters; strategies only read it.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceObservation {
    pub timestamp: NaiveDateTime,
    pub symbol: String,
    pub price: f64,
}

impl PriceObservation {
    pub fn new(timestamp: NaiveDateTime, symbol: impl Into<String>, price: f64) -> Self {
        PriceObservation {
            timestamp,
            symbol: symbol.into(),
            price,
        }
    }
}
