#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use signalbook::domain::error::SignalbookError;
use signalbook::domain::observation::PriceObservation;
use signalbook::domain::signal::SignalEvent;
use signalbook::ports::price_port::PricePort;
use signalbook::ports::signal_port::SignalSink;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

pub struct MockPricePort {
    pub observations: Vec<PriceObservation>,
    pub error: Option<String>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            observations: Vec::new(),
            error: None,
        }
    }

    pub fn with_prices(mut self, symbol: &str, prices: &[f64]) -> Self {
        let offset = self.observations.len();
        self.observations.extend(
            prices
                .iter()
                .enumerate()
                .map(|(i, &p)| PriceObservation::new(ts(offset + i), symbol, p)),
        );
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl PricePort for MockPricePort {
    fn fetch_observations(&self) -> Result<Vec<PriceObservation>, SignalbookError> {
        if let Some(reason) = &self.error {
            return Err(SignalbookError::DataParse {
                source_name: "mock".into(),
                line: 0,
                reason: reason.clone(),
            });
        }
        Ok(self.observations.clone())
    }
}

/// Shares every notification with the test through an `Rc`.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub seen: Rc<RefCell<Vec<(SignalEvent, f64)>>>,
}

impl SignalSink for RecordingSink {
    fn notify(&self, signal: &SignalEvent, quantity: f64) -> Result<(), SignalbookError> {
        self.seen.borrow_mut().push((signal.clone(), quantity));
        Ok(())
    }
}

/// One tick per minute from 2025-10-01 09:30.
pub fn ts(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 10, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
        + chrono::Duration::minutes(i as i64)
}

pub fn observations(symbol: &str, prices: &[f64]) -> Vec<PriceObservation> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| PriceObservation::new(ts(i), symbol, p))
        .collect()
}

pub fn to_csv(observations: &[PriceObservation]) -> String {
    let mut out = String::from("timestamp,symbol,price\n");
    for o in observations {
        out.push_str(&format!(
            "{},{},{}\n",
            o.timestamp.format("%Y-%m-%dT%H:%M:%S"),
            o.symbol,
            o.price
        ));
    }
    out
}

pub fn write_temp(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub const BREAKOUT_PRICES: [f64; 11] = [
    100.0, 100.0, 97.0, 102.0, 100.0, 101.0, 100.0, 100.0, 108.0, 109.0, 110.0,
];
