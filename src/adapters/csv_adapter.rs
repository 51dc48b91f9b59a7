//! CSV price observation adapter.
//!
//! Reads `timestamp,symbol,price` rows (header required, column order free)
//! and returns them sorted by timestamp. Ties keep file order.

use crate::domain::error::SignalbookError;
use crate::domain::observation::PriceObservation;
use crate::ports::price_port::PricePort;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fs;
use std::path::PathBuf;

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvAdapter {
    path: PathBuf,
}

struct Columns {
    timestamp: usize,
    symbol: usize,
    price: usize,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn source_name(&self) -> String {
        self.path.display().to_string()
    }

    fn data_error(&self, line: u64, reason: impl Into<String>) -> SignalbookError {
        SignalbookError::DataParse {
            source_name: self.source_name(),
            line,
            reason: reason.into(),
        }
    }

    fn columns(&self, headers: &csv::StringRecord) -> Result<Columns, SignalbookError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| self.data_error(1, format!("missing {name} column")))
        };
        Ok(Columns {
            timestamp: find("timestamp")?,
            symbol: find("symbol")?,
            price: find("price")?,
        })
    }
}

impl PricePort for CsvAdapter {
    fn fetch_observations(&self) -> Result<Vec<PriceObservation>, SignalbookError> {
        let content = fs::read_to_string(&self.path)?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| self.data_error(1, format!("CSV header error: {}", e)))?
            .clone();
        let columns = self.columns(&headers)?;

        let mut observations = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| {
                let line = e.position().map_or(0, |p| p.line());
                self.data_error(line, format!("CSV parse error: {}", e))
            })?;
            let line = record.position().map_or(0, |p| p.line());
            let field = |index: usize, name: &str| {
                record
                    .get(index)
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| self.data_error(line, format!("missing {name} value")))
            };

            let raw_timestamp = field(columns.timestamp, "timestamp")?;
            let timestamp = parse_timestamp(raw_timestamp).ok_or_else(|| {
                self.data_error(line, format!("invalid timestamp '{raw_timestamp}'"))
            })?;

            let symbol = field(columns.symbol, "symbol")?;

            let raw_price = field(columns.price, "price")?;
            let price: f64 = raw_price.parse().map_err(|e| {
                self.data_error(line, format!("invalid price '{raw_price}': {}", e))
            })?;
            if !(price.is_finite() && price > 0.0) {
                return Err(self.data_error(
                    line,
                    format!("price must be finite and positive (got {raw_price})"),
                ));
            }

            observations.push(PriceObservation::new(timestamp, symbol, price));
        }

        if observations.is_empty() {
            return Err(SignalbookError::NoData {
                source_name: self.source_name(),
            });
        }

        observations.sort_by_key(|o| o.timestamp);
        Ok(observations)
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.strip_suffix('Z').unwrap_or(raw);
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}
