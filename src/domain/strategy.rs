//! Signal strategies and their configuration.
//!
//! A [`Strategy`] consumes one observation at a time and keeps its rolling
//! state keyed by symbol, so a single instance serves many instruments
//! without any cross-symbol interaction.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::domain::accumulator::StatAccumulator;
use crate::domain::error::SignalbookError;
use crate::domain::observation::PriceObservation;
use crate::domain::signal::{SignalEvent, Side};

pub const DEFAULT_BREAKOUT_LOOKBACK: usize = 15;
pub const DEFAULT_BREAKOUT_THRESHOLD: f64 = 0.03;
pub const DEFAULT_MEAN_REVERSION_LOOKBACK: usize = 20;
pub const DEFAULT_MEAN_REVERSION_BAND: f64 = 0.02;

/// Parameters selecting and tuning a strategy variant.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyConfig {
    Breakout { lookback_window: usize, threshold: f64 },
    MeanReversion { lookback_window: usize, band: f64 },
}

impl StrategyConfig {
    pub fn breakout_default() -> Self {
        StrategyConfig::Breakout {
            lookback_window: DEFAULT_BREAKOUT_LOOKBACK,
            threshold: DEFAULT_BREAKOUT_THRESHOLD,
        }
    }

    pub fn mean_reversion_default() -> Self {
        StrategyConfig::MeanReversion {
            lookback_window: DEFAULT_MEAN_REVERSION_LOOKBACK,
            band: DEFAULT_MEAN_REVERSION_BAND,
        }
    }
}

/// Closed set of strategy variants, chosen at construction time.
#[derive(Debug, Clone)]
pub enum Strategy {
    Breakout(Breakout),
    MeanReversion(MeanReversion),
}

impl Strategy {
    pub fn from_config(config: &StrategyConfig) -> Result<Self, SignalbookError> {
        match *config {
            StrategyConfig::Breakout {
                lookback_window,
                threshold,
            } => Ok(Strategy::Breakout(Breakout::new(lookback_window, threshold)?)),
            StrategyConfig::MeanReversion {
                lookback_window,
                band,
            } => Ok(Strategy::MeanReversion(MeanReversion::new(
                lookback_window,
                band,
            )?)),
        }
    }

    /// Feed one observation; returns the signals it triggers (zero or one today).
    pub fn generate(&mut self, observation: &PriceObservation) -> Vec<SignalEvent> {
        let signals = match self {
            Strategy::Breakout(s) => s.generate(observation),
            Strategy::MeanReversion(s) => s.generate(observation),
        };
        for signal in &signals {
            debug!(
                strategy = %self,
                symbol = %signal.symbol,
                action = %signal.action,
                price = signal.price,
                "signal"
            );
        }
        signals
    }

    pub fn lookback_window(&self) -> usize {
        match self {
            Strategy::Breakout(s) => s.lookback_window,
            Strategy::MeanReversion(s) => s.lookback_window,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Breakout(_) => write!(f, "Breakout"),
            Strategy::MeanReversion(_) => write!(f, "MeanReversion"),
        }
    }
}

fn validate_lookback(lookback_window: usize) -> Result<(), SignalbookError> {
    if lookback_window < 2 {
        return Err(SignalbookError::invalid_parameter(
            "lookback_window",
            format!("lookback_window must be at least 2 (got {lookback_window})"),
        ));
    }
    Ok(())
}

fn validate_positive(name: &str, value: f64) -> Result<(), SignalbookError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(SignalbookError::invalid_parameter(
            name,
            format!("{name} must be a positive number (got {value})"),
        ));
    }
    Ok(())
}

fn signal(observation: &PriceObservation, action: Side) -> SignalEvent {
    SignalEvent {
        symbol: observation.symbol.clone(),
        action,
        price: observation.price,
        timestamp: observation.timestamp,
    }
}

#[derive(Debug, Clone)]
struct BreakoutState {
    prev_price: Option<f64>,
    returns: StatAccumulator,
}

/// Volatility breakout over simple returns.
///
/// BUY when the latest return exceeds `threshold` times the sample stddev of
/// the preceding `lookback_window` returns, SELL when it falls below the
/// negated band.
#[derive(Debug, Clone)]
pub struct Breakout {
    lookback_window: usize,
    threshold: f64,
    empty_window: StatAccumulator,
    symbols: HashMap<String, BreakoutState>,
}

impl Breakout {
    pub fn new(lookback_window: usize, threshold: f64) -> Result<Self, SignalbookError> {
        validate_lookback(lookback_window)?;
        validate_positive("threshold", threshold)?;
        Ok(Breakout {
            lookback_window,
            threshold,
            empty_window: StatAccumulator::new(lookback_window)?,
            symbols: HashMap::new(),
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn generate(&mut self, observation: &PriceObservation) -> Vec<SignalEvent> {
        let state = self
            .symbols
            .entry(observation.symbol.clone())
            .or_insert_with(|| BreakoutState {
                prev_price: None,
                returns: self.empty_window.clone(),
            });

        // A non-positive previous price cannot anchor a return.
        let prev = match state.prev_price {
            Some(p) if p > 0.0 => p,
            _ => {
                state.prev_price = Some(observation.price);
                return Vec::new();
            }
        };

        let ret = observation.price / prev - 1.0;
        let mut out = Vec::new();

        // Decide against the returns strictly before this tick.
        if let Some(stddev) = state.returns.stddev(true) {
            if stddev > 0.0 {
                let band = self.threshold * stddev;
                if ret > band {
                    out.push(signal(observation, Side::Buy));
                } else if ret < -band {
                    out.push(signal(observation, Side::Sell));
                }
            }
        }

        state.returns.push(ret);
        state.prev_price = Some(observation.price);
        out
    }
}

/// Mean reversion around the rolling mean of prior prices.
///
/// BUY below `mean * (1 - band)`, SELL above `mean * (1 + band)`, where the
/// mean covers the `lookback_window` observations preceding the current one.
#[derive(Debug, Clone)]
pub struct MeanReversion {
    lookback_window: usize,
    band: f64,
    empty_window: StatAccumulator,
    symbols: HashMap<String, StatAccumulator>,
}

impl MeanReversion {
    pub fn new(lookback_window: usize, band: f64) -> Result<Self, SignalbookError> {
        validate_lookback(lookback_window)?;
        validate_positive("band", band)?;
        Ok(MeanReversion {
            lookback_window,
            band,
            empty_window: StatAccumulator::new(lookback_window)?,
            symbols: HashMap::new(),
        })
    }

    pub fn band(&self) -> f64 {
        self.band
    }

    pub fn generate(&mut self, observation: &PriceObservation) -> Vec<SignalEvent> {
        let prices = self
            .symbols
            .entry(observation.symbol.clone())
            .or_insert_with(|| self.empty_window.clone());

        let mut out = Vec::new();
        if let Some(mean) = prices.mean() {
            let upper = mean * (1.0 + self.band);
            let lower = mean * (1.0 - self.band);
            if observation.price < lower {
                out.push(signal(observation, Side::Buy));
            } else if observation.price > upper {
                out.push(signal(observation, Side::Sell));
            }
        }

        prices.push(observation.price);
        out
    }
}
