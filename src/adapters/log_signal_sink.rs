//! Signal sink that reports every signal through `tracing`.

use tracing::{info, warn};

use crate::domain::error::SignalbookError;
use crate::domain::signal::SignalEvent;
use crate::ports::signal_port::SignalSink;

/// Logs each signal at info level and raises a warning for orders whose
/// notional (quantity × price) reaches `min_notional`. A zero threshold
/// disables the alerts.
#[derive(Debug, Clone, Default)]
pub struct LogSignalSink {
    min_notional: f64,
}

impl LogSignalSink {
    pub fn new(min_notional: f64) -> Self {
        Self { min_notional }
    }

    pub fn min_notional(&self) -> f64 {
        self.min_notional
    }

    pub fn is_large(&self, signal: &SignalEvent, quantity: f64) -> bool {
        self.min_notional > 0.0 && quantity * signal.price >= self.min_notional
    }
}

impl SignalSink for LogSignalSink {
    fn notify(&self, signal: &SignalEvent, quantity: f64) -> Result<(), SignalbookError> {
        info!(
            timestamp = %signal.timestamp,
            symbol = %signal.symbol,
            action = %signal.action,
            price = signal.price,
            "signal"
        );
        if self.is_large(signal, quantity) {
            warn!(
                symbol = %signal.symbol,
                action = %signal.action,
                quantity,
                notional = quantity * signal.price,
                "large trade"
            );
        }
        Ok(())
    }
}
