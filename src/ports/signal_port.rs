//! Signal delivery port trait.

use crate::domain::error::SignalbookError;
use crate::domain::signal::SignalEvent;

/// Receives every signal the engine acts on, together with the order
/// quantity the router assigned to it.
pub trait SignalSink {
    fn notify(&self, signal: &SignalEvent, quantity: f64) -> Result<(), SignalbookError>;
}
