//! Price observation source port trait.

use crate::domain::error::SignalbookError;
use crate::domain::observation::PriceObservation;

pub trait PricePort {
    /// All observations from the source, in non-decreasing timestamp order.
    fn fetch_observations(&self) -> Result<Vec<PriceObservation>, SignalbookError>;

    /// Observations for a single symbol.
    fn fetch_symbol(&self, symbol: &str) -> Result<Vec<PriceObservation>, SignalbookError> {
        Ok(self
            .fetch_observations()?
            .into_iter()
            .filter(|o| o.symbol == symbol)
            .collect())
    }
}
