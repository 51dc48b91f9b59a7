//! Open position held by the ledger.

/// Quantities closer to zero than this are treated as flat.
pub const POSITION_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub quantity: f64,
    /// Price of the most recent fill, not a weighted-average cost.
    pub price: f64,
}

impl Position {
    pub fn is_long(&self) -> bool {
        self.quantity > 0.0
    }

    pub fn is_short(&self) -> bool {
        self.quantity < 0.0
    }

    pub fn is_flat(&self) -> bool {
        self.quantity.abs() < POSITION_EPSILON
    }

    /// Signed mark-to-market value at `price`.
    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.quantity * (price - self.price)
    }
}
