//! Converts accepted signals into trade commands.

use super::command::TradeCommand;
use super::signal::SignalEvent;

/// Fixed-size sizing: every signal becomes an order for `order_quantity` units
/// at the signal's price.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRouter {
    order_quantity: f64,
}

impl SignalRouter {
    pub fn new(order_quantity: f64) -> Self {
        SignalRouter { order_quantity }
    }

    pub fn order_quantity(&self) -> f64 {
        self.order_quantity
    }

    pub fn route(&self, signal: &SignalEvent) -> TradeCommand {
        TradeCommand::new(
            signal.symbol.clone(),
            signal.action,
            self.order_quantity,
            signal.price,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::Side;
    use chrono::NaiveDate;

    #[test]
    fn route_copies_signal_fields() {
        let signal = SignalEvent {
            symbol: "AAPL".into(),
            action: Side::Sell,
            price: 187.25,
            timestamp: NaiveDate::from_ymd_opt(2025, 10, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        };
        let cmd = SignalRouter::new(25.0).route(&signal);
        assert_eq!(cmd.symbol, "AAPL");
        assert_eq!(cmd.side, Side::Sell);
        assert_eq!(cmd.quantity, 25.0);
        assert_eq!(cmd.price, 187.25);
        assert!(!cmd.is_applied());
    }
}
