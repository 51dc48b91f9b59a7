//! Cash and position ledger.
//!
//! The ledger never rejects a trade: cash may go negative and sells may open
//! short positions. Every applied trade, including compensating trades from
//! undo, is appended to the trade log.

use std::collections::HashMap;

use tracing::debug;

use super::position::Position;
use super::signal::Side;

/// One trade as applied to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub symbol: String,
    pub side: Side,
    pub quantity: f64,
    pub price: f64,
}

impl TradeRecord {
    /// Cash effect of the trade: negative for buys, positive for sells.
    pub fn cash_delta(&self) -> f64 {
        match self.side {
            Side::Buy => -(self.price * self.quantity),
            Side::Sell => self.price * self.quantity,
        }
    }
}

/// Read-only snapshot for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSummary {
    pub initial_cash: f64,
    pub cash: f64,
    pub equity: f64,
    /// Sum over open positions of quantity × (mark - last fill).
    pub unrealized_pnl: f64,
    /// Sorted by symbol.
    pub positions: Vec<Position>,
    pub trade_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    initial_cash: f64,
    cash: f64,
    positions: HashMap<String, Position>,
    trade_log: Vec<TradeRecord>,
    marks: HashMap<String, f64>,
}

impl Ledger {
    pub fn new(initial_cash: f64) -> Self {
        Ledger {
            initial_cash,
            cash: initial_cash,
            positions: HashMap::new(),
            trade_log: Vec::new(),
            marks: HashMap::new(),
        }
    }

    /// Apply a fill: adjust cash, adjust the position, drop it if flat.
    pub fn execute_trade(&mut self, symbol: &str, side: Side, quantity: f64, price: f64) {
        let record = TradeRecord {
            symbol: symbol.to_string(),
            side,
            quantity,
            price,
        };
        self.cash += record.cash_delta();

        let position = self
            .positions
            .entry(record.symbol.clone())
            .or_insert_with(|| Position {
                symbol: record.symbol.clone(),
                quantity: 0.0,
                price,
            });
        position.quantity += side.sign() * quantity;
        position.price = price;
        if position.is_flat() {
            self.positions.remove(symbol);
        }

        debug!(
            %symbol,
            %side,
            quantity,
            price,
            cash = self.cash,
            "trade executed"
        );
        self.trade_log.push(record);
    }

    /// Record the latest market price for valuation only.
    pub fn update_price(&mut self, symbol: &str, price: f64) {
        self.marks.insert(symbol.to_string(), price);
    }

    /// Latest market price, falling back to the position's last fill.
    pub fn mark_price(&self, symbol: &str) -> Option<f64> {
        self.marks
            .get(symbol)
            .copied()
            .or_else(|| self.positions.get(symbol).map(|p| p.price))
    }

    pub fn equity(&self) -> f64 {
        let position_value: f64 = self
            .positions
            .values()
            .map(|pos| pos.market_value(self.mark_or_fill(pos)))
            .sum();
        self.cash + position_value
    }

    pub fn summary(&self) -> LedgerSummary {
        let mut positions: Vec<Position> = self.positions.values().cloned().collect();
        positions.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        let unrealized_pnl: f64 = positions
            .iter()
            .map(|pos| pos.unrealized_pnl(self.mark_or_fill(pos)))
            .sum();
        LedgerSummary {
            initial_cash: self.initial_cash,
            cash: self.cash,
            equity: self.equity(),
            unrealized_pnl,
            positions,
            trade_count: self.trade_log.len(),
        }
    }

    fn mark_or_fill(&self, pos: &Position) -> f64 {
        self.marks.get(&pos.symbol).copied().unwrap_or(pos.price)
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn has_position(&self, symbol: &str) -> bool {
        self.positions.contains_key(symbol)
    }

    pub fn positions(&self) -> &HashMap<String, Position> {
        &self.positions
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    pub fn trade_log(&self) -> &[TradeRecord] {
        &self.trade_log
    }

    pub fn trade_count(&self) -> usize {
        self.trade_log.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ledger() {
        let ledger = Ledger::new(10_000.0);
        assert!((ledger.cash() - 10_000.0).abs() < f64::EPSILON);
        assert!((ledger.summary().initial_cash - 10_000.0).abs() < f64::EPSILON);
        assert_eq!(ledger.position_count(), 0);
        assert_eq!(ledger.trade_count(), 0);
    }

    #[test]
    fn buy_debits_cash_and_opens_position() {
        let mut ledger = Ledger::new(10_000.0);
        ledger.execute_trade("AAPL", Side::Buy, 10.0, 100.0);

        assert_eq!(ledger.cash(), 9_000.0);
        let pos = ledger.position("AAPL").unwrap();
        assert_eq!(pos.quantity, 10.0);
        assert_eq!(pos.price, 100.0);
        assert_eq!(ledger.trade_count(), 1);
    }

    #[test]
    fn sell_credits_cash() {
        let mut ledger = Ledger::new(0.0);
        ledger.execute_trade("AAPL", Side::Buy, 2.0, 50.0);
        ledger.execute_trade("AAPL", Side::Sell, 1.0, 60.0);

        assert_eq!(ledger.cash(), -100.0 + 60.0);
        assert_eq!(ledger.position("AAPL").unwrap().quantity, 1.0);
    }

    #[test]
    fn flat_position_removed() {
        let mut ledger = Ledger::new(1_000.0);
        ledger.execute_trade("XYZ", Side::Buy, 5.0, 10.0);
        ledger.execute_trade("XYZ", Side::Sell, 5.0, 12.0);

        assert_eq!(ledger.cash(), 1_010.0);
        assert!(!ledger.has_position("XYZ"));
        assert_eq!(ledger.trade_count(), 2);
    }

    #[test]
    fn near_zero_residual_removed() {
        let mut ledger = Ledger::new(1_000.0);
        ledger.execute_trade("XYZ", Side::Buy, 0.3, 10.0);
        ledger.execute_trade("XYZ", Side::Sell, 0.1, 10.0);
        ledger.execute_trade("XYZ", Side::Sell, 0.2, 10.0);
        assert!(!ledger.has_position("XYZ"));
    }

    #[test]
    fn sell_without_position_goes_short() {
        let mut ledger = Ledger::new(1_000.0);
        ledger.execute_trade("TSLA", Side::Sell, 3.0, 200.0);

        assert_eq!(ledger.cash(), 1_600.0);
        let pos = ledger.position("TSLA").unwrap();
        assert_eq!(pos.quantity, -3.0);
        assert!(pos.is_short());
    }

    #[test]
    fn insufficient_cash_is_permitted() {
        let mut ledger = Ledger::new(100.0);
        ledger.execute_trade("AAPL", Side::Buy, 10.0, 100.0);
        assert_eq!(ledger.cash(), -900.0);
        assert!(ledger.has_position("AAPL"));
    }

    #[test]
    fn last_fill_price_overwrites() {
        let mut ledger = Ledger::new(10_000.0);
        ledger.execute_trade("AAPL", Side::Buy, 10.0, 100.0);
        ledger.execute_trade("AAPL", Side::Buy, 10.0, 120.0);
        let pos = ledger.position("AAPL").unwrap();
        assert_eq!(pos.quantity, 20.0);
        assert_eq!(pos.price, 120.0);
    }

    #[test]
    fn equity_falls_back_to_fill_price() {
        let mut ledger = Ledger::new(10_000.0);
        ledger.execute_trade("AAPL", Side::Buy, 10.0, 100.0);
        assert_eq!(ledger.equity(), 10_000.0);
        assert_eq!(ledger.mark_price("AAPL"), Some(100.0));
    }

    #[test]
    fn equity_uses_market_updates() {
        let mut ledger = Ledger::new(10_000.0);
        ledger.execute_trade("AAPL", Side::Buy, 10.0, 100.0);
        ledger.update_price("AAPL", 150.0);

        assert_eq!(ledger.cash(), 9_000.0);
        assert_eq!(ledger.equity(), 10_500.0);
        assert_eq!(ledger.mark_price("AAPL"), Some(150.0));
    }

    #[test]
    fn update_price_does_not_touch_positions() {
        let mut ledger = Ledger::new(10_000.0);
        ledger.update_price("MSFT", 300.0);
        assert_eq!(ledger.cash(), 10_000.0);
        assert_eq!(ledger.position_count(), 0);
        assert_eq!(ledger.trade_count(), 0);
        assert_eq!(ledger.equity(), 10_000.0);
    }

    #[test]
    fn short_position_reduces_equity_when_price_rises() {
        let mut ledger = Ledger::new(0.0);
        ledger.execute_trade("TSLA", Side::Sell, 2.0, 100.0);
        ledger.update_price("TSLA", 110.0);
        assert_eq!(ledger.equity(), 200.0 - 220.0);
    }

    #[test]
    fn summary_sorted_and_counted() {
        let mut ledger = Ledger::new(10_000.0);
        ledger.execute_trade("MSFT", Side::Buy, 1.0, 300.0);
        ledger.execute_trade("AAPL", Side::Buy, 2.0, 100.0);

        let summary = ledger.summary();
        assert_eq!(summary.cash, 9_500.0);
        assert_eq!(summary.equity, 10_000.0);
        assert_eq!(summary.trade_count, 2);
        let symbols: Vec<&str> = summary.positions.iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn summary_unrealized_pnl_uses_marks() {
        let mut ledger = Ledger::new(10_000.0);
        ledger.execute_trade("AAPL", Side::Buy, 10.0, 100.0);
        ledger.execute_trade("MSFT", Side::Sell, 2.0, 300.0);
        ledger.update_price("AAPL", 105.0);

        let summary = ledger.summary();
        assert_eq!(summary.initial_cash, 10_000.0);
        // AAPL +50 at the mark, MSFT unmarked so valued at its fill.
        assert_eq!(summary.unrealized_pnl, 50.0);
        assert_eq!(summary.equity - summary.initial_cash, 50.0);
    }

    #[test]
    fn trade_log_records_cash_delta() {
        let mut ledger = Ledger::new(0.0);
        ledger.execute_trade("A", Side::Buy, 4.0, 25.0);
        ledger.execute_trade("A", Side::Sell, 4.0, 30.0);
        let deltas: Vec<f64> = ledger.trade_log().iter().map(TradeRecord::cash_delta).collect();
        assert_eq!(deltas, vec![-100.0, 120.0]);
        assert_eq!(ledger.cash(), deltas.iter().sum::<f64>());
    }

    #[test]
    fn trade_record_cash_delta() {
        let buy = TradeRecord {
            symbol: "A".into(),
            side: Side::Buy,
            quantity: 4.0,
            price: 25.0,
        };
        let sell = TradeRecord {
            side: Side::Sell,
            ..buy.clone()
        };
        assert_eq!(buy.cash_delta(), -100.0);
        assert_eq!(sell.cash_delta(), 100.0);
    }
}
