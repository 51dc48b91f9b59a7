//! Reversible trade commands and linear do/undo/redo history.
//!
//! Undo and redo never restore snapshots. Both route a trade through the
//! ledger: undo applies the compensating trade (side flipped, same symbol,
//! quantity and price) and redo applies the original trade again.

use tracing::{debug, info};

use super::ledger::Ledger;
use super::signal::Side;

#[derive(Debug, Clone, PartialEq)]
pub struct TradeCommand {
    pub symbol: String,
    pub side: Side,
    pub quantity: f64,
    pub price: f64,
    applied: bool,
}

impl TradeCommand {
    pub fn new(symbol: impl Into<String>, side: Side, quantity: f64, price: f64) -> Self {
        TradeCommand {
            symbol: symbol.into(),
            side,
            quantity,
            price,
            applied: false,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.applied
    }

    /// Apply the forward trade. No-op if already applied.
    pub fn execute(&mut self, ledger: &mut Ledger) {
        if self.applied {
            return;
        }
        ledger.execute_trade(&self.symbol, self.side, self.quantity, self.price);
        self.applied = true;
    }

    /// Apply the compensating trade. No-op if not applied.
    pub fn revert(&mut self, ledger: &mut Ledger) {
        if !self.applied {
            return;
        }
        ledger.execute_trade(&self.symbol, self.side.reversed(), self.quantity, self.price);
        self.applied = false;
    }
}

#[derive(Debug, Clone, Default)]
pub struct History {
    done: Vec<TradeCommand>,
    undone: Vec<TradeCommand>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute `command`, push it onto the done stack and clear the redo stack.
    pub fn apply(&mut self, mut command: TradeCommand, ledger: &mut Ledger) {
        command.execute(ledger);
        self.done.push(command);
        self.undone.clear();
    }

    /// Reverse the most recent applied command. Returns false when there is nothing to undo.
    pub fn undo(&mut self, ledger: &mut Ledger) -> bool {
        let Some(mut command) = self.done.pop() else {
            debug!("undo: history empty");
            return false;
        };
        command.revert(ledger);
        info!(
            symbol = %command.symbol,
            side = %command.side,
            quantity = command.quantity,
            price = command.price,
            "undo"
        );
        self.undone.push(command);
        true
    }

    /// Reapply the most recently undone command. Returns false when there is nothing to redo.
    pub fn redo(&mut self, ledger: &mut Ledger) -> bool {
        let Some(mut command) = self.undone.pop() else {
            debug!("redo: nothing undone");
            return false;
        };
        command.execute(ledger);
        info!(
            symbol = %command.symbol,
            side = %command.side,
            quantity = command.quantity,
            price = command.price,
            "redo"
        );
        self.done.push(command);
        true
    }

    /// Applied commands, oldest first.
    pub fn done(&self) -> &[TradeCommand] {
        &self.done
    }

    /// Undone commands, most recently undone last.
    pub fn undone(&self) -> &[TradeCommand] {
        &self.undone
    }
}
