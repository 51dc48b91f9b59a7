//! Tick-driven trading engine.
//!
//! EngineConfig is built once at startup and handed to [`Engine::new`]; the
//! engine owns the strategy, ledger, history and router for one session.

use tracing::{info, warn};

use super::command::History;
use super::error::SignalbookError;
use super::ledger::{Ledger, LedgerSummary};
use super::observation::PriceObservation;
use super::router::SignalRouter;
use super::strategy::{Strategy, StrategyConfig};
use crate::ports::signal_port::SignalSink;

pub const DEFAULT_INITIAL_CASH: f64 = 100_000.0;
pub const DEFAULT_ORDER_QUANTITY: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub initial_cash: f64,
    pub order_quantity: f64,
    pub strategy: StrategyConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            initial_cash: DEFAULT_INITIAL_CASH,
            order_quantity: DEFAULT_ORDER_QUANTITY,
            strategy: StrategyConfig::breakout_default(),
        }
    }
}

pub struct Engine {
    strategy: Strategy,
    ledger: Ledger,
    history: History,
    router: SignalRouter,
    sinks: Vec<Box<dyn SignalSink>>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, SignalbookError> {
        if !(config.order_quantity.is_finite() && config.order_quantity > 0.0) {
            return Err(SignalbookError::invalid_parameter(
                "order_quantity",
                format!("order_quantity must be positive (got {})", config.order_quantity),
            ));
        }
        let strategy = Strategy::from_config(&config.strategy)?;
        info!(
            %strategy,
            initial_cash = config.initial_cash,
            order_quantity = config.order_quantity,
            "engine initialized"
        );
        Ok(Engine {
            strategy,
            ledger: Ledger::new(config.initial_cash),
            history: History::new(),
            router: SignalRouter::new(config.order_quantity),
            sinks: Vec::new(),
        })
    }

    pub fn add_sink(&mut self, sink: Box<dyn SignalSink>) {
        self.sinks.push(sink);
    }

    /// Mark the price, run the strategy and execute whatever it signals.
    /// Returns the number of signals acted on.
    pub fn on_tick(&mut self, observation: &PriceObservation) -> usize {
        self.ledger.update_price(&observation.symbol, observation.price);

        let signals = self.strategy.generate(observation);
        for signal in &signals {
            for sink in &self.sinks {
                if let Err(e) = sink.notify(signal, self.router.order_quantity()) {
                    warn!(error = %e, symbol = %signal.symbol, "signal sink failed");
                }
            }
            let command = self.router.route(signal);
            self.history.apply(command, &mut self.ledger);
        }
        signals.len()
    }

    pub fn run<'a, I>(&mut self, observations: I) -> usize
    where
        I: IntoIterator<Item = &'a PriceObservation>,
    {
        let mut ticks = 0usize;
        let mut signals = 0usize;
        for observation in observations {
            signals += self.on_tick(observation);
            ticks += 1;
        }
        info!(ticks, signals, "run complete");
        signals
    }

    pub fn undo_last(&mut self) -> bool {
        self.history.undo(&mut self.ledger)
    }

    pub fn redo_last(&mut self) -> bool {
        self.history.redo(&mut self.ledger)
    }

    pub fn summary(&self) -> LedgerSummary {
        self.ledger.summary()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }
}
