//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::log_signal_sink::LogSignalSink;
use crate::domain::analytics::{
    beta_stage, compute_metrics, drawdown_stage, volatility_stage, Instrument, InstrumentMetrics,
    MarketData, MetricStage,
};
use crate::domain::config_validation::{strategy_name, validate_engine_config, STRATEGY_BREAKOUT};
use crate::domain::engine::{Engine, EngineConfig, DEFAULT_INITIAL_CASH, DEFAULT_ORDER_QUANTITY};
use crate::domain::error::SignalbookError;
use crate::domain::ledger::LedgerSummary;
use crate::domain::strategy::{
    StrategyConfig, DEFAULT_BREAKOUT_LOOKBACK, DEFAULT_BREAKOUT_THRESHOLD,
    DEFAULT_MEAN_REVERSION_BAND, DEFAULT_MEAN_REVERSION_LOOKBACK,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;

#[derive(Parser, Debug)]
#[command(name = "signalbook", about = "Tick-driven signal engine and paper trading ledger")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a price file through the configured strategy
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Price CSV; defaults to `[data] path` from the config
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Number of trades to undo after the replay
        #[arg(long, default_value_t = 0)]
        undo: usize,
        /// Number of undone trades to redo afterwards
        #[arg(long, default_value_t = 0)]
        redo: usize,
    },
    /// Validate an engine configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Compute volatility, beta and drawdown for one symbol
    Analyze {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(long)]
        symbol: String,
        /// Benchmark symbol for beta
        #[arg(long)]
        market: Option<String>,
        #[arg(long, default_value = "")]
        issuer: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Run {
            config,
            data,
            undo,
            redo,
        } => run_engine(&config, data.as_deref(), undo, redo).map(|summary| {
            print!("{}", format_summary(&summary));
        }),
        Command::Validate { config } => run_validate(&config),
        Command::Analyze {
            data,
            symbol,
            market,
            issuer,
        } => run_analyze(&data, &symbol, market.as_deref(), issuer).map(|metrics| {
            print!("{}", format_metrics(&metrics));
        }),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SignalbookError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

/// Validate the port and turn it into an [`EngineConfig`], filling defaults
/// for anything left unset.
pub fn build_engine_config(adapter: &dyn ConfigPort) -> Result<EngineConfig, SignalbookError> {
    validate_engine_config(adapter)?;

    let strategy = if strategy_name(adapter)? == STRATEGY_BREAKOUT {
        StrategyConfig::Breakout {
            lookback_window: lookback(adapter, "breakout", DEFAULT_BREAKOUT_LOOKBACK)?,
            threshold: adapter.get_double("breakout", "threshold", DEFAULT_BREAKOUT_THRESHOLD),
        }
    } else {
        StrategyConfig::MeanReversion {
            lookback_window: lookback(adapter, "mean_reversion", DEFAULT_MEAN_REVERSION_LOOKBACK)?,
            band: adapter.get_double("mean_reversion", "band", DEFAULT_MEAN_REVERSION_BAND),
        }
    };

    Ok(EngineConfig {
        initial_cash: adapter.get_double("engine", "initial_cash", DEFAULT_INITIAL_CASH),
        order_quantity: adapter.get_double("engine", "order_quantity", DEFAULT_ORDER_QUANTITY),
        strategy,
    })
}

fn lookback(
    adapter: &dyn ConfigPort,
    section: &str,
    default: usize,
) -> Result<usize, SignalbookError> {
    let raw = adapter.get_int(section, "lookback_window", default as i64);
    usize::try_from(raw).map_err(|_| SignalbookError::ConfigInvalid {
        section: section.to_string(),
        key: "lookback_window".to_string(),
        reason: format!("lookback_window out of range (got {raw})"),
    })
}

/// Resolve the price file from the command line or the `[data] path` key.
pub fn resolve_data_path(
    data_override: Option<&Path>,
    config: &dyn ConfigPort,
) -> Result<PathBuf, SignalbookError> {
    if let Some(path) = data_override {
        return Ok(path.to_path_buf());
    }
    config
        .get_string("data", "path")
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| SignalbookError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })
}

/// Load config and data, replay every tick, then undo `undo` trades and redo
/// `redo` of them.
pub fn run_engine(
    config_path: &Path,
    data_override: Option<&Path>,
    undo: usize,
    redo: usize,
) -> Result<LedgerSummary, SignalbookError> {
    let adapter = load_config(config_path)?;
    let engine_config = build_engine_config(&adapter)?;
    let data_path = resolve_data_path(data_override, &adapter)?;

    info!(path = %data_path.display(), "loading observations");
    let observations = CsvAdapter::new(data_path).fetch_observations()?;

    let mut engine = Engine::new(engine_config)?;
    engine.add_sink(Box::new(LogSignalSink::new(adapter.get_double(
        "alerts",
        "min_notional",
        0.0,
    ))));
    engine.run(&observations);

    let undone = (0..undo).take_while(|_| engine.undo_last()).count();
    let redone = (0..redo).take_while(|_| engine.redo_last()).count();
    if undo > 0 || redo > 0 {
        info!(undone, redone, "history replayed");
    }

    Ok(engine.summary())
}

fn run_validate(config_path: &Path) -> Result<(), SignalbookError> {
    let adapter = load_config(config_path)?;
    let config = build_engine_config(&adapter)?;
    Engine::new(config)?;
    println!("OK");
    Ok(())
}

/// Run every metric stage over one symbol's prices, with an optional
/// benchmark symbol from the same file for beta.
pub fn run_analyze(
    data_path: &Path,
    symbol: &str,
    market: Option<&str>,
    issuer: String,
) -> Result<InstrumentMetrics, SignalbookError> {
    let adapter = CsvAdapter::new(data_path.to_path_buf());
    let prices_of = |wanted: &str| -> Result<Vec<f64>, SignalbookError> {
        Ok(adapter
            .fetch_symbol(wanted)?
            .into_iter()
            .map(|o| o.price)
            .collect())
    };

    let asset_prices = prices_of(symbol)?;
    let Some(&last) = asset_prices.last() else {
        return Err(SignalbookError::NoData {
            source_name: format!("{} ({symbol})", data_path.display()),
        });
    };
    let market_prices = match market {
        Some(m) => prices_of(m)?,
        None => Vec::new(),
    };

    let instrument = Instrument {
        symbol: symbol.to_string(),
        price: last,
        issuer,
    };
    let stages: [MetricStage; 3] = [volatility_stage, beta_stage, drawdown_stage];
    Ok(compute_metrics(
        instrument,
        &MarketData::new(&asset_prices, &market_prices),
        &stages,
    ))
}

pub fn format_summary(summary: &LedgerSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Ledger Summary ===");
    let _ = writeln!(out, "Cash:         {:.2}", summary.cash);
    let _ = writeln!(out, "Equity:       {:.2}", summary.equity);
    let _ = writeln!(out, "Unrealized:   {:+.2}", summary.unrealized_pnl);
    let _ = writeln!(out, "Net P&L:      {:+.2}", summary.equity - summary.initial_cash);
    let _ = writeln!(out, "Trades:       {}", summary.trade_count);
    if summary.positions.is_empty() {
        let _ = writeln!(out, "Positions:    none");
    } else {
        let _ = writeln!(out, "Positions:");
        for p in &summary.positions {
            let side = if p.is_long() {
                "long"
            } else if p.is_short() {
                "short"
            } else {
                "flat"
            };
            let _ = writeln!(
                out,
                "  {:<8} {:<5} {:>12.4} @ {:.2}",
                p.symbol,
                side,
                p.quantity.abs(),
                p.price
            );
        }
    }
    out
}

pub fn format_metrics(metrics: &InstrumentMetrics) -> String {
    let fmt = |v: Option<f64>, scale: f64, suffix: &str| match v {
        Some(v) => format!("{:.2}{suffix}", v * scale),
        None => "n/a".to_string(),
    };
    let mut out = String::new();
    let _ = writeln!(
        out,
        "=== {} ({}) ===",
        metrics.instrument.symbol,
        if metrics.instrument.issuer.is_empty() {
            "-"
        } else {
            metrics.instrument.issuer.as_str()
        }
    );
    let _ = writeln!(out, "Last Price:   {:.2}", metrics.instrument.price);
    let _ = writeln!(out, "Volatility:   {}", fmt(metrics.volatility_ann, 100.0, "%"));
    let _ = writeln!(out, "Beta:         {}", fmt(metrics.beta, 1.0, ""));
    let _ = writeln!(out, "Max Drawdown: {}", fmt(metrics.max_drawdown, 100.0, "%"));
    out
}
