//! Configuration validation.
//!
//! Validates all config fields before an engine is built.

use crate::domain::error::SignalbookError;
use crate::ports::config_port::ConfigPort;

pub const STRATEGY_BREAKOUT: &str = "breakout";
pub const STRATEGY_MEAN_REVERSION: &str = "mean_reversion";

pub fn validate_engine_config(config: &dyn ConfigPort) -> Result<(), SignalbookError> {
    validate_initial_cash(config)?;
    validate_order_quantity(config)?;
    validate_min_notional(config)?;
    match strategy_name(config)?.as_str() {
        STRATEGY_BREAKOUT => {
            validate_lookback(config, STRATEGY_BREAKOUT)?;
            validate_positive(config, STRATEGY_BREAKOUT, "threshold")?;
        }
        _ => {
            validate_lookback(config, STRATEGY_MEAN_REVERSION)?;
            validate_positive(config, STRATEGY_MEAN_REVERSION, "band")?;
        }
    }
    Ok(())
}

/// Normalized strategy name from `[engine] strategy`, defaulting to breakout.
pub fn strategy_name(config: &dyn ConfigPort) -> Result<String, SignalbookError> {
    let name = config
        .get_string("engine", "strategy")
        .map(|s| s.trim().to_lowercase().replace('-', "_"))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| STRATEGY_BREAKOUT.to_string());
    match name.as_str() {
        STRATEGY_BREAKOUT | STRATEGY_MEAN_REVERSION => Ok(name),
        _ => Err(SignalbookError::ConfigInvalid {
            section: "engine".to_string(),
            key: "strategy".to_string(),
            reason: format!("unknown strategy '{name}', expected breakout or mean_reversion"),
        }),
    }
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), SignalbookError> {
    if config.get_string("engine", "initial_cash").is_none() {
        return Ok(());
    }
    let value = config.get_double("engine", "initial_cash", f64::NAN);
    if !value.is_finite() {
        return Err(SignalbookError::ConfigInvalid {
            section: "engine".to_string(),
            key: "initial_cash".to_string(),
            reason: "initial_cash must be a finite number".to_string(),
        });
    }
    Ok(())
}

fn validate_order_quantity(config: &dyn ConfigPort) -> Result<(), SignalbookError> {
    if config.get_string("engine", "order_quantity").is_none() {
        return Ok(());
    }
    let value = config.get_double("engine", "order_quantity", f64::NAN);
    if !(value.is_finite() && value > 0.0) {
        return Err(SignalbookError::ConfigInvalid {
            section: "engine".to_string(),
            key: "order_quantity".to_string(),
            reason: "order_quantity must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_min_notional(config: &dyn ConfigPort) -> Result<(), SignalbookError> {
    if config.get_string("alerts", "min_notional").is_none() {
        return Ok(());
    }
    let value = config.get_double("alerts", "min_notional", f64::NAN);
    if !(value.is_finite() && value >= 0.0) {
        return Err(SignalbookError::ConfigInvalid {
            section: "alerts".to_string(),
            key: "min_notional".to_string(),
            reason: "min_notional must be non-negative".to_string(),
        });
    }
    Ok(())
}

fn validate_lookback(config: &dyn ConfigPort, section: &str) -> Result<(), SignalbookError> {
    if config.get_string(section, "lookback_window").is_none() {
        return Ok(());
    }
    let value = config.get_int(section, "lookback_window", 0);
    if value < 2 {
        return Err(SignalbookError::ConfigInvalid {
            section: section.to_string(),
            key: "lookback_window".to_string(),
            reason: "lookback_window must be an integer of at least 2".to_string(),
        });
    }
    Ok(())
}

fn validate_positive(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), SignalbookError> {
    if config.get_string(section, key).is_none() {
        return Ok(());
    }
    let value = config.get_double(section, key, f64::NAN);
    if !(value.is_finite() && value > 0.0) {
        return Err(SignalbookError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{key} must be positive"),
        });
    }
    Ok(())
}
