//! Core domain types and logic.

pub mod observation;
pub mod signal;
pub mod accumulator;
pub mod strategy;
pub mod position;
pub mod ledger;
pub mod command;
pub mod router;
pub mod engine;
pub mod analytics;
pub mod config_validation;
pub mod error;
