//! Port traits at the edges of the domain.

pub mod config_port;
pub mod price_port;
pub mod signal_port;
