//! Client and parser registry

pub mod core;
pub mod stats;

pub use core::SoapClient;
pub use stats::{ClientStats, ClientStatsSnapshot};
