//! Fluent request builder
//!
//! `core` holds the builder and its envelope states, `methods` the terminal
//! calls that turn a configured builder into a request handle.

pub mod core;
pub mod methods;

pub use core::*;
