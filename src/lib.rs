//! Library entry point for the logidash crate.
//! Re-exports the shared string and path types used across actors.

pub mod api;
pub mod app;
pub mod config;
pub mod log;
pub mod net;
pub mod sync;
pub mod terminal;
pub mod utils;

#[macro_use]
pub mod macros;

pub use utils::*;

/// Capacity of the bounded channels in front of every actor.
pub const BUFFER_SIZE: usize = 128;
