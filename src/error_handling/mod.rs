// src/error_handling/mod.rs
//! Error handling for the desert exit subsystem
//!
//! Every rejected call surfaces one of the error classes defined here. All of
//! them are fail-closed: the call that produced the error left no state behind.

pub mod error_types;

// Re-export common types
pub use error_types::{DesertError, DesertResult};
