//! # tandem-observability
//!
//! Structured tracing for the Tandem engine: subscriber setup, span
//! definitions per operation, and named lifecycle events emitted by the
//! detection and collaboration crates.

pub mod tracing_setup;

pub use tracing_setup::{events, init_from_config, init_tracing, init_tracing_with_filter};
