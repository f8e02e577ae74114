//! `repsense-worker` library crate.
//!
//! Re-exports the pipeline pieces for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod sink;
pub mod source;
