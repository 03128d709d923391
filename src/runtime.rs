//! Runtime glue: client configuration and telemetry.

pub mod config;
pub mod telemetry;
