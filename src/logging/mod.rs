// file: src/logging/mod.rs
// version: 2.0.0
// guid: 233ad28e-1ec7-4fd8-875e-4eb45b22005b

//! Logging system for Ubuntu System Manager

pub mod logger;

pub use logger::{init_logger, resolve_level, with_async_operation_span};
