// file: src/utils/mod.rs
// version: 2.0.0
// guid: 14e83fa0-270b-43f3-948d-8122654dae61

//! Utility modules

pub mod system;
pub mod validation;

pub use system::SystemUtils;
