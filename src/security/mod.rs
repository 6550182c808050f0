// file: src/security/mod.rs
// version: 2.0.0
// guid: 52b1a39c-5231-4a26-b0c4-80ec9741f318

//! Safety controls around mutating host state

pub mod guard;

pub use guard::{is_destructive, Confirm, Guarded};
