//! Foundation types shared across the engine.

pub mod core;
pub mod error;
