//! Structural validation of boundary definitions.

pub mod validate;
