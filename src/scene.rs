//! Boundary scene model: the JSON-facing composition and template shapes
//! consumed and produced by the persistence adapter.

pub mod composition;
pub mod model;
