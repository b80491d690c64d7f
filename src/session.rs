//! Session-oriented engine API.

pub mod composer;
