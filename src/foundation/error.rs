/// Convenience result type used across wishreel.
pub type WishreelResult<T> = Result<T, WishreelError>;

/// Top-level error taxonomy used by engine boundary APIs.
///
/// In-memory mutation operations never produce these; rejected operations
/// degrade to no-ops so an authoring surface stays responsive. Hard errors
/// only appear at the serialization/validation boundary.
#[derive(thiserror::Error, Debug)]
pub enum WishreelError {
    /// Invalid user-provided or composition data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid template data at the template boundary.
    #[error("template error: {0}")]
    Template(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WishreelError {
    /// Build a [`WishreelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`WishreelError::Template`] value.
    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template(msg.into())
    }

    /// Build a [`WishreelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
