/// Convenience result type used across puzzlereel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Inputs that are merely not ready yet (zero-sized images, a grid without nine chapters) are not
/// errors; they surface as visible inline states instead.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid user-provided configuration or chapter data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while rasterizing pieces or frames.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
