/// Convenience result type used across cinescroll.
pub type CineResult<T> = Result<T, CineError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Nothing here is ever shown to a visitor: environmental failures (missing
/// regions, zero-sized containers, early input) degrade to static presentation
/// and never surface as errors. These variants cover programming mistakes made
/// by the surrounding page code.
#[derive(thiserror::Error, Debug)]
pub enum CineError {
    /// Invalid caller-provided data (ranges, descriptors, geometry).
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while building or sampling timelines.
    #[error("animation error: {0}")]
    Animation(String),

    /// A binding key was registered twice.
    #[error("duplicate binding '{0}'")]
    DuplicateBinding(String),

    /// Two writers tried to own the same visual channel.
    #[error("ownership conflict: {0}")]
    Conflict(String),

    /// Invalid engine configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CineError {
    /// Build a [`CineError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CineError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`CineError::DuplicateBinding`] value.
    pub fn duplicate_binding(key: impl Into<String>) -> Self {
        Self::DuplicateBinding(key.into())
    }

    /// Build a [`CineError::Conflict`] value.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Build a [`CineError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`CineError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for CineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
