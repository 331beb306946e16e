/// Convenience result type used across Tessera.
pub type TesseraResult<T> = Result<T, TesseraError>;

/// Top-level error taxonomy used by compositing APIs.
///
/// Allocation exhaustion and unsupported blend modes are deliberately absent: the former is an
/// `Option`, the latter degrades to `Normal` with a diagnostic.
#[derive(thiserror::Error, Debug)]
pub enum TesseraError {
    /// Invalid caller-provided data (buffer shapes, filter parameters, config values).
    #[error("validation error: {0}")]
    Validation(String),

    /// A host capability required for the operation is missing.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Errors while evaluating a draw or a filter graph.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or host bindings.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TesseraError {
    /// Build a [`TesseraError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TesseraError::Unsupported`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Build a [`TesseraError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`TesseraError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
