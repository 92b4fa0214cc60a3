use thiserror::Error;

/// Convenience result type for the fallible edges of the crate (JSON loading, validation,
/// engine construction). The pivot path itself never fails.
pub type PivotResult<T> = Result<T, PivotError>;

/// Error type returned around the pivot engine.
///
/// [`crate::pivot`] degrades gracefully on malformed input and never returns this; it is
/// produced when decoding specs/rows from JSON, when a caller asks for structural validation
/// via [`crate::spec::WidgetSpec::validate`], or when the parallel engine cannot start.
#[derive(Debug, Error)]
pub enum PivotError {
    /// Spec or row JSON could not be decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON rows were not an array of flat objects.
    #[error("invalid rows: {message}")]
    InvalidRows { message: String },

    /// The widget spec is structurally invalid (missing dimension, measure column, etc.).
    #[error("invalid widget spec: {message}")]
    InvalidSpec { message: String },

    /// The worker pool for batch pivoting could not be built.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl PivotError {
    pub(crate) fn invalid_spec(message: impl Into<String>) -> Self {
        Self::InvalidSpec {
            message: message.into(),
        }
    }
}
