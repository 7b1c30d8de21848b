//! Error types for IntentScope

/// Result type alias using IntentScope's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for IntentScope operations
///
/// Empty input text and labels outside the declared intent set are data,
/// not errors: they never produce one of these variants.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required input columns are missing
    #[error("schema error: {0}")]
    Schema(String),

    /// No prediction backend could be constructed
    #[error("no prediction backend available: {0}")]
    BackendUnavailable(String),

    /// The selected backend failed while predicting an example
    #[error("{backend} backend failed to predict: {message}")]
    BackendPrediction {
        /// Discriminator of the failing backend
        backend: String,
        /// Underlying failure
        message: String,
    },

    /// Configuration errors (bad patterns, malformed artifacts, inconsistent inputs)
    #[error("configuration error: {0}")]
    Config(String),

    /// Report rendering errors
    #[error("render error: {0}")]
    Render(String),

    /// Filesystem/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Tabular input/output errors
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Create a new schema error
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Create a new backend-unavailable error
    pub fn backend_unavailable(msg: impl Into<String>) -> Self {
        Self::BackendUnavailable(msg.into())
    }

    /// Create a new prediction error for the named backend
    pub fn prediction(backend: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::BackendPrediction {
            backend: backend.into(),
            message: msg.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new render error
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_error_message() {
        let err = Error::prediction("external", "connection refused");
        assert_eq!(
            err.to_string(),
            "external backend failed to predict: connection refused"
        );
    }

    #[test]
    fn test_schema_error_message() {
        let err = Error::schema("missing column(s): gold_intent");
        assert_eq!(
            err.to_string(),
            "schema error: missing column(s): gold_intent"
        );
    }
}
