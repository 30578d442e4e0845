//! Error types for statline-core operations.
//!
//! Errors here are for internal propagation and logging only. The binary
//! never surfaces them on stdout: every failure path degrades to a default
//! value so the status line keeps rendering.

/// All errors that can occur in statline-core operations.
#[derive(Debug, thiserror::Error)]
pub enum StatlineError {
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StatlineError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        StatlineError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        StatlineError::Json {
            context: context.into(),
            source,
        }
    }
}

/// Convenience type alias for Results using StatlineError.
pub type Result<T> = std::result::Result<T, StatlineError>;
