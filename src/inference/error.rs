//! Inference errors

use std::path::PathBuf;

/// Per-request failure. Never fatal to the process.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid input data for '{field}'. Please check your inputs.")]
    InvalidInput { field: &'static str, value: String },

    #[error("Invalid model choice.")]
    UnknownModel(String),

    /// Finite inputs overflowed while being scaled, projected or scored
    #[error("Input values are out of range for the {0} stage. Please check your inputs.")]
    NonFinite(&'static str),
}

/// Startup failure while loading a fitted artifact. Fatal.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact {artifact}: {reason}")]
    Invalid { artifact: &'static str, reason: String },
}

impl ArtifactError {
    pub(crate) fn invalid(artifact: &'static str, reason: impl Into<String>) -> Self {
        ArtifactError::Invalid {
            artifact,
            reason: reason.into(),
        }
    }
}
