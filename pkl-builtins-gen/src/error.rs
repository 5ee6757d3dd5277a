//! Error types for `pkl-builtins-gen`.
//!
//! Only failures that indicate a broken build environment live here. Problems
//! with an individual fragment during metadata extraction are reported as
//! [`crate::metadata::SkipReason`] values instead and never abort a run.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias for results produced by the generator.
pub type GenResult<T> = Result<T, GenError>;

/// Errors surfaced by the `pkl-builtins-gen` pipeline.
#[derive(Debug, Error)]
pub enum GenError {
    /// Configuration layers could not be merged or extracted.
    #[error("failed to load configuration: {0}")]
    Config(#[from] Box<figment::Error>),

    /// The metadata list could not be rendered as JSON.
    #[error("failed to serialise builtins metadata: {0}")]
    MetadataJson(#[from] serde_json::Error),

    /// A metadata sidecar could not be decoded.
    #[error("failed to parse builtins metadata at {path}: {source}")]
    MetadataParse {
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// A discovered path could not be represented as UTF-8.
    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(String),

    /// The external tool could not be started.
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The final rename of the metadata file failed.
    #[error("failed to persist {path}: {source}")]
    Persist {
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Filesystem access failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl GenError {
    /// Wraps an I/O error with the path it relates to.
    #[must_use]
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<figment::Error> for GenError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}
