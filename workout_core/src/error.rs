//! Error types for the workout_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for workout_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Cache store error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Composition failed; wraps the composer's terminal error
    #[error(transparent)]
    Composer(#[from] ComposerError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Transport and protocol failures talking to the generative service
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// No API credential is configured
    #[error("missing API credential")]
    MissingCredential,

    /// The service answered but the body had no usable text
    #[error("invalid response from generative service")]
    InvalidResponse,

    /// Non-success HTTP status
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// Response body could not be decoded
    #[error("decoding error: {0}")]
    Decoding(String),

    /// Connection failure or per-call timeout
    #[error("transport error: {0}")]
    Transport(String),
}

impl ClientError {
    /// Returns true if a later attempt with the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::MissingCredential => false,
            ClientError::Http { status, .. } => {
                !(400..500).contains(status) || *status == 408 || *status == 429
            }
            ClientError::InvalidResponse
            | ClientError::Decoding(_)
            | ClientError::Transport(_) => true,
        }
    }
}

/// The bare kind of a validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    InvalidJson,
    MissingPhases,
    PhaseCountMismatch,
    UnknownPhaseKind,
    ExerciseCountOutOfBounds,
    RepRangeViolation,
}

/// A generation reply that does not honour the blueprint contract
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("reply contains no parseable workout JSON: {0}")]
    InvalidJson(String),

    #[error("reply has no phases")]
    MissingPhases,

    #[error("reply phases {found:?} do not fit blueprint phases {expected:?}")]
    PhaseCountMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("phase {index} has unknown kind {kind:?}")]
    UnknownPhaseKind { index: usize, kind: String },

    #[error("phase {index} has {count} exercises, expected {min}..={max}")]
    ExerciseCountOutOfBounds {
        index: usize,
        count: usize,
        min: usize,
        max: usize,
    },

    #[error("phase {index} exercise {exercise:?}: {detail}")]
    RepRangeViolation {
        index: usize,
        exercise: String,
        detail: String,
    },
}

impl ValidationError {
    pub fn kind(&self) -> ValidationErrorKind {
        match self {
            ValidationError::InvalidJson(_) => ValidationErrorKind::InvalidJson,
            ValidationError::MissingPhases => ValidationErrorKind::MissingPhases,
            ValidationError::PhaseCountMismatch { .. } => ValidationErrorKind::PhaseCountMismatch,
            ValidationError::UnknownPhaseKind { .. } => ValidationErrorKind::UnknownPhaseKind,
            ValidationError::ExerciseCountOutOfBounds { .. } => {
                ValidationErrorKind::ExerciseCountOutOfBounds
            }
            ValidationError::RepRangeViolation { .. } => ValidationErrorKind::RepRangeViolation,
        }
    }
}

/// Terminal failures of a composition request
///
/// Only these ever reach the caller; client and validation errors are
/// recovered inside the composer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComposerError {
    /// The local planner could not fill the primary phase
    #[error("could not build a workout: no compatible exercises for the main block")]
    NoCompatibleBlocks,

    /// Every path was tried without producing a plan
    #[error("could not build a workout: all attempts exhausted")]
    AllAttemptsExhausted,

    /// The exercise catalog could not be read
    #[error("could not build a workout: catalog unavailable ({0})")]
    CatalogUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_client_errors() {
        assert!(ClientError::Http {
            status: 500,
            message: "boom".into()
        }
        .is_retryable());
        assert!(ClientError::Http {
            status: 429,
            message: "slow down".into()
        }
        .is_retryable());
        assert!(ClientError::Transport("reset".into()).is_retryable());
        assert!(ClientError::InvalidResponse.is_retryable());
    }

    #[test]
    fn test_permanent_client_errors() {
        assert!(!ClientError::MissingCredential.is_retryable());
        assert!(!ClientError::Http {
            status: 401,
            message: "bad key".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_validation_error_kind() {
        assert_eq!(
            ValidationError::MissingPhases.kind(),
            ValidationErrorKind::MissingPhases
        );
        assert_eq!(
            ValidationError::UnknownPhaseKind {
                index: 0,
                kind: "bogus".into()
            }
            .kind(),
            ValidationErrorKind::UnknownPhaseKind
        );
    }
}
