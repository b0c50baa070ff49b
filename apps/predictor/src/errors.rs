#![allow(dead_code)]

use thiserror::Error;

/// Shown when the service fails without giving a usable reason.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to analyze resume";

/// Why the validator refused a candidate file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationRejection {
    UnsupportedType,
    TooLarge,
}

/// Everything that can go wrong during one upload attempt.
///
/// None of these are fatal to the session: each one is surfaced as a single
/// line of user-visible text and the user retries by reselecting or resubmitting.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("No file selected")]
    NoFileSelected,

    #[error("Unsupported file type")]
    UnsupportedType,

    #[error("File too large")]
    TooLarge,

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Analysis service error: {0}")]
    ServiceError(String),
}

impl UploadError {
    /// The text a user sees for this error.
    pub fn user_message(&self) -> String {
        match self {
            UploadError::NoFileSelected => "Choose a file first".to_string(),
            UploadError::UnsupportedType => "Only PDF or DOCX allowed".to_string(),
            UploadError::TooLarge => "Max size: 10MB".to_string(),
            UploadError::NetworkFailure(msg) | UploadError::ServiceError(msg) => {
                if msg.trim().is_empty() {
                    GENERIC_FAILURE_MESSAGE.to_string()
                } else {
                    msg.clone()
                }
            }
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, UploadError::UnsupportedType | UploadError::TooLarge)
    }
}

impl From<ValidationRejection> for UploadError {
    fn from(rejection: ValidationRejection) -> Self {
        match rejection {
            ValidationRejection::UnsupportedType => UploadError::UnsupportedType,
            ValidationRejection::TooLarge => UploadError::TooLarge,
        }
    }
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        UploadError::NetworkFailure(err.to_string())
    }
}
