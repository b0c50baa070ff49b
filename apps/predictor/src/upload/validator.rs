#![allow(dead_code)]

use crate::errors::ValidationRejection;
use crate::models::file::{CandidateFile, DOCX_MIME, PDF_MIME};

/// 10 MiB, inclusive.
pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

pub const ACCEPTED_MIME_TYPES: &[&str] = &[PDF_MIME, DOCX_MIME];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationResult {
    Accepted,
    Rejected(ValidationRejection),
}

impl ValidationResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationResult::Accepted)
    }
}

/// Gates a candidate file on its declared type, then its size.
///
/// The declared type is compared for exact equality; there is no extension
/// fallback and no content sniffing. Size is only checked once the type passed.
pub fn validate(file: &CandidateFile) -> ValidationResult {
    if !ACCEPTED_MIME_TYPES.contains(&file.mime_type.as_str()) {
        return ValidationResult::Rejected(ValidationRejection::UnsupportedType);
    }

    if file.size_bytes > MAX_FILE_SIZE_BYTES {
        return ValidationResult::Rejected(ValidationRejection::TooLarge);
    }

    ValidationResult::Accepted
}
