//! Upload validation module
//!
//! Content-Type and size checks for multipart uploads.

use crate::error::ApiError;

/// Content types accepted for image uploads
pub const IMAGE_CONTENT_TYPES: &[&str] = &["image/png", "application/octet-stream"];

/// Content types accepted for document uploads
pub const DOCUMENT_CONTENT_TYPES: &[&str] = &[
    "application/json",
    "text/plain",
    "application/octet-stream",
];

/// Content types accepted where either a baked image or a document may be sent
pub const ANY_CONTENT_TYPES: &[&str] = &[
    "image/png",
    "application/json",
    "text/plain",
    "application/octet-stream",
];

/// Default max file size in bytes (25 MB)
pub const DEFAULT_MAX_FILE_SIZE: usize = 25 * 1024 * 1024;

/// Validates the Content-Type of an uploaded file against `allowed`.
///
/// Parameters such as `; charset=utf-8` are ignored. A missing
/// Content-Type is treated as binary and accepted.
pub fn validate_content_type(content_type: Option<&str>, allowed: &[&str]) -> Result<(), ApiError> {
    let Some(ct) = content_type else {
        return Ok(());
    };
    let essence = ct
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    if allowed.contains(&essence.as_str()) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "Unsupported Content-Type: '{}'. Allowed types: {}",
            ct,
            allowed.join(", ")
        )))
    }
}

/// Validates the size of an uploaded file
///
/// Returns an error if the file exceeds the maximum size.
pub fn validate_file_size(size: usize, max_size: usize) -> Result<(), ApiError> {
    if size > max_size {
        let max_mb = max_size / (1024 * 1024);
        let actual_mb = size / (1024 * 1024);
        Err(ApiError::bad_request(format!(
            "File too large: {} MB exceeds maximum of {} MB",
            actual_mb, max_mb
        )))
    } else {
        Ok(())
    }
}
