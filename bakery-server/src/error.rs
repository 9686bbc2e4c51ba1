//! API error handling module
//!
//! Maps codec, upload and verifier failures onto HTTP responses with a
//! stable `code` field.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bakery_core::{BakeryError, SessionError, UploadError};
use thiserror::Error;

/// API error type with structured variants for different error categories
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request - client provided invalid input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error - unexpected server-side failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Service unavailable - verifier is not configured or not reachable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Upload action rejected (no file, or more than one)
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Uploaded document is not a JSON object
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// `data_url` field is not a base64 PNG data URL
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// Error from the codec or verifier
    #[error("Bakery error: {0}")]
    Bakery(#[from] BakeryError),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Upload(e) => Self::Upload(e),
            SessionError::Bakery(e) => Self::Bakery(e),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create an internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a service unavailable error
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Attribute a parse failure to the uploaded document instead of an
    /// embedded one. Other errors pass through.
    pub fn uploaded_document(err: impl Into<ApiError>) -> Self {
        match err.into() {
            Self::Bakery(BakeryError::ParseError(message)) => Self::InvalidDocument(message),
            other => other,
        }
    }

    /// Decoding a `data_url` field failed.
    pub fn data_url(err: BakeryError) -> Self {
        Self::InvalidDataUrl(err.to_string())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Upload(_) | Self::InvalidDataUrl(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidDocument(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Bakery(e) => match e {
                // Not a PNG, truncated, or bad iTXt header
                BakeryError::FormatError(_) | BakeryError::InvalidKeyword(_) => {
                    StatusCode::BAD_REQUEST
                }

                // Well-formed request whose content cannot be used → 422
                BakeryError::ChecksumMismatch { .. }
                | BakeryError::UnsupportedCompression(_)
                | BakeryError::ParseError(_) => StatusCode::UNPROCESSABLE_ENTITY,

                BakeryError::NotFound(_) => StatusCode::NOT_FOUND,

                // External verifier failures → 503
                BakeryError::VerificationError(_) | BakeryError::HttpError(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
            },
        }
    }

    /// Get the error code for programmatic error handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "INVALID_INPUT",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::ServiceUnavailable(_) => "VERIFIER_UNAVAILABLE",
            Self::Upload(UploadError::NoFile) => "NO_FILE",
            Self::Upload(UploadError::MultipleFiles(_)) => "MULTIPLE_FILES",
            Self::InvalidDocument(_) => "MALFORMED_DOCUMENT",
            Self::InvalidDataUrl(_) => "INVALID_DATA_URL",
            Self::Bakery(e) => match e {
                BakeryError::FormatError(_) => "INVALID_PNG",
                BakeryError::ChecksumMismatch { .. } => "CHECKSUM_MISMATCH",
                BakeryError::InvalidKeyword(_) => "INVALID_KEYWORD",
                BakeryError::UnsupportedCompression(_) => "UNSUPPORTED_COMPRESSION",
                BakeryError::NotFound(_) => "NO_EMBEDDED_DOCUMENT",
                BakeryError::ParseError(_) => "MALFORMED_DOCUMENT",
                BakeryError::VerificationError(_) | BakeryError::HttpError(_) => {
                    "VERIFIER_UNAVAILABLE"
                }
            },
        }
    }

    /// Get sanitized error message for client response
    fn client_message(&self) -> String {
        match self {
            Self::Bakery(e) => match e {
                // Codec messages name the failing structure and carry no server state
                BakeryError::FormatError(message) => format!("Invalid PNG: {message}"),
                BakeryError::ChecksumMismatch { chunk_type, .. } => {
                    format!("Corrupted PNG: checksum mismatch in {chunk_type} chunk")
                }
                BakeryError::InvalidKeyword(_) => "Invalid iTXt keyword".to_string(),
                BakeryError::UnsupportedCompression(method) => {
                    format!("Unsupported iTXt compression method {method}")
                }
                BakeryError::NotFound(_) => "No embedded document found in image".to_string(),
                BakeryError::ParseError(_) => {
                    "Embedded document is not a JSON object".to_string()
                }
                BakeryError::VerificationError(_) | BakeryError::HttpError(_) => {
                    "Verifier unavailable".to_string()
                }
            },
            Self::Upload(e) => e.to_string(),
            Self::InvalidDocument(_) => "Uploaded document is not a JSON object".to_string(),
            Self::InvalidDataUrl(_) => {
                "Invalid data URL: expected data:image/png;base64,...".to_string()
            }
            // Never leak internal details
            Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Get the error category for logging
    fn error_category(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Internal(_) => "internal",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::Upload(_) => "upload",
            Self::InvalidDocument(_) => "document",
            Self::InvalidDataUrl(_) => "data_url",
            Self::Bakery(_) => "bakery",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let category = self.error_category();
        let code = self.error_code();
        let internal_message = self.to_string();
        let client_message = self.client_message();

        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            tracing::error!(
                status = %status,
                category = category,
                code = code,
                error = %internal_message,
                "Server error"
            );
        } else {
            tracing::warn!(
                status = %status,
                category = category,
                code = code,
                error = %internal_message,
                "Request failed"
            );
        }

        let body = serde_json::json!({
            "error": client_message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
