use thiserror::Error;

/// Maximum size of a chunk's data field, per the PNG specification (2^31 - 1).
pub const MAX_CHUNK_LENGTH: u32 = 0x7FFF_FFFF;

#[derive(Error, Debug)]
pub enum BakeryError {
    #[error("Format error: {0}")]
    FormatError(String),

    #[error("Checksum mismatch in {chunk_type} chunk: stored={stored:#010x}, computed={computed:#010x}")]
    ChecksumMismatch {
        chunk_type: String,
        stored: u32,
        computed: u32,
    },

    #[error("Invalid iTXt keyword: {0}")]
    InvalidKeyword(String),

    #[error("Unsupported iTXt compression method: {0}")]
    UnsupportedCompression(u8),

    #[error("Not found: no iTXt chunk with keyword '{0}'")]
    NotFound(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Verification error: {0}")]
    VerificationError(String),

    #[cfg(feature = "network")]
    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Coarse classification used by callers to pick a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input is not a well-formed PNG, a chunk is corrupt, or iTXt fields are missing.
    Format,
    /// The requested keyword is absent.
    NotFound,
    /// The embedded text is not a valid document.
    Parse,
    /// The external verifier could not produce a result.
    Verification,
}

impl BakeryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FormatError(_)
            | Self::ChecksumMismatch { .. }
            | Self::InvalidKeyword(_)
            | Self::UnsupportedCompression(_) => ErrorKind::Format,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::ParseError(_) => ErrorKind::Parse,
            Self::VerificationError(_) => ErrorKind::Verification,
            #[cfg(feature = "network")]
            Self::HttpError(_) => ErrorKind::Verification,
        }
    }

    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self::FormatError(message.into())
    }
}

pub type Result<T> = std::result::Result<T, BakeryError>;
