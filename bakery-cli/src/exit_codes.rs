//! Exit codes following sysexits.h conventions.
//!
//! These codes provide semantic meaning for different failure modes,
//! enabling scripts and CI systems to handle errors appropriately.

use bakery_core::{BakeryError, ErrorKind, SessionError};

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Data format error (not a PNG, corrupt chunk, malformed or invalid document).
/// Maps to EX_DATAERR from sysexits.h.
pub const DATA_ERROR: i32 = 65;

/// Cannot open input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// Verifier service unavailable.
/// Maps to EX_UNAVAILABLE from sysexits.h.
pub const VERIFIER_UNAVAILABLE: i32 = 69;

/// I/O error (cannot write output file).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub const fn success() -> Self {
        Self {
            code: SUCCESS,
            message: None,
        }
    }

    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        // Typed errors first, then the context messages attached by commands
        let kind = err.chain().find_map(|cause| {
            cause
                .downcast_ref::<BakeryError>()
                .map(BakeryError::kind)
                .or_else(|| match cause.downcast_ref::<SessionError>() {
                    Some(SessionError::Bakery(e)) => Some(e.kind()),
                    _ => None,
                })
        });

        let code = if message.contains("Failed to read") {
            INPUT_ERROR
        } else if message.contains("Failed to write") {
            IO_ERROR
        } else {
            match kind {
                Some(ErrorKind::Verification) => VERIFIER_UNAVAILABLE,
                Some(ErrorKind::Format | ErrorKind::NotFound | ErrorKind::Parse) => DATA_ERROR,
                None if message.contains("Verification failed") => DATA_ERROR,
                None => GENERAL_ERROR,
            }
        };

        Self {
            code,
            message: Some(message),
        }
    }
}
