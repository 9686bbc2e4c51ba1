//! Bakery Core - attestation documents baked into PNG images
//!
//! This crate embeds a wrapped attestation document inside a PNG image as an
//! international text (`iTXt`) chunk, recovers it later, and reduces the
//! outcomes of an external verifier to a single pass/fail decision.
//!
//! # Features
//!
//! - Chunk-level PNG codec with CRC verification; pixel data is untouched
//! - `iTXt` encode/decode, including zlib-compressed chunks written by other tools
//! - Base64 data URLs for display and download
//! - Validity aggregation over verifier fragments
//! - Async verifier clients (feature `network`)
//!
//! # Example
//!
//! ```no_run
//! use bakery_core::{bake, extract, is_valid, MockVerifier, WrappedDocument};
//!
//! # fn example(image: &[u8], json: &str) -> bakery_core::Result<()> {
//! let document = WrappedDocument::from_json_str(json)?;
//! let baked = bake(image, &document)?;
//! println!("{}", baked.to_data_url());
//!
//! let recovered = extract(&baked.bytes)?;
//! assert_eq!(recovered, document);
//!
//! let fragments = MockVerifier::default().fragments_for("sepolia")?;
//! assert!(is_valid(&fragments));
//! # Ok(())
//! # }
//! ```

pub mod bake;
pub mod document;
pub mod error;
pub mod png;
pub mod session;
pub mod verify;

// Re-export main types for convenience
pub use bake::{
    bake, bake_text, bake_with_mode, extract, extract_text, from_data_url, to_data_url, BakeMode,
    BakedImage, KEYWORD, PNG_MIME,
};
pub use document::{DocumentFormat, DocumentId, DocumentSignature, WrappedDocument};
pub use error::{BakeryError, ErrorKind, Result, MAX_CHUNK_LENGTH};
pub use png::PngBuffer;
pub use session::{single_upload, BakeSession, SessionError, Upload, UploadError, VerifySession};
pub use verify::{
    is_valid, FragmentStatus, MockOutcome, MockVerifier, VerificationFragment, Verdict,
    VerifyOptions, DEFAULT_NETWORK,
};

// Network-dependent exports (not available in Wasm)
#[cfg(feature = "network")]
pub use verify::{DocumentVerifier, HttpVerifier, HttpVerifierConfig, VerifierConfig, VerifierFactory};
