//! Verification of extracted documents.
//!
//! The cryptographic checks themselves happen in an external verifier
//! service. This module defines the outcome records it returns, reduces them
//! to a single verdict, and (with the `network` feature) provides clients for
//! talking to the service.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bakery_core::verify::{is_valid, DocumentVerifier, VerifierConfig, VerifierFactory, VerifyOptions};
//!
//! # async fn example(document: bakery_core::WrappedDocument) -> bakery_core::Result<()> {
//! let verifier = VerifierFactory::create(VerifierConfig::Auto)?;
//! let fragments = verifier.verify(&document, &VerifyOptions::from_env()).await?;
//! println!("valid: {}", is_valid(&fragments));
//! # Ok(())
//! # }
//! ```

mod aggregate;
#[cfg(feature = "network")]
mod http;
mod mock;
#[cfg(feature = "network")]
mod provider;

pub use aggregate::{is_valid, Verdict};
#[cfg(feature = "network")]
pub use http::{is_transient_error, is_transient_status, HttpVerifier, HttpVerifierConfig};
pub use mock::{MockOutcome, MockVerifier};
#[cfg(feature = "network")]
pub use provider::{VerifierConfig, VerifierFactory};

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[cfg(feature = "network")]
use async_trait::async_trait;

#[cfg(feature = "network")]
use crate::document::WrappedDocument;
#[cfg(feature = "network")]
use crate::error::Result;

/// Network used when none is configured.
pub const DEFAULT_NETWORK: &str = "sepolia";

/// Status of one verification fragment, in the verifier's wire vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FragmentStatus {
    Valid,
    Invalid,
    Error,
    Skipped,
}

impl FragmentStatus {
    /// Only `VALID` counts towards a passing document.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Valid)
    }

    /// `INVALID` and `ERROR` fail a document. `SKIPPED` checks did not apply
    /// and are neutral.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Invalid | Self::Error)
    }
}

/// One outcome record returned by the verifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationFragment {
    /// Check category, e.g. "DOCUMENT_INTEGRITY"
    #[serde(rename = "type")]
    pub kind: String,
    /// Name of the check that produced this fragment
    pub name: String,
    pub status: FragmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<Value>,
}

impl VerificationFragment {
    pub fn new(kind: impl Into<String>, name: impl Into<String>, status: FragmentStatus) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            status,
            data: None,
            reason: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }
}

/// Options forwarded to the verifier with each request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOptions {
    /// Blockchain network the document is anchored on.
    pub network: String,
}

impl VerifyOptions {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
        }
    }

    /// Read `BAKERY_VERIFIER_NETWORK`, falling back to [`DEFAULT_NETWORK`].
    pub fn from_env() -> Self {
        match std::env::var("BAKERY_VERIFIER_NETWORK") {
            Ok(network) if !network.trim().is_empty() => Self::new(network.trim()),
            _ => Self::default(),
        }
    }
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self::new(DEFAULT_NETWORK)
    }
}

/// Trait for document verifiers.
///
/// Implementations must be thread-safe (`Send + Sync`). A returned `Err`
/// means verification could not be carried out; it never means the
/// document is invalid.
#[cfg(feature = "network")]
#[async_trait]
pub trait DocumentVerifier: Send + Sync {
    /// Verify `document`, returning one fragment per check performed.
    async fn verify(
        &self,
        document: &WrappedDocument,
        options: &VerifyOptions,
    ) -> Result<Vec<VerificationFragment>>;

    /// Short identifier for logs and API responses.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_wire_format() {
        let json = r#"{"type":"DOCUMENT_STATUS","name":"OpenAttestationEthereumDocumentStoreStatus","status":"INVALID","reason":{"code":1,"message":"revoked"}}"#;
        let fragment: VerificationFragment = serde_json::from_str(json).unwrap();
        assert_eq!(fragment.kind, "DOCUMENT_STATUS");
        assert_eq!(fragment.status, FragmentStatus::Invalid);
        assert!(fragment.data.is_none());
        assert!(!fragment.is_success());

        let back: Value = serde_json::to_value(&fragment).unwrap();
        assert_eq!(back, serde_json::from_str::<Value>(json).unwrap());
    }

    #[test]
    fn test_only_valid_is_success() {
        assert!(FragmentStatus::Valid.is_success());
        assert!(!FragmentStatus::Invalid.is_success());
        assert!(!FragmentStatus::Error.is_success());
        assert!(!FragmentStatus::Skipped.is_success());
    }

    #[test]
    fn test_skipped_is_neutral() {
        assert!(FragmentStatus::Invalid.is_failure());
        assert!(FragmentStatus::Error.is_failure());
        assert!(!FragmentStatus::Skipped.is_failure());
        assert!(!FragmentStatus::Valid.is_failure());
    }

    #[test]
    fn test_unknown_status_rejected() {
        let json = r#"{"type":"X","name":"Y","status":"MAYBE"}"#;
        assert!(serde_json::from_str::<VerificationFragment>(json).is_err());
    }

    #[test]
    fn test_default_network() {
        assert_eq!(VerifyOptions::default().network, DEFAULT_NETWORK);
        assert_eq!(VerifyOptions::new("mainnet").network, "mainnet");
    }
}
