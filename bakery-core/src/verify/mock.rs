//! Deterministic verifier for tests and offline demos.

use serde_json::json;

use super::{FragmentStatus, VerificationFragment};
use crate::error::{BakeryError, Result};

/// What the mock reports for every document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockOutcome {
    /// Every check passes.
    #[default]
    Valid,
    /// The document status check fails (e.g. revoked).
    Invalid,
    /// The verifier cannot be reached.
    Unreachable,
}

/// Mock verifier.
/// WARNING: never use outside tests; it does not look at the document.
#[derive(Debug, Clone, Default)]
pub struct MockVerifier {
    outcome: MockOutcome,
}

impl MockVerifier {
    pub fn new(outcome: MockOutcome) -> Self {
        Self { outcome }
    }

    pub fn outcome(&self) -> MockOutcome {
        self.outcome
    }

    /// Produce the fragments a real verifier would return for this outcome.
    pub fn fragments_for(&self, network: &str) -> Result<Vec<VerificationFragment>> {
        let status_check = match self.outcome {
            MockOutcome::Valid => FragmentStatus::Valid,
            MockOutcome::Invalid => FragmentStatus::Invalid,
            MockOutcome::Unreachable => {
                return Err(BakeryError::VerificationError(
                    "mock verifier configured as unreachable".into(),
                ))
            }
        };

        let mut status = VerificationFragment::new(
            "DOCUMENT_STATUS",
            "OpenAttestationEthereumDocumentStoreStatus",
            status_check,
        );
        status.data = Some(json!({ "network": network }));
        if status_check == FragmentStatus::Invalid {
            status.reason = Some(json!({ "code": 5, "message": "Document has been revoked" }));
        }

        Ok(vec![
            VerificationFragment::new(
                "DOCUMENT_INTEGRITY",
                "OpenAttestationHash",
                FragmentStatus::Valid,
            ),
            status,
            VerificationFragment::new(
                "ISSUER_IDENTITY",
                "OpenAttestationDnsTxtIdentityProof",
                FragmentStatus::Valid,
            ),
        ])
    }
}

#[cfg(feature = "network")]
mod network_impl {
    use async_trait::async_trait;
    use tracing::debug;

    use super::MockVerifier;
    use crate::document::WrappedDocument;
    use crate::error::Result;
    use crate::verify::{DocumentVerifier, VerificationFragment, VerifyOptions};

    #[async_trait]
    impl DocumentVerifier for MockVerifier {
        async fn verify(
            &self,
            _document: &WrappedDocument,
            options: &VerifyOptions,
        ) -> Result<Vec<VerificationFragment>> {
            debug!(outcome = ?self.outcome(), "Mock verification");
            self.fragments_for(&options.network)
        }

        fn name(&self) -> &'static str {
            "mock"
        }
    }
}
