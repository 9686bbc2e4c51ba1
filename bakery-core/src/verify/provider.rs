//! Verifier selection from configuration.

use std::sync::Arc;

use tracing::info;

use super::{DocumentVerifier, HttpVerifier, HttpVerifierConfig, MockOutcome, MockVerifier};
use crate::error::{BakeryError, Result};

/// Configuration for creating verifiers.
#[derive(Debug, Clone, Default)]
pub enum VerifierConfig {
    /// Remote verifier service
    Http(HttpVerifierConfig),

    /// Mock verifier (testing only)
    Mock(MockOutcome),

    /// Use `BAKERY_VERIFIER_URL` if set
    #[default]
    Auto,
}

/// Factory for creating verifiers.
pub struct VerifierFactory;

impl VerifierFactory {
    /// Create a verifier from configuration.
    pub fn create(config: VerifierConfig) -> Result<Arc<dyn DocumentVerifier>> {
        match config {
            VerifierConfig::Http(http_config) => Ok(Arc::new(HttpVerifier::new(http_config)?)),
            VerifierConfig::Mock(outcome) => Ok(Arc::new(MockVerifier::new(outcome))),
            VerifierConfig::Auto => Self::create_auto(),
        }
    }

    /// Auto-select from the environment.
    ///
    /// No mock fallback: a missing verifier is an error.
    fn create_auto() -> Result<Arc<dyn DocumentVerifier>> {
        match HttpVerifierConfig::from_env() {
            Ok(config) => {
                info!(url = %config.base_url, "Auto-selected HTTP verifier");
                Self::create(VerifierConfig::Http(config))
            }
            Err(_) => Err(BakeryError::VerificationError(
                "no verifier configured (set BAKERY_VERIFIER_URL)".into(),
            )),
        }
    }

    /// Create a mock verifier for testing.
    pub fn create_mock(outcome: MockOutcome) -> Arc<dyn DocumentVerifier> {
        Arc::new(MockVerifier::new(outcome))
    }
}
