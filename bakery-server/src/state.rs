//! Application state module
//!
//! Defines shared state accessible across all request handlers.

use std::sync::Arc;

use bakery_core::{DocumentVerifier, VerifierConfig, VerifierFactory, VerifyOptions};

use crate::config::Config;

/// Application state containing shared resources.
#[derive(Clone)]
pub struct AppState {
    /// Configured verifier, `None` when BAKERY_VERIFIER_URL is unset
    pub verifier: Option<Arc<dyn DocumentVerifier>>,
    /// Options sent with every verification request
    pub options: VerifyOptions,
    /// Maximum size of a single uploaded file in bytes
    pub max_file_size: usize,
    /// Whether the `mock` form field is honoured (testing environments only)
    pub allow_mock_verifier: bool,
}

impl AppState {
    /// Build state from configuration, selecting the verifier from the environment.
    pub fn from_config(config: &Config) -> Self {
        let verifier = match VerifierFactory::create(VerifierConfig::Auto) {
            Ok(verifier) => {
                tracing::info!(verifier = verifier.name(), "Verifier configured");
                Some(verifier)
            }
            Err(e) => {
                tracing::warn!(error = %e, "No verifier available; /verify will return 503");
                None
            }
        };
        Self::with_verifier(config, verifier)
    }

    /// Build state with an explicit verifier.
    pub fn with_verifier(config: &Config, verifier: Option<Arc<dyn DocumentVerifier>>) -> Self {
        Self {
            verifier,
            options: VerifyOptions::new(config.network.clone()),
            max_file_size: config.max_file_size(),
            allow_mock_verifier: config.allow_mock_verifier,
        }
    }
}
