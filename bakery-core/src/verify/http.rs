//! HTTP client for the external document verifier, with retry and backoff.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use backoff::{future::retry_notify, ExponentialBackoff};
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::{DocumentVerifier, VerificationFragment, VerifyOptions};
use crate::document::WrappedDocument;
use crate::error::{BakeryError, Result};

/// Configuration for [`HttpVerifier`].
#[derive(Debug, Clone)]
pub struct HttpVerifierConfig {
    /// Base URL of the verifier service; requests go to `{base_url}/verify`.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retry attempts for transient errors.
    pub max_retries: u32,
    /// Initial retry interval.
    pub initial_interval: Duration,
    /// Maximum retry interval.
    pub max_interval: Duration,
    /// Refuse plain-HTTP URLs.
    pub https_only: bool,
}

impl HttpVerifierConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let https_only = !is_loopback_url(&base_url);
        Self {
            base_url,
            timeout: Duration::from_secs(15),
            max_retries: 3,
            initial_interval: Duration::from_millis(200),
            max_interval: Duration::from_secs(2),
            https_only,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Required: `BAKERY_VERIFIER_URL`
    /// Optional: `BAKERY_VERIFIER_TIMEOUT_SECS` (default 15),
    /// `BAKERY_VERIFIER_MAX_RETRIES` (default 3)
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("BAKERY_VERIFIER_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                BakeryError::VerificationError(
                    "BAKERY_VERIFIER_URL environment variable not set".into(),
                )
            })?;

        let mut config = Self::new(base_url.trim());
        if let Some(secs) = env_parse::<u64>("BAKERY_VERIFIER_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = env_parse::<u32>("BAKERY_VERIFIER_MAX_RETRIES") {
            config.max_retries = retries;
        }
        Ok(config)
    }

    fn endpoint(&self) -> String {
        format!("{}/verify", self.base_url.trim_end_matches('/'))
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Plain-HTTP URL whose host is exactly a loopback name or address.
fn is_loopback_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            parsed.scheme() == "http"
                && matches!(parsed.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"))
        }
        Err(_) => false,
    }
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    document: &'a WrappedDocument,
    options: &'a VerifyOptions,
}

/// Verifier backed by a remote HTTP service.
pub struct HttpVerifier {
    client: Client,
    config: HttpVerifierConfig,
}

impl HttpVerifier {
    pub fn new(config: HttpVerifierConfig) -> Result<Self> {
        if config.https_only && !config.base_url.starts_with("https://") {
            return Err(BakeryError::VerificationError(format!(
                "verifier URL must use https: {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .https_only(config.https_only)
            .build()?;

        info!(url = %config.base_url, "Created HTTP verifier");
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpVerifierConfig {
        &self.config
    }

    async fn verify_once(
        &self,
        url: &str,
        body: &VerifyRequest<'_>,
    ) -> std::result::Result<Vec<VerificationFragment>, backoff::Error<BakeryError>> {
        let start = Instant::now();

        let response = self.client.post(url).json(body).send().await.map_err(|e| {
            let latency_ms = start.elapsed().as_millis() as u64;
            if is_transient_error(&e) {
                warn!(error = %e, latency_ms, "Transient error, will retry");
                backoff::Error::transient(BakeryError::VerificationError(format!(
                    "verifier unreachable: {e}"
                )))
            } else {
                warn!(error = %e, latency_ms, "Permanent error, aborting");
                backoff::Error::permanent(BakeryError::VerificationError(format!(
                    "verifier request failed: {e}"
                )))
            }
        })?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            let latency_ms = start.elapsed().as_millis() as u64;
            let err =
                BakeryError::VerificationError(format!("verifier returned status: {status}"));
            return if is_transient_status(status) {
                warn!(status = %status, latency_ms, "Transient HTTP status, will retry");
                Err(backoff::Error::transient(err))
            } else {
                warn!(status = %status, latency_ms, "Permanent HTTP error");
                Err(backoff::Error::permanent(err))
            };
        }

        let fragments: Vec<VerificationFragment> = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse verifier response");
            backoff::Error::permanent(BakeryError::VerificationError(format!(
                "malformed verifier response: {e}"
            )))
        })?;

        if fragments.is_empty() {
            return Err(backoff::Error::permanent(BakeryError::VerificationError(
                "verifier returned no fragments".into(),
            )));
        }

        debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            fragments = fragments.len(),
            "Request completed successfully"
        );
        Ok(fragments)
    }

    fn build_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.config.initial_interval,
            max_interval: self.config.max_interval,
            max_elapsed_time: Some(self.config.timeout * self.config.max_retries),
            ..Default::default()
        }
    }
}

#[async_trait]
impl DocumentVerifier for HttpVerifier {
    #[instrument(skip(self, document), fields(network = %options.network))]
    async fn verify(
        &self,
        document: &WrappedDocument,
        options: &VerifyOptions,
    ) -> Result<Vec<VerificationFragment>> {
        let url = self.config.endpoint();
        let body = VerifyRequest { document, options };

        retry_notify(
            self.build_backoff(),
            || self.verify_once(&url, &body),
            |err: BakeryError, duration: Duration| {
                warn!(
                    error = %err,
                    retry_after_ms = duration.as_millis() as u64,
                    "Retry scheduled"
                );
            },
        )
        .await
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Check if a reqwest error is transient and should be retried.
pub fn is_transient_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}

/// Check if an HTTP status code indicates a transient error.
pub fn is_transient_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
            | StatusCode::BAD_GATEWAY
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_status_codes() {
        assert!(is_transient_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_transient_status(StatusCode::GATEWAY_TIMEOUT));
        assert!(is_transient_status(StatusCode::BAD_GATEWAY));
        assert!(!is_transient_status(StatusCode::NOT_FOUND));
        assert!(!is_transient_status(StatusCode::BAD_REQUEST));
        assert!(!is_transient_status(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_endpoint_joins_path() {
        assert_eq!(
            HttpVerifierConfig::new("https://verify.example.com/").endpoint(),
            "https://verify.example.com/verify"
        );
        assert_eq!(
            HttpVerifierConfig::new("https://verify.example.com/api").endpoint(),
            "https://verify.example.com/api/verify"
        );
    }

    #[test]
    fn test_plain_http_only_for_loopback() {
        assert!(!HttpVerifierConfig::new("http://localhost:3000").https_only);
        assert!(!HttpVerifierConfig::new("http://127.0.0.1:8080").https_only);
        assert!(HttpVerifierConfig::new("https://verify.example.com").https_only);

        assert!(!HttpVerifierConfig::new("http://[::1]:8080/api").https_only);
        assert!(!HttpVerifierConfig::new("http://LOCALHOST:3000").https_only);

        let insecure = HttpVerifierConfig::new("http://verify.example.com");
        assert!(insecure.https_only);
        assert!(matches!(
            HttpVerifier::new(insecure),
            Err(BakeryError::VerificationError(_))
        ));
    }

    #[test]
    fn test_lookalike_hosts_are_not_loopback() {
        for url in [
            "http://localhost.evil.example",
            "http://127.0.0.1.nip.io.evil.example",
            "http://localhost@evil.example",
            "http://evil.example/http://localhost",
        ] {
            let config = HttpVerifierConfig::new(url);
            assert!(config.https_only, "{url}");
            assert!(HttpVerifier::new(config).is_err(), "{url}");
        }
    }

    #[test]
    fn test_request_body_shape() {
        let document = crate::document::tests::sample();
        let options = VerifyOptions::new("sepolia");
        let body = serde_json::to_value(VerifyRequest {
            document: &document,
            options: &options,
        })
        .unwrap();
        assert_eq!(body["options"]["network"], "sepolia");
        assert_eq!(body["document"]["signature"]["type"], "SHA3MerkleProof");
    }

    #[tokio::test]
    async fn test_unreachable_verifier_is_error() {
        let config = HttpVerifierConfig {
            max_retries: 0,
            timeout: Duration::from_millis(500),
            ..HttpVerifierConfig::new("http://127.0.0.1:9")
        };
        let verifier = HttpVerifier::new(config).unwrap();
        let err = verifier
            .verify(&crate::document::tests::sample(), &VerifyOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BakeryError::VerificationError(_)));
    }
}
