//! Verification handler
//!
//! Handles POST /verify: runs the verifier on a baked image or a bare
//! document and reduces the fragments to a verdict.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use bakery_core::png::has_png_signature;
use bakery_core::{
    DocumentVerifier, MockOutcome, VerificationFragment, VerifierFactory, Verdict, VerifyOptions,
    VerifySession, WrappedDocument,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::multipart::MultipartFields;
use crate::state::AppState;
use crate::validation::ANY_CONTENT_TYPES;

/// Response for verification
#[derive(Serialize, ToSchema)]
pub struct VerifyResponse {
    /// True only when every fragment is VALID
    #[schema(example = true)]
    pub valid: bool,
    /// Summary of the verification
    #[schema(value_type = Object)]
    pub verdict: Verdict,
    /// Raw fragments returned by the verifier
    #[schema(value_type = Vec<Object>)]
    pub fragments: Vec<VerificationFragment>,
    /// SHA3-256 of the document's canonical JSON
    pub document_id: String,
    /// Network the document was checked against
    #[schema(example = "sepolia")]
    pub network: String,
    /// Name of the verifier that produced the fragments
    #[schema(example = "http")]
    pub verifier: String,
    /// RFC 3339 time the fragments were recorded
    pub checked_at: Option<String>,
}

/// Verify an attestation document
///
/// Accepts multipart/form-data with:
/// - **file** (required): a baked PNG or the document JSON itself
/// - **network** (optional): overrides the server's default network
/// - **mock** (optional, test deployments only): `valid`, `invalid` or `unreachable`
///
/// A completed verification always returns 200; check `valid`.
#[utoipa::path(
    post,
    path = "/verify",
    tag = "Verification",
    request_body(
        content_type = "multipart/form-data",
        description = "Baked PNG or document JSON"
    ),
    responses(
        (status = 200, description = "Verification completed", body = VerifyResponse),
        (status = 400, description = "Missing or duplicate file, or not a PNG"),
        (status = 404, description = "Image carries no embedded document"),
        (status = 422, description = "Corrupted PNG or malformed document"),
        (status = 503, description = "No verifier configured or verifier unreachable")
    )
)]
pub async fn verify_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<VerifyResponse>, ApiError> {
    let mut fields = MultipartFields::parse(&mut multipart, &["file"], state.max_file_size).await?;

    let upload = fields.take_single("file", ANY_CONTENT_TYPES)?;
    let options = match fields.get_text("network").map(str::trim) {
        Some(network) if !network.is_empty() => VerifyOptions::new(network),
        _ => state.options.clone(),
    };
    let verifier = select_verifier(&state, fields.get_text("mock"))?;

    let mut session = VerifySession::new();
    if has_png_signature(&upload.bytes) {
        session.load_baked_image(vec![upload])?;
    } else {
        let document = WrappedDocument::from_json_slice(&upload.bytes)
            .map_err(ApiError::uploaded_document)?;
        session.load_document(document)?;
    }

    let verdict = session.verify_with(verifier.as_ref(), &options).await?;
    let document_id = session
        .document_id()
        .cloned()
        .ok_or_else(|| ApiError::internal("document missing after verification"))?;

    tracing::info!(
        document_id = document_id.short(),
        verifier = verifier.name(),
        network = %options.network,
        valid = verdict.is_valid(),
        "Verification completed"
    );

    Ok(Json(VerifyResponse {
        valid: verdict.is_valid(),
        verdict,
        fragments: session.fragments().to_vec(),
        document_id: document_id.to_string(),
        network: options.network,
        verifier: verifier.name().to_string(),
        checked_at: session.checked_at().map(|t| t.to_rfc3339()),
    }))
}

fn select_verifier(
    state: &AppState,
    mock: Option<&str>,
) -> Result<Arc<dyn DocumentVerifier>, ApiError> {
    if let Some(mock) = mock {
        if !state.allow_mock_verifier {
            return Err(ApiError::bad_request("Mock verifier is disabled on this server"));
        }
        let outcome = match mock.trim().to_lowercase().as_str() {
            "valid" => MockOutcome::Valid,
            "invalid" => MockOutcome::Invalid,
            "unreachable" => MockOutcome::Unreachable,
            other => {
                return Err(ApiError::bad_request(format!(
                    "Unknown mock outcome '{}'. Use valid, invalid or unreachable",
                    other
                )))
            }
        };
        return Ok(VerifierFactory::create_mock(outcome));
    }

    state.verifier.clone().ok_or_else(|| {
        ApiError::service_unavailable("No verifier configured (set BAKERY_VERIFIER_URL)")
    })
}
