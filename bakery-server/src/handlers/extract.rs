//! Extract handler
//!
//! Handles POST /extract: returns the document baked into a PNG.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bakery_core::{extract, from_data_url, WrappedDocument};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::multipart::MultipartFields;
use crate::state::AppState;
use crate::validation::IMAGE_CONTENT_TYPES;

/// Response for a successful extraction
#[derive(Serialize, ToSchema)]
pub struct ExtractResponse {
    /// The embedded wrapped document
    #[schema(value_type = Object)]
    pub document: WrappedDocument,
    /// SHA3-256 of the document's canonical JSON
    pub document_id: String,
}

/// Extract the embedded document from a baked PNG
///
/// Accepts multipart/form-data with either:
/// - **file**: the baked PNG, or
/// - **data_url**: the baked PNG as a `data:image/png;base64,` URL
#[utoipa::path(
    post,
    path = "/extract",
    tag = "Baking",
    request_body(
        content_type = "multipart/form-data",
        description = "Baked PNG as a file or data URL"
    ),
    responses(
        (status = 200, description = "Document extracted", body = ExtractResponse),
        (status = 400, description = "Missing input, bad data URL, or not a PNG"),
        (status = 404, description = "Image carries no embedded document"),
        (status = 422, description = "Corrupted PNG or embedded document is not a JSON object")
    )
)]
pub async fn extract_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, ApiError> {
    let mut fields = MultipartFields::parse(&mut multipart, &["file"], state.max_file_size).await?;

    let data_url = fields.get_text("data_url").map(str::to_string);
    let bytes = match data_url {
        Some(url) if fields.file_count("file") == 0 => {
            from_data_url(url.trim()).map_err(ApiError::data_url)?
        }
        _ => fields.take_single("file", IMAGE_CONTENT_TYPES)?.bytes,
    };

    let document = extract(&bytes)?;
    let document_id = document.id()?;
    tracing::debug!(document_id = document_id.short(), "Extracted document");

    Ok(Json(ExtractResponse {
        document,
        document_id: document_id.to_string(),
    }))
}
