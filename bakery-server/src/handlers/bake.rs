//! Bake handler
//!
//! Handles POST /bake: embeds a document into a PNG and returns the result
//! as a data URL.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bakery_core::{BakeMode, BakeSession};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::multipart::MultipartFields;
use crate::state::AppState;
use crate::validation::{DOCUMENT_CONTENT_TYPES, IMAGE_CONTENT_TYPES};

/// Response for a successful bake
#[derive(Serialize, ToSchema)]
pub struct BakeResponse {
    /// The baked PNG as `data:image/png;base64,...`
    pub data_url: String,
    /// SHA3-256 of the document's canonical JSON
    #[schema(example = "3f1c8a...")]
    pub document_id: String,
    /// Number of earlier payloads removed from the image
    #[schema(example = 0)]
    pub replaced: usize,
    /// Size of the baked PNG in bytes
    pub size: usize,
}

/// Bake a document into a PNG
///
/// Accepts multipart/form-data with:
/// - **image** (required): the PNG to bake into
/// - **document** (required): the wrapped attestation document (JSON)
/// - **append** (optional): `true` to keep existing payloads instead of replacing them
///
/// Pixel data and all other chunks are left untouched.
#[utoipa::path(
    post,
    path = "/bake",
    tag = "Baking",
    request_body(
        content_type = "multipart/form-data",
        description = "PNG image and document to bake"
    ),
    responses(
        (status = 200, description = "Image baked", body = BakeResponse),
        (status = 400, description = "Missing or duplicate file, or image is not a PNG"),
        (status = 422, description = "Corrupted PNG or malformed document")
    )
)]
pub async fn bake_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<BakeResponse>, ApiError> {
    let mut fields =
        MultipartFields::parse(&mut multipart, &["image", "document"], state.max_file_size).await?;

    let image = fields.take_single("image", IMAGE_CONTENT_TYPES)?;
    let document = fields.take_single("document", DOCUMENT_CONTENT_TYPES)?;
    let mode = if fields.get_bool("append") {
        BakeMode::Append
    } else {
        BakeMode::Replace
    };

    let mut session = BakeSession::new();
    session.select_image(vec![image])?;
    let document_id = session
        .select_document(vec![document])
        .map_err(ApiError::uploaded_document)?;
    let baked = session.bake(mode)?;

    tracing::info!(
        document_id = document_id.short(),
        size = baked.bytes.len(),
        replaced = baked.replaced,
        "Baked document into image"
    );

    Ok(Json(BakeResponse {
        data_url: baked.to_data_url(),
        document_id: document_id.to_string(),
        replaced: baked.replaced,
        size: baked.bytes.len(),
    }))
}
