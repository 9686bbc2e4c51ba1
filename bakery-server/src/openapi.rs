//! OpenAPI documentation configuration

use axum::Json;
use utoipa::OpenApi;

use crate::handlers::{BakeResponse, ExtractResponse, HealthResponse, ReadyResponse, VerifyResponse};

/// Bakery API - OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bakery API",
        version = "0.1.0",
        description = r#"
Bake OpenAttestation documents into PNG images and verify them.

1. **Bake** a wrapped document into a PNG via `POST /bake`
2. Share the PNG; the document travels in an `open-attestation` iTXt chunk
3. **Extract** it back via `POST /extract`
4. **Verify** a baked image or bare document via `POST /verify`

A document is valid only when every verification fragment is `VALID`.
"#,
        license(name = "MIT OR Apache-2.0")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    tags(
        (name = "Baking", description = "Embed documents into PNG images and read them back"),
        (name = "Verification", description = "Check a document against the external verifier"),
        (name = "Health", description = "Service health and readiness endpoints")
    ),
    paths(
        crate::handlers::health::health,
        crate::handlers::health::ready,
        crate::handlers::bake::bake_handler,
        crate::handlers::extract::extract_handler,
        crate::handlers::verify::verify_handler,
    ),
    components(
        schemas(
            HealthResponse,
            ReadyResponse,
            BakeResponse,
            ExtractResponse,
            VerifyResponse,
        )
    )
)]
pub struct ApiDoc;

/// GET /api-docs/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
