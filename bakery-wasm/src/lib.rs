//! WebAssembly bindings for baking and extraction.
//!
//! Everything runs client side: the image never leaves the browser. The
//! page calls the external verifier itself and hands the fragments to
//! [`is_valid_wasm`].
//!
//! Every entry point returns a JSON string. Failures are reported in an
//! `error` field rather than thrown.

use bakery_core::{
    bake_with_mode, extract, from_data_url, BakeMode, BakeryError, ErrorKind, Verdict,
    VerificationFragment, WrappedDocument,
};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Result of baking.
#[derive(Serialize, Default)]
pub struct BakeResult {
    /// `data:image/png;base64,...` for display and download
    pub data_url: Option<String>,
    /// Content id of the baked document
    pub document_id: Option<String>,
    /// Number of earlier documents replaced
    pub replaced: usize,
    pub error: Option<ErrorBody>,
}

/// Result of extraction.
#[derive(Serialize, Default)]
pub struct ExtractResult {
    pub document: Option<Value>,
    pub document_id: Option<String>,
    pub error: Option<ErrorBody>,
}

/// Result of validity aggregation.
#[derive(Serialize)]
pub struct ValidityResult {
    pub valid: bool,
    pub verdict: Option<Verdict>,
    pub error: Option<ErrorBody>,
}

/// Error reported to the page.
#[derive(Serialize)]
pub struct ErrorBody {
    /// One of `format`, `not_found`, `parse`, `verification`
    pub kind: &'static str,
    pub message: String,
}

impl From<BakeryError> for ErrorBody {
    fn from(err: BakeryError) -> Self {
        let kind = match err.kind() {
            ErrorKind::Format => "format",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Parse => "parse",
            ErrorKind::Verification => "verification",
        };
        log_error(&err.to_string());
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn log_error(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
fn log_error(_message: &str) {}

fn to_json<T: Serialize>(result: &T) -> String {
    serde_json::to_string(result).unwrap_or_else(|e| {
        format!(
            r#"{{"error":{{"kind":"format","message":"Serialization error: {}"}}}}"#,
            e.to_string().replace('"', "'")
        )
    })
}

/// Bake a document into a PNG image.
///
/// # Arguments
/// * `image_bytes` - The PNG file content
/// * `document_json` - The wrapped document as JSON text
/// * `append` - Keep previously baked documents instead of replacing them
///
/// # Returns
/// A JSON string with `data_url`, `document_id` and `replaced`, or `error`
#[wasm_bindgen]
pub fn bake_wasm(image_bytes: &[u8], document_json: &str, append: bool) -> String {
    let result = bake_internal(image_bytes, document_json, append).unwrap_or_else(|e| BakeResult {
        error: Some(e.into()),
        ..Default::default()
    });
    to_json(&result)
}

fn bake_internal(
    image_bytes: &[u8],
    document_json: &str,
    append: bool,
) -> Result<BakeResult, BakeryError> {
    let document = WrappedDocument::from_json_str(document_json)?;
    let mode = if append {
        BakeMode::Append
    } else {
        BakeMode::Replace
    };
    let baked = bake_with_mode(image_bytes, &document, mode)?;
    Ok(BakeResult {
        data_url: Some(baked.to_data_url()),
        document_id: Some(document.id()?.to_string()),
        replaced: baked.replaced,
        error: None,
    })
}

/// Extract the document baked into a PNG image.
#[wasm_bindgen]
pub fn extract_wasm(image_bytes: &[u8]) -> String {
    to_json(&extract_result(extract_internal(image_bytes)))
}

/// Extract the document from a `data:image/png;base64,` URL.
#[wasm_bindgen]
pub fn extract_data_url_wasm(data_url: &str) -> String {
    let result = from_data_url(data_url).and_then(|bytes| extract_internal(&bytes));
    to_json(&extract_result(result))
}

fn extract_internal(image_bytes: &[u8]) -> Result<ExtractResult, BakeryError> {
    let document = extract(image_bytes)?;
    let id = document.id()?;
    let value = serde_json::to_value(&document)
        .map_err(|e| BakeryError::ParseError(format!("failed to serialize document: {e}")))?;
    Ok(ExtractResult {
        document: Some(value),
        document_id: Some(id.to_string()),
        error: None,
    })
}

fn extract_result(result: Result<ExtractResult, BakeryError>) -> ExtractResult {
    result.unwrap_or_else(|e| ExtractResult {
        error: Some(e.into()),
        ..Default::default()
    })
}

/// Reduce verifier fragments (a JSON array) to a pass/fail decision.
///
/// An empty array is not valid.
#[wasm_bindgen]
pub fn is_valid_wasm(fragments_json: &str) -> String {
    let result = match serde_json::from_str::<Vec<VerificationFragment>>(fragments_json) {
        Ok(fragments) => ValidityResult {
            valid: bakery_core::is_valid(&fragments),
            verdict: Some(Verdict::from_fragments(&fragments)),
            error: None,
        },
        Err(e) => ValidityResult {
            valid: false,
            verdict: None,
            error: Some(BakeryError::ParseError(format!("invalid fragments: {e}")).into()),
        },
    };
    to_json(&result)
}

/// Get the library version.
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
