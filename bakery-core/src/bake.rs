//! Baking documents into PNG images and extracting them again.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use tracing::{debug, info};

use crate::document::WrappedDocument;
use crate::error::{BakeryError, Result};
use crate::png::{get_text, remove_text, set_text, PngBuffer};

/// The iTXt keyword under which documents are stored.
pub const KEYWORD: &str = "open-attestation";

/// MIME type of baked output.
pub const PNG_MIME: &str = "image/png";

const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// What to do with a document already baked into the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BakeMode {
    /// Drop existing `open-attestation` chunks before inserting the new one.
    #[default]
    Replace,
    /// Keep existing chunks. Lookups are first-match, so the oldest document
    /// stays the one that gets extracted.
    Append,
}

/// A baked PNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BakedImage {
    pub bytes: Vec<u8>,
    /// Number of previously baked chunks dropped by [`BakeMode::Replace`].
    pub replaced: usize,
}

impl BakedImage {
    /// Encode as a `data:image/png;base64,` URL for display or download.
    pub fn to_data_url(&self) -> String {
        to_data_url(&self.bytes)
    }
}

/// Bake `document` into `image`, replacing any earlier baked document.
pub fn bake(image: &[u8], document: &WrappedDocument) -> Result<BakedImage> {
    bake_with_mode(image, document, BakeMode::default())
}

/// Bake `document` into `image` using the given mode.
pub fn bake_with_mode(
    image: &[u8],
    document: &WrappedDocument,
    mode: BakeMode,
) -> Result<BakedImage> {
    let json = document.to_canonical_json()?;
    bake_text(image, &json, mode)
}

/// Bake an already-serialized document string.
pub fn bake_text(image: &[u8], json: &str, mode: BakeMode) -> Result<BakedImage> {
    let png = PngBuffer::parse(image)?;

    let (png, replaced) = match mode {
        BakeMode::Replace => remove_text(&png, KEYWORD)?,
        BakeMode::Append => (png, 0),
    };
    if replaced > 0 {
        debug!(replaced, "Dropped previously baked document");
    }

    let png = set_text(&png, KEYWORD, json)?;
    let bytes = png.to_bytes();

    info!(
        input_bytes = image.len(),
        output_bytes = bytes.len(),
        mode = ?mode,
        "Baked document into image"
    );
    Ok(BakedImage { bytes, replaced })
}

/// Recover the raw document text baked into `image`.
pub fn extract_text(image: &[u8]) -> Result<String> {
    let png = PngBuffer::parse(image)?;
    get_text(&png, KEYWORD)
}

/// Recover and parse the document baked into `image`.
///
/// Fails with `NotFound` when nothing is baked in and `ParseError` when the
/// embedded text is not a JSON object.
pub fn extract(image: &[u8]) -> Result<WrappedDocument> {
    let text = extract_text(image)?;
    let document = WrappedDocument::from_json_str(&text)?;
    info!(
        bytes = text.len(),
        format = %document.format(),
        "Extracted document from image"
    );
    Ok(document)
}

/// Encode PNG bytes as a data URL.
pub fn to_data_url(bytes: &[u8]) -> String {
    let mut url = String::with_capacity(DATA_URL_PREFIX.len() + bytes.len().div_ceil(3) * 4);
    url.push_str(DATA_URL_PREFIX);
    BASE64.encode_string(bytes, &mut url);
    url
}

/// Decode a `data:image/png;base64,` URL back to bytes.
pub fn from_data_url(url: &str) -> Result<Vec<u8>> {
    let payload = url
        .strip_prefix(DATA_URL_PREFIX)
        .ok_or_else(|| BakeryError::format("expected a data:image/png;base64 URL"))?;
    BASE64
        .decode(payload.trim())
        .map_err(|e| BakeryError::format(format!("invalid base64 in data URL: {e}")))
}
