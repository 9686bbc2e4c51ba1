//! International text (`iTXt`) chunk codec.
//!
//! Layout of the chunk data:
//!
//! ```text
//! keyword (1-79 bytes Latin-1) 0x00
//! compression flag (1 byte) | compression method (1 byte)
//! language tag (ASCII) 0x00
//! translated keyword (UTF-8) 0x00
//! text (UTF-8, zlib-compressed when the flag is 1)
//! ```
//!
//! The writer never compresses. The reader inflates method 0 (zlib) and
//! reports any other method as unsupported.

use tracing::debug;

use super::chunk::{check_data_length, Chunk, ChunkType};
use super::codec::{InsertPosition, PngBuffer};
use crate::error::{BakeryError, Result};

/// Longest keyword permitted by the PNG specification.
pub const MAX_KEYWORD_LEN: usize = 79;

/// Upper bound on inflated text, guarding against zlib bombs.
pub const MAX_INFLATED_TEXT: usize = 64 * 1024 * 1024;

/// Decoded contents of an `iTXt` chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunkPayload {
    pub keyword: String,
    /// Whether the text was stored compressed. Ignored on encode.
    pub compressed: bool,
    pub compression_method: u8,
    pub language_tag: String,
    pub translated_keyword: String,
    pub text: String,
}

impl TextChunkPayload {
    /// An uncompressed payload with empty language tag and translated keyword.
    pub fn new(keyword: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            compressed: false,
            compression_method: 0,
            language_tag: String::new(),
            translated_keyword: String::new(),
            text: text.into(),
        }
    }

    /// Encode into an `iTXt` chunk. The compression flag is always written as 0.
    pub fn encode(&self) -> Result<Chunk> {
        let keyword = encode_keyword(&self.keyword)?;
        if !self.language_tag.is_ascii() || self.language_tag.contains('\0') {
            return Err(BakeryError::format(format!(
                "language tag {:?} must be ASCII without NUL",
                self.language_tag
            )));
        }
        if self.translated_keyword.contains('\0') {
            return Err(BakeryError::format("translated keyword contains NUL"));
        }

        let len = [
            keyword.len(),
            self.language_tag.len(),
            self.translated_keyword.len(),
            self.text.len(),
            5,
        ]
        .iter()
        .try_fold(0usize, |acc, n| acc.checked_add(*n))
        .ok_or_else(|| BakeryError::format("iTXt chunk data too long"))?;
        check_data_length(len)?;

        let mut data = Vec::with_capacity(len);
        data.extend_from_slice(&keyword);
        data.push(0);
        data.push(0); // compression flag
        data.push(0); // compression method
        data.extend_from_slice(self.language_tag.as_bytes());
        data.push(0);
        data.extend_from_slice(self.translated_keyword.as_bytes());
        data.push(0);
        data.extend_from_slice(self.text.as_bytes());

        Ok(Chunk::new(ChunkType::iTXt, data))
    }

    /// Decode the data field of an `iTXt` chunk.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let (keyword, rest) = split_nul(data, "keyword")?;
        if keyword.is_empty() || keyword.len() > MAX_KEYWORD_LEN {
            return Err(BakeryError::format(format!(
                "iTXt keyword length {} outside 1..={MAX_KEYWORD_LEN}",
                keyword.len()
            )));
        }

        let [flag, method, rest @ ..] = rest else {
            return Err(BakeryError::format("iTXt chunk is missing compression fields"));
        };
        let compressed = match *flag {
            0 => false,
            1 => true,
            other => {
                return Err(BakeryError::format(format!(
                    "invalid iTXt compression flag {other}"
                )))
            }
        };

        let (language_tag, rest) = split_nul(rest, "language tag")?;
        let (translated_keyword, text) = split_nul(rest, "translated keyword")?;

        let text = if compressed {
            if *method != 0 {
                return Err(BakeryError::UnsupportedCompression(*method));
            }
            miniz_oxide::inflate::decompress_to_vec_zlib_with_limit(text, MAX_INFLATED_TEXT)
                .map_err(|e| {
                    BakeryError::format(format!("failed to inflate iTXt text: {:?}", e.status))
                })?
        } else {
            text.to_vec()
        };

        Ok(Self {
            keyword: latin1_to_string(keyword),
            compressed,
            compression_method: *method,
            language_tag: utf8_field(language_tag.to_vec(), "language tag")?,
            translated_keyword: utf8_field(translated_keyword.to_vec(), "translated keyword")?,
            text: utf8_field(text, "text")?,
        })
    }
}

/// Read the text stored under `keyword`. First match wins.
pub fn get_text(png: &PngBuffer, keyword: &str) -> Result<String> {
    let wanted = encode_keyword(keyword)?;
    let chunk = png
        .chunks_of_type(ChunkType::iTXt)
        .find(|c| chunk_keyword(c.data()) == Some(wanted.as_slice()))
        .ok_or_else(|| BakeryError::NotFound(keyword.to_string()))?;

    let payload = TextChunkPayload::decode(chunk.data())?;
    debug!(keyword, bytes = payload.text.len(), compressed = payload.compressed, "Read iTXt text");
    Ok(payload.text)
}

/// Return a new buffer with an uncompressed `iTXt` chunk inserted before `IEND`.
///
/// Existing chunks with the same keyword are kept; see [`remove_text`].
pub fn set_text(png: &PngBuffer, keyword: &str, text: &str) -> Result<PngBuffer> {
    let chunk = TextChunkPayload::new(keyword, text).encode()?;
    debug!(keyword, bytes = text.len(), "Inserting iTXt chunk");
    Ok(png.with_chunk(chunk, InsertPosition::BeforeEnd))
}

/// Return a new buffer without any `iTXt` chunk carrying `keyword`, and the count removed.
pub fn remove_text(png: &PngBuffer, keyword: &str) -> Result<(PngBuffer, usize)> {
    let wanted = encode_keyword(keyword)?;
    Ok(png.without_chunks_where(|c| {
        c.chunk_type() == ChunkType::iTXt && chunk_keyword(c.data()) == Some(wanted.as_slice())
    }))
}

/// Decode every `iTXt` chunk, in stream order.
pub fn text_entries(png: &PngBuffer) -> Result<Vec<TextChunkPayload>> {
    png.chunks_of_type(ChunkType::iTXt)
        .map(|c| TextChunkPayload::decode(c.data()))
        .collect()
}

/// The raw keyword bytes of an `iTXt` data field, if terminated.
fn chunk_keyword(data: &[u8]) -> Option<&[u8]> {
    data.iter().position(|&b| b == 0).map(|nul| &data[..nul])
}

fn split_nul<'a>(data: &'a [u8], field: &str) -> Result<(&'a [u8], &'a [u8])> {
    let nul = data
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| BakeryError::format(format!("iTXt {field} is not NUL-terminated")))?;
    Ok((&data[..nul], &data[nul + 1..]))
}

fn utf8_field(bytes: Vec<u8>, field: &str) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|e| BakeryError::format(format!("iTXt {field} is not valid UTF-8: {e}")))
}

fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Validate a keyword and encode it as Latin-1.
///
/// Keywords are 1-79 printable Latin-1 characters with no leading, trailing
/// or consecutive spaces.
fn encode_keyword(keyword: &str) -> Result<Vec<u8>> {
    let invalid = |reason: &str| BakeryError::InvalidKeyword(format!("{keyword:?}: {reason}"));

    let bytes = keyword
        .chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA1..=0xFF => Ok(c as u32 as u8),
            _ => Err(invalid("characters must be printable Latin-1")),
        })
        .collect::<Result<Vec<u8>>>()?;

    if bytes.is_empty() || bytes.len() > MAX_KEYWORD_LEN {
        return Err(invalid("length must be 1-79"));
    }
    if bytes.first() == Some(&b' ') || bytes.last() == Some(&b' ') {
        return Err(invalid("leading or trailing space"));
    }
    if bytes.windows(2).any(|w| w == b"  ") {
        return Err(invalid("consecutive spaces"));
    }
    Ok(bytes)
}
