//! Chunk stream parsing and serialization.
//!
//! PNG data is a fixed 8-byte signature followed by chunks. Each chunk is a
//! 4-byte big-endian data length, a 4-byte type tag, the data itself, and a
//! CRC-32 over type and data. The `IEND` chunk terminates the stream.
//!
//! Everything here is in-memory and non-mutating: operations that "change"
//! a chunk list return a new one.

use tracing::debug;

use super::chunk::{Chunk, ChunkType};
use crate::error::{BakeryError, Result, MAX_CHUNK_LENGTH};

/// The PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Where to place a new chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertPosition {
    /// Immediately before `IEND`, or at the end when there is none.
    #[default]
    BeforeEnd,
    /// At a fixed index, clamped to the list length.
    At(usize),
}

/// Returns true if `bytes` starts with the PNG signature.
pub fn has_png_signature(bytes: &[u8]) -> bool {
    bytes.len() >= PNG_SIGNATURE.len() && bytes[..PNG_SIGNATURE.len()] == PNG_SIGNATURE
}

/// Parse the chunk stream of a PNG buffer up to and including `IEND`.
///
/// Every chunk's CRC is verified. Bytes after `IEND` are ignored; use
/// [`PngBuffer::parse`] to keep them.
pub fn parse_chunks(bytes: &[u8]) -> Result<Vec<Chunk>> {
    parse_with_trailer(bytes).map(|(chunks, _)| chunks)
}

fn parse_with_trailer(bytes: &[u8]) -> Result<(Vec<Chunk>, &[u8])> {
    if !has_png_signature(bytes) {
        return Err(BakeryError::format("not a PNG: signature mismatch"));
    }

    let mut chunks = Vec::new();
    let mut offset = PNG_SIGNATURE.len();

    while offset < bytes.len() {
        let remaining = &bytes[offset..];
        if remaining.len() < 8 {
            return Err(BakeryError::format(format!(
                "truncated chunk header at offset {offset}"
            )));
        }

        let length = u32::from_be_bytes([remaining[0], remaining[1], remaining[2], remaining[3]]);
        if length > MAX_CHUNK_LENGTH {
            return Err(BakeryError::format(format!(
                "chunk length {length} at offset {offset} exceeds PNG maximum"
            )));
        }
        let chunk_type = ChunkType::new([remaining[4], remaining[5], remaining[6], remaining[7]])?;

        let data_end = 8 + length as usize;
        if remaining.len() < data_end + 4 {
            return Err(BakeryError::format(format!(
                "{chunk_type} chunk declares {length} bytes but only {} remain",
                remaining.len().saturating_sub(12)
            )));
        }

        let data = remaining[8..data_end].to_vec();
        let stored_crc = u32::from_be_bytes([
            remaining[data_end],
            remaining[data_end + 1],
            remaining[data_end + 2],
            remaining[data_end + 3],
        ]);
        let chunk = Chunk::from_stored(chunk_type, data, stored_crc)?;

        offset += chunk.encoded_len();
        chunks.push(chunk);

        if chunk_type == ChunkType::IEND {
            break;
        }
    }

    debug!(chunks = chunks.len(), trailer = bytes.len() - offset, "Parsed PNG chunk stream");
    Ok((chunks, &bytes[offset..]))
}

/// Return the first chunk with the given type.
pub fn find_chunk(chunks: &[Chunk], chunk_type: ChunkType) -> Option<&Chunk> {
    chunks.iter().find(|c| c.chunk_type() == chunk_type)
}

/// Write `signature` followed by every chunk, recomputing CRCs.
pub fn serialize_chunks(signature: &[u8; 8], chunks: &[Chunk]) -> Vec<u8> {
    let size = signature.len() + chunks.iter().map(Chunk::encoded_len).sum::<usize>();
    let mut out = Vec::with_capacity(size);
    out.extend_from_slice(signature);
    for chunk in chunks {
        chunk.write_to(&mut out);
    }
    out
}

/// Return a copy of `chunks` with `chunk` inserted at `position`.
pub fn insert_chunk(chunks: &[Chunk], chunk: Chunk, position: InsertPosition) -> Vec<Chunk> {
    let index = match position {
        InsertPosition::BeforeEnd => chunks
            .iter()
            .position(|c| c.chunk_type() == ChunkType::IEND)
            .unwrap_or(chunks.len()),
        InsertPosition::At(index) => index.min(chunks.len()),
    };

    let mut out = Vec::with_capacity(chunks.len() + 1);
    out.extend_from_slice(&chunks[..index]);
    out.push(chunk);
    out.extend_from_slice(&chunks[index..]);
    out
}

/// Return a copy of `chunks` without any chunk of `chunk_type`, and how many were dropped.
pub fn remove_chunks(chunks: &[Chunk], chunk_type: ChunkType) -> (Vec<Chunk>, usize) {
    remove_chunks_where(chunks, |c| c.chunk_type() == chunk_type)
}

pub(crate) fn remove_chunks_where(
    chunks: &[Chunk],
    predicate: impl Fn(&Chunk) -> bool,
) -> (Vec<Chunk>, usize) {
    let kept: Vec<Chunk> = chunks.iter().filter(|c| !predicate(c)).cloned().collect();
    let removed = chunks.len() - kept.len();
    (kept, removed)
}

/// A parsed PNG: its chunks plus any bytes found after `IEND`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngBuffer {
    chunks: Vec<Chunk>,
    trailer: Vec<u8>,
}

impl PngBuffer {
    /// Parse a full PNG byte buffer.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let (chunks, trailer) = parse_with_trailer(bytes)?;
        Ok(Self {
            chunks,
            trailer: trailer.to_vec(),
        })
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Bytes that followed `IEND` in the source buffer.
    pub fn trailer(&self) -> &[u8] {
        &self.trailer
    }

    pub fn find_chunk(&self, chunk_type: ChunkType) -> Option<&Chunk> {
        find_chunk(&self.chunks, chunk_type)
    }

    /// Iterate over every chunk of `chunk_type`, in stream order.
    pub fn chunks_of_type(&self, chunk_type: ChunkType) -> impl Iterator<Item = &Chunk> {
        self.chunks
            .iter()
            .filter(move |c| c.chunk_type() == chunk_type)
    }

    pub fn with_chunk(&self, chunk: Chunk, position: InsertPosition) -> Self {
        Self {
            chunks: insert_chunk(&self.chunks, chunk, position),
            trailer: self.trailer.clone(),
        }
    }

    pub fn without_chunks(&self, chunk_type: ChunkType) -> (Self, usize) {
        self.without_chunks_where(|c| c.chunk_type() == chunk_type)
    }

    pub(crate) fn without_chunks_where(&self, predicate: impl Fn(&Chunk) -> bool) -> (Self, usize) {
        let (chunks, removed) = remove_chunks_where(&self.chunks, predicate);
        (
            Self {
                chunks,
                trailer: self.trailer.clone(),
            },
            removed,
        )
    }

    /// Serialize back to bytes. Unmodified buffers round-trip byte for byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = serialize_chunks(&PNG_SIGNATURE, &self.chunks);
        out.extend_from_slice(&self.trailer);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_png() -> Vec<u8> {
        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&1u32.to_be_bytes());
        ihdr.extend_from_slice(&1u32.to_be_bytes());
        ihdr.extend_from_slice(&[8, 0, 0, 0, 0]);
        let chunks = vec![
            Chunk::new(ChunkType::IHDR, ihdr),
            Chunk::new(ChunkType::IDAT, vec![0x78, 0x9c, 0x63, 0x60, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01]),
            Chunk::new(ChunkType::IEND, Vec::new()),
        ];
        serialize_chunks(&PNG_SIGNATURE, &chunks)
    }

    #[test]
    fn test_parse_minimal() {
        let chunks = parse_chunks(&minimal_png()).unwrap();
        let types: Vec<_> = chunks.iter().map(|c| c.chunk_type()).collect();
        assert_eq!(types, [ChunkType::IHDR, ChunkType::IDAT, ChunkType::IEND]);
    }

    #[test]
    fn test_reserialize_is_identical() {
        let bytes = minimal_png();
        let chunks = parse_chunks(&bytes).unwrap();
        assert_eq!(serialize_chunks(&PNG_SIGNATURE, &chunks), bytes);
    }

    #[test]
    fn test_signature_mismatch() {
        let mut bytes = minimal_png();
        bytes[1] = b'J';
        let err = parse_chunks(&bytes).unwrap_err();
        assert!(matches!(err, BakeryError::FormatError(_)));

        assert!(parse_chunks(b"").is_err());
        assert!(parse_chunks(b"GIF89a").is_err());
    }

    #[test]
    fn test_truncated_length_field() {
        let mut bytes = minimal_png();
        bytes.truncate(PNG_SIGNATURE.len() + 3);
        let err = parse_chunks(&bytes).unwrap_err();
        assert!(err.to_string().contains("truncated chunk header"));
    }

    #[test]
    fn test_declared_length_exceeds_buffer() {
        let mut bytes = minimal_png();
        // Bump the IHDR length from 13 to 200.
        bytes[8..12].copy_from_slice(&200u32.to_be_bytes());
        let err = parse_chunks(&bytes).unwrap_err();
        assert!(err.to_string().contains("declares 200 bytes"));
    }

    #[test]
    fn test_flipped_data_byte_is_checksum_error() {
        let mut bytes = minimal_png();
        // First IHDR data byte.
        bytes[16] ^= 0x01;
        let err = parse_chunks(&bytes).unwrap_err();
        assert!(matches!(
            err,
            BakeryError::ChecksumMismatch { ref chunk_type, .. } if chunk_type == "IHDR"
        ));
    }

    #[test]
    fn test_signature_only_has_no_chunks() {
        assert!(parse_chunks(&PNG_SIGNATURE).unwrap().is_empty());
    }

    #[test]
    fn test_insert_before_end() {
        let chunks = parse_chunks(&minimal_png()).unwrap();
        let text = Chunk::new(ChunkType::iTXt, b"k\0\0\0\0\0v".to_vec());
        let out = insert_chunk(&chunks, text.clone(), InsertPosition::BeforeEnd);

        assert_eq!(out.len(), 4);
        assert_eq!(out[2], text);
        assert_eq!(out[3].chunk_type(), ChunkType::IEND);
        // Source untouched.
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_insert_without_iend_appends() {
        let chunks = vec![Chunk::new(ChunkType::IHDR, vec![0; 13])];
        let out = insert_chunk(&chunks, Chunk::new(ChunkType::iTXt, vec![]), InsertPosition::BeforeEnd);
        assert_eq!(out[1].chunk_type(), ChunkType::iTXt);
    }

    #[test]
    fn test_insert_at_clamps() {
        let chunks = parse_chunks(&minimal_png()).unwrap();
        let out = insert_chunk(&chunks, Chunk::new(ChunkType::tEXt, vec![]), InsertPosition::At(99));
        assert_eq!(out.last().unwrap().chunk_type(), ChunkType::tEXt);

        let out = insert_chunk(&chunks, Chunk::new(ChunkType::tEXt, vec![]), InsertPosition::At(1));
        assert_eq!(out[1].chunk_type(), ChunkType::tEXt);
    }

    #[test]
    fn test_remove_chunks_counts() {
        let chunks = parse_chunks(&minimal_png()).unwrap();
        let chunks = insert_chunk(&chunks, Chunk::new(ChunkType::iTXt, vec![1]), InsertPosition::BeforeEnd);
        let chunks = insert_chunk(&chunks, Chunk::new(ChunkType::iTXt, vec![2]), InsertPosition::BeforeEnd);

        let (out, removed) = remove_chunks(&chunks, ChunkType::iTXt);
        assert_eq!(removed, 2);
        assert!(find_chunk(&out, ChunkType::iTXt).is_none());

        let (_, removed) = remove_chunks(&out, ChunkType::iTXt);
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_find_returns_first() {
        let chunks = parse_chunks(&minimal_png()).unwrap();
        let chunks = insert_chunk(&chunks, Chunk::new(ChunkType::iTXt, vec![1]), InsertPosition::BeforeEnd);
        let chunks = insert_chunk(&chunks, Chunk::new(ChunkType::iTXt, vec![2]), InsertPosition::BeforeEnd);
        assert_eq!(find_chunk(&chunks, ChunkType::iTXt).unwrap().data(), &[1]);
        assert!(find_chunk(&chunks, ChunkType::zTXt).is_none());
    }

    #[test]
    fn test_trailer_preserved() {
        let mut bytes = minimal_png();
        bytes.extend_from_slice(b"trailing garbage");

        let png = PngBuffer::parse(&bytes).unwrap();
        assert_eq!(png.trailer(), b"trailing garbage");
        assert_eq!(png.to_bytes(), bytes);
    }
}
