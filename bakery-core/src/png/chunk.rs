//! Raw PNG chunk records and their CRC-32.

use std::fmt;

use crc::{Crc, CRC_32_ISO_HDLC};

use crate::error::{BakeryError, Result, MAX_CHUNK_LENGTH};

/// The CRC-32 variant mandated by the PNG specification (ISO 3309 / ITU-T V.42).
const PNG_CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Compute the chunk CRC over `type ++ data`.
pub fn chunk_crc(chunk_type: &ChunkType, data: &[u8]) -> u32 {
    let mut digest = PNG_CRC.digest();
    digest.update(&chunk_type.0);
    digest.update(data);
    digest.finalize()
}

/// Reject data too long for the 31-bit chunk length field.
pub(crate) fn check_data_length(len: usize) -> Result<()> {
    if len > MAX_CHUNK_LENGTH as usize {
        return Err(BakeryError::format(format!(
            "chunk data of {len} bytes exceeds the PNG limit of {MAX_CHUNK_LENGTH}"
        )));
    }
    Ok(())
}

/// A four-letter chunk type tag.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkType([u8; 4]);

#[allow(nonstandard_style)]
impl ChunkType {
    pub const IHDR: Self = Self(*b"IHDR");
    pub const PLTE: Self = Self(*b"PLTE");
    pub const IDAT: Self = Self(*b"IDAT");
    pub const IEND: Self = Self(*b"IEND");
    pub const iTXt: Self = Self(*b"iTXt");
    pub const tEXt: Self = Self(*b"tEXt");
    pub const zTXt: Self = Self(*b"zTXt");

    /// Build a chunk type, rejecting anything that is not four ASCII letters.
    pub fn new(bytes: [u8; 4]) -> Result<Self> {
        if bytes.iter().all(u8::is_ascii_alphabetic) {
            Ok(Self(bytes))
        } else {
            Err(BakeryError::format(format!(
                "invalid chunk type {:?}",
                String::from_utf8_lossy(&bytes)
            )))
        }
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Critical chunks have an uppercase first letter.
    pub fn is_critical(&self) -> bool {
        self.0[0].is_ascii_uppercase()
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Always ASCII letters by construction.
        for b in self.0 {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkType({self})")
    }
}

/// A single chunk: type tag, data field and stored CRC.
///
/// The on-disk length field is not stored; it is always `data.len()`.
#[derive(Clone, PartialEq, Eq)]
pub struct Chunk {
    chunk_type: ChunkType,
    data: Vec<u8>,
    crc: u32,
}

impl Chunk {
    /// Create a chunk and compute its CRC.
    pub fn new(chunk_type: ChunkType, data: Vec<u8>) -> Self {
        let crc = chunk_crc(&chunk_type, &data);
        Self {
            chunk_type,
            data,
            crc,
        }
    }

    /// Rebuild a chunk read from a stream, verifying its stored CRC.
    pub fn from_stored(chunk_type: ChunkType, data: Vec<u8>, stored_crc: u32) -> Result<Self> {
        let computed = chunk_crc(&chunk_type, &data);
        if computed != stored_crc {
            return Err(BakeryError::ChecksumMismatch {
                chunk_type: chunk_type.to_string(),
                stored: stored_crc,
                computed,
            });
        }
        Ok(Self {
            chunk_type,
            data,
            crc: stored_crc,
        })
    }

    pub fn chunk_type(&self) -> ChunkType {
        self.chunk_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn crc(&self) -> u32 {
        self.crc
    }

    /// Length of the data field as written in the chunk header.
    pub fn length(&self) -> u32 {
        self.data.len() as u32
    }

    /// Total encoded size: length + type + data + crc.
    pub fn encoded_len(&self) -> usize {
        12 + self.data.len()
    }

    /// Append the encoded chunk to `out`, recomputing the CRC.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.length().to_be_bytes());
        out.extend_from_slice(self.chunk_type.as_bytes());
        out.extend_from_slice(&self.data);
        out.extend_from_slice(&chunk_crc(&self.chunk_type, &self.data).to_be_bytes());
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("type", &self.chunk_type)
            .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
            .field("crc", &format_args!("{:#010x}", self.crc))
            .finish()
    }
}
