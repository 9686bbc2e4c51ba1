//! PNG chunk and textual metadata codecs.
//!
//! Only what is needed to locate and insert one metadata chunk is
//! implemented; pixel data is never decoded. Chunks other than the ones we
//! add or remove are carried through byte for byte.
//!
//! # Example
//!
//! ```
//! use bakery_core::png::{get_text, set_text, PngBuffer};
//!
//! # fn example(image: &[u8]) -> bakery_core::Result<()> {
//! let png = PngBuffer::parse(image)?;
//! let png = set_text(&png, "Comment", "baked")?;
//! assert_eq!(get_text(&png, "Comment")?, "baked");
//! let bytes = png.to_bytes();
//! # Ok(())
//! # }
//! ```

mod chunk;
mod codec;
mod itxt;

pub use chunk::{chunk_crc, Chunk, ChunkType};
pub use codec::{
    find_chunk, has_png_signature, insert_chunk, parse_chunks, remove_chunks, serialize_chunks,
    InsertPosition, PngBuffer, PNG_SIGNATURE,
};
pub use itxt::{
    get_text, remove_text, set_text, text_entries, TextChunkPayload, MAX_INFLATED_TEXT,
    MAX_KEYWORD_LEN,
};
