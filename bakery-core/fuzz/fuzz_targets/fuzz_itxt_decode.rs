#![no_main]

//! Fuzz target for TextChunkPayload::decode()
//!
//! Run with: cargo +nightly fuzz run fuzz_itxt_decode

use bakery_core::png::TextChunkPayload;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Malformed and compressed payloads must fail cleanly, never panic
    let _ = TextChunkPayload::decode(data);
});
