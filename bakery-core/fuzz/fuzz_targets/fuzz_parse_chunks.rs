#![no_main]

//! Fuzz target for PngBuffer::parse()
//!
//! Arbitrary bytes must either be rejected with an error or re-serialize to
//! exactly the input.
//!
//! Run with: cargo +nightly fuzz run fuzz_parse_chunks

use bakery_core::png::{PngBuffer, PNG_SIGNATURE};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut input = PNG_SIGNATURE.to_vec();
    input.extend_from_slice(data);

    if let Ok(png) = PngBuffer::parse(&input) {
        assert_eq!(png.to_bytes(), input);
        let _ = bakery_core::extract(&input);
    }
});
