//! End-to-end baking tests against real PNG files.
//!
//! Fixtures are encoded with the `image` crate so that the codec is checked
//! against a third-party writer and reader rather than itself.

use std::io::Cursor;

use bakery_core::png::{
    chunk_crc, parse_chunks, set_text, text_entries, Chunk, ChunkType, PngBuffer,
};
use bakery_core::{
    bake, bake_with_mode, extract, extract_text, from_data_url, BakeMode, BakeryError,
    DocumentFormat, ErrorKind, WrappedDocument, KEYWORD,
};
use image::{ImageBuffer, ImageFormat, Rgba, RgbaImage};

const DOCUMENT: &str = r#"{
    "version": "https://schema.openattestation.com/2.0/schema.json",
    "data": {
        "id": "0b8e5b8a-1c2b-4c9c-8f8e-1f0e6c3a2d11:string:CERT-0042",
        "name": "0b8e5b8a-1c2b-4c9c-8f8e-1f0e6c3a2d12:string:Certificate of Émerveillement ✓",
        "issuers": [
            {
                "name": "0b8e5b8a-1c2b-4c9c-8f8e-1f0e6c3a2d13:string:Demo Issuer",
                "documentStore": "0b8e5b8a-1c2b-4c9c-8f8e-1f0e6c3a2d14:string:0x532C0F35C51a5D1a63d9D3E8ED4a0Cc3c56D8C7b",
                "identityProof": {
                    "type": "0b8e5b8a-1c2b-4c9c-8f8e-1f0e6c3a2d15:string:DNS-TXT",
                    "location": "0b8e5b8a-1c2b-4c9c-8f8e-1f0e6c3a2d16:string:example.openattestation.com"
                }
            }
        ]
    },
    "signature": {
        "type": "SHA3MerkleProof",
        "targetHash": "2c2e0d0a5a1f5b1b7c8c9d3e4f5a6b7c8d9e0f1a2b3c4d5e6f708192a3b4c5d6",
        "proof": [],
        "merkleRoot": "2c2e0d0a5a1f5b1b7c8c9d3e4f5a6b7c8d9e0f1a2b3c4d5e6f708192a3b4c5d6"
    }
}"#;

const CREDENTIAL_V3: &str = r#"{
    "@context": [
        "https://www.w3.org/2018/credentials/v1",
        "https://schemata.openattestation.com/com/openattestation/1.0/OpenAttestation.v3.json"
    ],
    "type": ["VerifiableCredential", "OpenAttestationCredential"],
    "issuanceDate": "2022-03-01T09:00:00Z",
    "issuer": { "id": "https://example.com", "name": "Demo Issuer" },
    "credentialSubject": { "id": "did:example:42", "award": "Certificate of Émerveillement ✓" },
    "openAttestationMetadata": {
        "template": { "type": "EMBEDDED_RENDERER", "name": "CERT", "url": "https://renderer.example.com" },
        "proof": { "type": "OpenAttestationProofMethod", "method": "DOCUMENT_STORE", "value": "0x532C0F35C51a5D1a63d9D3E8ED4a0Cc3c56D8C7b" },
        "identityProof": { "type": "DNS-TXT", "identifier": "example.openattestation.com" }
    },
    "proof": {
        "type": "OpenAttestationMerkleProofSignature2018",
        "proofPurpose": "assertionMethod",
        "targetHash": "9a1c3e5b7d9f1a3c5e7b9d1f3a5c7e9b1d3f5a7c9e1b3d5f7a9c1e3b5d7f9a1c",
        "proofs": [],
        "merkleRoot": "9a1c3e5b7d9f1a3c5e7b9d1f3a5c7e9b1d3f5a7c9e1b3d5f7a9c1e3b5d7f9a1c",
        "salts": "W10=",
        "privacy": { "obfuscated": [] }
    }
}"#;

/// Create a small RGBA image with a recognisable pattern.
fn create_test_image(width: u32, height: u32) -> RgbaImage {
    let mut img = ImageBuffer::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        let a = if (x / 4 + y / 4) % 2 == 0 { 255 } else { 128 };
        *pixel = Rgba([r, g, 90, a]);
    }
    img
}

fn encode_png(img: &RgbaImage) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)
        .expect("PNG encoding failed");
    buffer.into_inner()
}

fn document() -> WrappedDocument {
    WrappedDocument::from_json_str(DOCUMENT).expect("fixture document parses")
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_baked_image_decodes_to_identical_pixels() {
    let original = create_test_image(48, 32);
    let png = encode_png(&original);

    let baked = bake(&png, &document()).unwrap();
    assert!(baked.bytes.len() > png.len());

    let decoded = image::load_from_memory_with_format(&baked.bytes, ImageFormat::Png)
        .expect("baked image still decodes")
        .to_rgba8();
    assert_eq!(decoded.dimensions(), original.dimensions());
    assert_eq!(decoded.as_raw(), original.as_raw());
}

#[test]
fn test_document_round_trip_through_data_url() {
    let png = encode_png(&create_test_image(8, 8));
    let baked = bake(&png, &document()).unwrap();

    let url = baked.to_data_url();
    let bytes = from_data_url(&url).unwrap();
    assert_eq!(extract(&bytes).unwrap(), document());
}

#[test]
fn test_v3_credential_round_trip() {
    let credential = WrappedDocument::from_json_str(CREDENTIAL_V3).unwrap();
    assert_eq!(credential.format(), DocumentFormat::OpenAttestationV3);

    let png = encode_png(&create_test_image(8, 8));
    let baked = bake(&png, &credential).unwrap();

    let back = extract(&baked.bytes).unwrap();
    assert_eq!(back, credential);
    assert_eq!(extract_text(&baked.bytes).unwrap(), credential.to_canonical_json().unwrap());
}

#[test]
fn test_embedded_text_is_exact_canonical_json() {
    let png = encode_png(&create_test_image(4, 4));
    let baked = bake(&png, &document()).unwrap();

    let text = extract_text(&baked.bytes).unwrap();
    assert_eq!(text, document().to_canonical_json().unwrap());
    assert!(text.contains("Émerveillement ✓"));
}

#[test]
fn test_unmodified_parse_is_byte_identical() {
    let png = encode_png(&create_test_image(16, 16));
    let parsed = PngBuffer::parse(&png).unwrap();
    assert_eq!(parsed.to_bytes(), png);

    let baked = bake(&png, &document()).unwrap();
    assert_eq!(PngBuffer::parse(&baked.bytes).unwrap().to_bytes(), baked.bytes);
}

#[test]
fn test_trailing_bytes_after_iend_survive() {
    let mut png = encode_png(&create_test_image(4, 4));
    png.extend_from_slice(b"trailing garbage");

    let baked = bake(&png, &document()).unwrap();
    assert!(baked.bytes.ends_with(b"trailing garbage"));
    assert_eq!(extract(&baked.bytes).unwrap(), document());
}

#[test]
fn test_payload_chunk_sits_before_iend() {
    let png = encode_png(&create_test_image(4, 4));
    let baked = bake(&png, &document()).unwrap();

    let chunks = parse_chunks(&baked.bytes).unwrap();
    let types: Vec<ChunkType> = chunks.iter().map(Chunk::chunk_type).collect();
    assert_eq!(types[0], ChunkType::IHDR);
    assert_eq!(types[types.len() - 2], ChunkType::iTXt);
    assert_eq!(types[types.len() - 1], ChunkType::IEND);
}

// ============================================================================
// Re-baking
// ============================================================================

#[test]
fn test_replace_leaves_exactly_one_payload() {
    let png = encode_png(&create_test_image(4, 4));
    let mut later = document();
    later.insert("version", "later");

    let once = bake(&png, &document()).unwrap();
    let twice = bake(&once.bytes, &later).unwrap();

    let entries = text_entries(&PngBuffer::parse(&twice.bytes).unwrap()).unwrap();
    let payloads = entries.iter().filter(|e| e.keyword == KEYWORD).count();
    assert_eq!(payloads, 1);
    assert_eq!(extract(&twice.bytes).unwrap(), later);
}

#[test]
fn test_append_keeps_first_match() {
    let png = encode_png(&create_test_image(4, 4));
    let mut later = document();
    later.insert("version", "later");

    let once = bake_with_mode(&png, &document(), BakeMode::Append).unwrap();
    let twice = bake_with_mode(&once.bytes, &later, BakeMode::Append).unwrap();

    assert_eq!(extract(&twice.bytes).unwrap(), document());
}

#[test]
fn test_other_text_chunks_untouched() {
    let png = encode_png(&create_test_image(4, 4));
    let tagged = set_text(&PngBuffer::parse(&png).unwrap(), "Author", "someone").unwrap();

    let baked = bake(&tagged.to_bytes(), &document()).unwrap();
    let entries = text_entries(&PngBuffer::parse(&baked.bytes).unwrap()).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].keyword, "Author");
    assert_eq!(entries[0].text, "someone");
}

// ============================================================================
// Failure modes
// ============================================================================

#[test]
fn test_corrupted_payload_is_detected() {
    let png = encode_png(&create_test_image(4, 4));
    let mut baked = bake(&png, &document()).unwrap().bytes;

    // Flip a byte inside the JSON text (well inside the iTXt chunk).
    let needle = b"SHA3MerkleProof";
    let at = baked
        .windows(needle.len())
        .position(|w| w == needle)
        .expect("payload present");
    baked[at] ^= 0x20;

    let err = extract(&baked).unwrap_err();
    assert!(matches!(err, BakeryError::ChecksumMismatch { .. }));
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_truncated_image_is_format_error() {
    let png = encode_png(&create_test_image(4, 4));
    let baked = bake(&png, &document()).unwrap().bytes;

    for cut in [9, 20, baked.len() - 13, baked.len() - 3] {
        let err = extract(&baked[..cut]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format, "cut at {cut}");
    }
}

#[test]
fn test_non_png_inputs_rejected() {
    let jpeg_header = b"\xff\xd8\xff\xe0\x00\x10JFIF\x00\x01\x01\x00".to_vec();
    let png = encode_png(&create_test_image(4, 4));
    let wrong_signature = [&png[..7], &[0u8][..], &png[8..]].concat();

    for input in [
        jpeg_header,
        Vec::new(),
        DOCUMENT.as_bytes().to_vec(),
        wrong_signature,
    ] {
        let err = bake(&input, &document()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}

#[test]
fn test_absent_vs_malformed_payload() {
    let png = encode_png(&create_test_image(4, 4));
    assert_eq!(extract(&png).unwrap_err().kind(), ErrorKind::NotFound);

    let garbage = set_text(&PngBuffer::parse(&png).unwrap(), KEYWORD, r#"["hello","world"]"#)
        .unwrap()
        .to_bytes();
    assert_eq!(extract(&garbage).unwrap_err().kind(), ErrorKind::Parse);

    // Any JSON object is carried, whatever its envelope.
    let plain = set_text(&PngBuffer::parse(&png).unwrap(), KEYWORD, r#"{"hello":"world"}"#)
        .unwrap()
        .to_bytes();
    assert_eq!(extract(&plain).unwrap().get("hello").unwrap(), "world");
}

#[test]
fn test_compressed_payload_from_other_writers() {
    let png = encode_png(&create_test_image(4, 4));
    let json = document().to_canonical_json().unwrap();

    let mut data = KEYWORD.as_bytes().to_vec();
    data.extend_from_slice(&[0, 1, 0]); // NUL, compressed, zlib
    data.extend_from_slice(b"en\0");
    data.extend_from_slice("open-attestation\0".as_bytes());
    data.extend_from_slice(&miniz_oxide::deflate::compress_to_vec_zlib(json.as_bytes(), 6));
    let chunk = Chunk::new(ChunkType::iTXt, data);
    assert_eq!(chunk.crc(), chunk_crc(&ChunkType::iTXt, chunk.data()));

    let buffer = PngBuffer::parse(&png)
        .unwrap()
        .with_chunk(chunk, Default::default());
    assert_eq!(extract(&buffer.to_bytes()).unwrap(), document());
}
