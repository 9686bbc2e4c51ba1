use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha3::{Digest, Sha3_256};

use crate::error::{BakeryError, Result};

/// Signature block of an OpenAttestation v2 document (Merkle proof over the data).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSignature {
    /// Proof type, e.g. "SHA3MerkleProof"
    #[serde(rename = "type")]
    pub kind: String,
    pub target_hash: String,
    pub proof: Vec<Value>,
    pub merkle_root: String,
    /// Fields this crate does not model, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Envelope family of a document, judged from its top-level fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `version` + `data` + `signature`
    OpenAttestationV2,
    /// `@context` + `proof` (verifiable credential)
    OpenAttestationV3,
    Unknown,
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OpenAttestationV2 => "OpenAttestation v2",
            Self::OpenAttestationV3 => "OpenAttestation v3",
            Self::Unknown => "unknown",
        })
    }
}

/// A wrapped attestation document.
///
/// Any JSON object is accepted and carried verbatim; its content is never
/// interpreted here. The accessors below only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WrappedDocument(Map<String, Value>);

impl WrappedDocument {
    /// Parse a document from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| BakeryError::ParseError(format!("not a JSON object: {e}")))
    }

    /// Parse a document from raw file bytes.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| BakeryError::ParseError(format!("not a JSON object: {e}")))
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a top-level field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// The v2 `version` string, if present.
    pub fn version(&self) -> Option<&str> {
        self.get("version").and_then(Value::as_str)
    }

    /// The v2 signature block, if present and well formed.
    pub fn signature(&self) -> Option<DocumentSignature> {
        self.get("signature")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn format(&self) -> DocumentFormat {
        if self.0.contains_key("@context") && self.0.contains_key("proof") {
            DocumentFormat::OpenAttestationV3
        } else if self.0.contains_key("data") && self.signature().is_some() {
            DocumentFormat::OpenAttestationV2
        } else {
            DocumentFormat::Unknown
        }
    }

    /// Compact JSON with object keys sorted at every level.
    ///
    /// Going through `serde_json::Value` sorts keys, so the output only
    /// depends on the document's content.
    pub fn to_canonical_json(&self) -> Result<String> {
        let value = serde_json::to_value(self)
            .map_err(|e| BakeryError::ParseError(format!("failed to serialize document: {e}")))?;
        serde_json::to_string(&value)
            .map_err(|e| BakeryError::ParseError(format!("failed to serialize document: {e}")))
    }

    /// Content identity: SHA3-256 of the canonical JSON.
    pub fn id(&self) -> Result<DocumentId> {
        let json = self.to_canonical_json()?;
        Ok(DocumentId::from_canonical_json(&json))
    }
}

/// Hex-encoded SHA3-256 digest identifying a document's content.
///
/// Only built by hashing, so it is always 64 hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    fn from_canonical_json(json: &str) -> Self {
        let mut hasher = Sha3_256::new();
        hasher.update(json.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 16 hex characters, for log lines and terminal output.
    pub fn short(&self) -> &str {
        self.0.get(..16).unwrap_or(&self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE: &str = r#"{
        "version": "https://schema.openattestation.com/2.0/schema.json",
        "data": {
            "id": "7b1c0a6e-2f0a-4f0d-9d55-1c1c0c8d7e11:string:SGCNM21566325",
            "$template": {
                "name": "7b1c0a6e-2f0a-4f0d-9d55-1c1c0c8d7e12:string:CUSTOM_TEMPLATE",
                "type": "7b1c0a6e-2f0a-4f0d-9d55-1c1c0c8d7e13:string:EMBEDDED_RENDERER"
            },
            "issuers": [
                {
                    "name": "7b1c0a6e-2f0a-4f0d-9d55-1c1c0c8d7e14:string:DEMO STORE",
                    "documentStore": "7b1c0a6e-2f0a-4f0d-9d55-1c1c0c8d7e15:string:0x9178F546D3FF57D7A6352bD61B80cCCD46199C2d"
                }
            ]
        },
        "signature": {
            "type": "SHA3MerkleProof",
            "targetHash": "693df4b7d07e8c5a4a4b9c9b2cc5c1c9f4c0bb7c3d48d5ea4b0c7a9b2fbf4b8e",
            "proof": [],
            "merkleRoot": "693df4b7d07e8c5a4a4b9c9b2cc5c1c9f4c0bb7c3d48d5ea4b0c7a9b2fbf4b8e"
        }
    }"#;

    pub(crate) const SAMPLE_V3: &str = r#"{
        "@context": [
            "https://www.w3.org/2018/credentials/v1",
            "https://schemata.openattestation.com/com/openattestation/1.0/OpenAttestation.v3.json"
        ],
        "type": ["VerifiableCredential", "OpenAttestationCredential"],
        "issuanceDate": "2021-12-03T12:19:52Z",
        "issuer": { "id": "https://example.com", "name": "DEMO STORE" },
        "credentialSubject": { "id": "did:example:123", "name": "Jane" },
        "openAttestationMetadata": {
            "template": { "type": "EMBEDDED_RENDERER", "name": "GOVTECH_DEMO", "url": "https://demo-renderer.opencerts.io" },
            "proof": { "type": "OpenAttestationProofMethod", "method": "DOCUMENT_STORE", "value": "0x8bA63EAB43342AAc3AdBB4B827b68Cf4aAE5Caca" },
            "identityProof": { "type": "DNS-TXT", "identifier": "example.openattestation.com" }
        },
        "proof": {
            "type": "OpenAttestationMerkleProofSignature2018",
            "proofPurpose": "assertionMethod",
            "targetHash": "e4d7e5d8d5ae4c6a7c8a2e1e2d8f3b4a5c6d7e8f9a0b1c2d3e4f5a6b7c8d9e0f",
            "proofs": [],
            "merkleRoot": "e4d7e5d8d5ae4c6a7c8a2e1e2d8f3b4a5c6d7e8f9a0b1c2d3e4f5a6b7c8d9e0f",
            "salts": "W10=",
            "privacy": { "obfuscated": [] }
        }
    }"#;

    pub(crate) fn sample() -> WrappedDocument {
        WrappedDocument::from_json_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_parse_sample() {
        let doc = sample();
        assert_eq!(doc.format(), DocumentFormat::OpenAttestationV2);
        let signature = doc.signature().unwrap();
        assert_eq!(signature.kind, "SHA3MerkleProof");
        assert!(signature.proof.is_empty());
        assert_eq!(
            doc.version(),
            Some("https://schema.openattestation.com/2.0/schema.json")
        );
    }

    #[test]
    fn test_v3_credential_is_accepted() {
        let doc = WrappedDocument::from_json_str(SAMPLE_V3).unwrap();
        assert_eq!(doc.format(), DocumentFormat::OpenAttestationV3);
        assert!(doc.version().is_none());
        assert!(doc.signature().is_none());

        let original: Value = serde_json::from_str(SAMPLE_V3).unwrap();
        assert_eq!(doc.into_value(), original);
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let json = r#"{"version":"v","data":{},"signature":{"type":"t","targetHash":"a","proof":["b"],"merkleRoot":"c","salt":"s"},"privacy":{"obfuscatedData":[]}}"#;
        let doc = WrappedDocument::from_json_str(json).unwrap();
        assert!(doc.get("privacy").is_some());
        assert!(doc.signature().unwrap().extra.contains_key("salt"));

        let again = WrappedDocument::from_json_str(&doc.to_canonical_json().unwrap()).unwrap();
        assert_eq!(again, doc);

        let original: Value = serde_json::from_str(json).unwrap();
        let canonical: Value = serde_json::from_str(&doc.to_canonical_json().unwrap()).unwrap();
        assert_eq!(original, canonical);
    }

    #[test]
    fn test_arbitrary_object_is_unknown_format() {
        let doc = WrappedDocument::from_json_str(r#"{"hello":"world"}"#).unwrap();
        assert_eq!(doc.format(), DocumentFormat::Unknown);
    }

    #[test]
    fn test_canonical_json_sorts_keys() {
        let json = doc_with_data(r#"{"zeta":1,"alpha":{"y":2,"b":3}}"#);
        let canonical = WrappedDocument::from_json_str(&json)
            .unwrap()
            .to_canonical_json()
            .unwrap();
        assert!(canonical.contains(r#""data":{"alpha":{"b":3,"y":2},"zeta":1}"#));
        assert!(!canonical.contains(' '));
    }

    #[test]
    fn test_id_is_stable_across_key_order() {
        let a = WrappedDocument::from_json_str(&doc_with_data(r#"{"x":1,"y":2}"#)).unwrap();
        let b = WrappedDocument::from_json_str(&doc_with_data(r#"{"y":2,"x":1}"#)).unwrap();
        let c = WrappedDocument::from_json_str(&doc_with_data(r#"{"y":3,"x":1}"#)).unwrap();

        assert_eq!(a.id().unwrap(), b.id().unwrap());
        assert_ne!(a.id().unwrap(), c.id().unwrap());
        assert_eq!(a.id().unwrap().as_str().len(), 64);
        assert_eq!(a.id().unwrap().short().len(), 16);
    }

    #[test]
    fn test_document_id_short_is_prefix() {
        let id = sample().id().unwrap();
        assert!(id.as_str().starts_with(id.short()));
        assert!(id.as_str().bytes().all(|b| b.is_ascii_hexdigit()));

        let json = serde_json::to_value(&id).unwrap();
        assert_eq!(json.as_str(), Some(id.as_str()));
    }

    #[test]
    fn test_insert_changes_identity() {
        let mut doc = sample();
        let before = doc.id().unwrap();
        doc.insert("version", "other");
        assert_eq!(doc.version(), Some("other"));
        assert_ne!(doc.id().unwrap(), before);
    }

    #[test]
    fn test_non_object_is_parse_error() {
        for json in ["not json", "[]", "42", r#""text""#, "null", "{"] {
            let err = WrappedDocument::from_json_str(json).unwrap_err();
            assert!(matches!(err, BakeryError::ParseError(_)), "{json}");
        }
    }

    fn doc_with_data(data: &str) -> String {
        format!(
            r#"{{"version":"v","data":{data},"signature":{{"type":"t","targetHash":"h","proof":[],"merkleRoot":"h"}}}}"#
        )
    }
}
