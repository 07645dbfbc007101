//! Content fingerprints for "unchanged since last save" detection.

use crate::draft::DraftContent;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 over the canonical serialization of a [`DraftContent`].
///
/// Equal logical content always yields an equal fingerprint. Struct fields
/// serialize in declaration order, and a checklist that parses as JSON is
/// re-serialized with sorted object keys, so `{"a":1,"b":2}` and
/// `{"b":2,"a":1}` are the same checklist.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DraftFingerprint([u8; 32]);

#[derive(Serialize)]
struct CanonicalDraft<'a> {
    names_list: &'a str,
    template_text: &'a str,
    checklist_data: Option<Checklist<'a>>,
}

// Tagged so a raw string can never collide with a JSON string value.
#[derive(Serialize)]
enum Checklist<'a> {
    Json(Value),
    Raw(&'a str),
}

impl DraftFingerprint {
    pub fn of(content: &DraftContent) -> Self {
        let canonical = CanonicalDraft {
            names_list: &content.names_list,
            template_text: &content.template_text,
            checklist_data: content.checklist_data.as_deref().map(canonical_checklist),
        };

        // Serializing borrowed strings and a Value into a Vec cannot fail.
        let bytes = serde_json::to_vec(&canonical).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        Self(hash)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

fn canonical_checklist(raw: &str) -> Checklist<'_> {
    // serde_json's default map is a BTreeMap, so keys come back sorted.
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => Checklist::Json(value),
        Err(_) => Checklist::Raw(raw),
    }
}

impl fmt::Display for DraftFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex()[..12])
    }
}

impl fmt::Debug for DraftFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DraftFingerprint({})", self.to_hex())
    }
}
