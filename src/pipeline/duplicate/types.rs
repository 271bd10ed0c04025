use serde::{Deserialize, Serialize};

/// Exact fingerprint of a document plus, when the semantic layer is on,
/// an embedding of the start of its merged text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentFingerprint {
    pub sha256: String,
    pub embedding: Option<Vec<f32>>,
}

/// A fingerprint previously handed to storage, with the id storage gave it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFingerprint {
    pub doc_id: i64,
    pub fingerprint: ContentFingerprint,
}

impl StoredFingerprint {
    pub fn new(doc_id: i64, fingerprint: ContentFingerprint) -> Self {
        Self { doc_id, fingerprint }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuplicateVerdict {
    pub exact_match_id: Option<i64>,
    /// (doc_id, similarity), most similar first.
    pub near_duplicates: Vec<(i64, f32)>,
}

impl DuplicateVerdict {
    pub fn is_exact(&self) -> bool {
        self.exact_match_id.is_some()
    }

    /// Exact match or at least one near duplicate.
    pub fn is_duplicate(&self) -> bool {
        self.is_exact() || !self.near_duplicates.is_empty()
    }

    /// Most similar near duplicate.
    pub fn best_match(&self) -> Option<(i64, f32)> {
        self.near_duplicates.first().copied()
    }
}
