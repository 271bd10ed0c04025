use crate::pipeline::embedding::{cosine_similarity, SemanticLayer};

use super::hash::sha256_hex;
use super::types::{ContentFingerprint, DuplicateVerdict, StoredFingerprint};

pub mod thresholds {
    /// Cosine similarity at or above which two documents are near duplicates.
    pub const NEAR_DUPLICATE: f32 = 0.95;
    /// Characters of merged text embedded per fingerprint.
    pub const SAMPLE_CHARS: usize = 1000;
}

/// Exact (hash) and near (embedding) duplicate detection.
#[derive(Debug, Clone)]
pub struct DuplicateDetector {
    layer: SemanticLayer,
    sample_chars: usize,
    threshold: f32,
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new(SemanticLayer::disabled())
    }
}

impl DuplicateDetector {
    pub fn new(layer: SemanticLayer) -> Self {
        Self {
            layer,
            sample_chars: thresholds::SAMPLE_CHARS,
            threshold: thresholds::NEAR_DUPLICATE,
        }
    }

    pub fn with_sample_chars(mut self, sample_chars: usize) -> Self {
        self.sample_chars = sample_chars;
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Hash the raw bytes; embed the text prefix when the layer is enabled
    /// and there is text to embed.
    pub fn fingerprint(&self, raw_bytes: &[u8], merged_text: Option<&str>) -> ContentFingerprint {
        let embedding = merged_text
            .filter(|text| !text.trim().is_empty())
            .and_then(|text| self.layer.embed_prefix(text, self.sample_chars));

        ContentFingerprint {
            sha256: sha256_hex(raw_bytes),
            embedding,
        }
    }

    /// Verdict against `existing` with the configured threshold.
    pub fn check(&self, fingerprint: &ContentFingerprint, existing: &[StoredFingerprint]) -> DuplicateVerdict {
        find_duplicates(fingerprint, existing, self.threshold)
    }
}

/// Stored document with the same SHA-256, if any.
pub fn find_exact(fingerprint: &ContentFingerprint, existing: &[StoredFingerprint]) -> Option<i64> {
    existing
        .iter()
        .find(|stored| stored.fingerprint.sha256 == fingerprint.sha256)
        .map(|stored| stored.doc_id)
}

/// Compare a fingerprint against stored ones.
///
/// An exact hash match ends the search. Otherwise every stored embedding
/// with similarity >= `threshold` is reported, most similar first. Pairs
/// with a zero-norm or mismatched vector are skipped.
pub fn find_duplicates(
    fingerprint: &ContentFingerprint,
    existing: &[StoredFingerprint],
    threshold: f32,
) -> DuplicateVerdict {
    if let Some(doc_id) = find_exact(fingerprint, existing) {
        tracing::info!(doc_id, sha256 = %fingerprint.sha256, "Exact duplicate");
        return DuplicateVerdict {
            exact_match_id: Some(doc_id),
            near_duplicates: Vec::new(),
        };
    }

    let Some(embedding) = fingerprint.embedding.as_deref() else {
        return DuplicateVerdict::default();
    };

    let mut near: Vec<(i64, f32)> = existing
        .iter()
        .filter_map(|stored| {
            let other = stored.fingerprint.embedding.as_deref()?;
            let similarity = cosine_similarity(embedding, other);
            if similarity.is_none() {
                tracing::trace!(doc_id = stored.doc_id, "Skipping degenerate embedding");
            }
            similarity.map(|s| (stored.doc_id, s))
        })
        .filter(|&(_, similarity)| similarity >= threshold)
        .collect();

    near.sort_by(|a, b| b.1.total_cmp(&a.1));

    if let Some(&(doc_id, similarity)) = near.first() {
        tracing::warn!(
            doc_id,
            similarity,
            candidates = near.len(),
            "Possible duplicate document"
        );
    }

    DuplicateVerdict {
        exact_match_id: None,
        near_duplicates: near,
    }
}
