use crate::pipeline::embedding::{cosine_similarity, similarity_to_confidence, EmbeddingModel, SemanticLayer};

use super::taxonomy::Taxonomy;
use super::types::ScoredCategory;

/// One pre-computed prototype vector per taxonomy category.
#[derive(Debug, Clone)]
pub struct CategoryEmbeddings {
    entries: Vec<(String, Vec<f32>)>,
}

impl CategoryEmbeddings {
    /// Encode every category prototype once. `None` when the layer is
    /// disabled or any prototype fails to encode.
    pub fn build(taxonomy: &Taxonomy, layer: &SemanticLayer) -> Option<Self> {
        let model = layer.model()?;

        let prototypes: Vec<String> = taxonomy.categories().iter().map(|c| c.prototype_text()).collect();
        let texts: Vec<&str> = prototypes.iter().map(String::as_str).collect();

        match model.embed_batch(&texts) {
            Ok(vectors) if vectors.len() == texts.len() => {
                let entries = taxonomy
                    .categories()
                    .iter()
                    .map(|c| c.name.clone())
                    .zip(vectors)
                    .collect();
                tracing::info!(categories = texts.len(), "Category embeddings computed");
                Some(Self { entries })
            }
            Ok(vectors) => {
                tracing::warn!(
                    expected = texts.len(),
                    got = vectors.len(),
                    "Category embedding count mismatch, semantic scoring disabled"
                );
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Category embeddings failed, semantic scoring disabled");
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best-matching category for a document vector, confidence = (sim + 1) / 2.
    ///
    /// Prototypes with zero norm or another dimension are skipped; `None`
    /// when nothing could be compared. Ties keep the earlier category.
    pub fn best_match(&self, document: &[f32]) -> Option<ScoredCategory> {
        let mut best: Option<(&str, f32)> = None;
        for (name, prototype) in &self.entries {
            let Some(similarity) = cosine_similarity(document, prototype) else {
                continue;
            };
            if best.map_or(true, |(_, s)| similarity > s) {
                best = Some((name.as_str(), similarity));
            }
        }

        best.map(|(name, similarity)| {
            tracing::debug!(category = name, similarity, "Embedding scoring");
            ScoredCategory::new(name, similarity_to_confidence(similarity))
        })
    }
}
