use crate::config::PipelineSettings;
use crate::pipeline::embedding::SemanticLayer;

use super::keyword::classify_by_keywords;
use super::policy::merge_scores;
use super::semantic::CategoryEmbeddings;
use super::subcategory::subcategorize;
use super::taxonomy::Taxonomy;
use super::types::{CategoryDecision, DecisionSource, ScoredCategory};
use super::{ClassifyError, FALLBACK_CATEGORY, UNCATEGORIZED};

/// Characters of document text encoded for embedding scoring.
pub const DEFAULT_SAMPLE_CHARS: usize = 2000;

/// Keyword + embedding classifier over a fixed taxonomy.
///
/// Built once; `categorize` takes `&self` and is safe to call from several
/// worker threads.
#[derive(Debug)]
pub struct HybridClassifier {
    taxonomy: Taxonomy,
    layer: SemanticLayer,
    embeddings: Option<CategoryEmbeddings>,
    sample_chars: usize,
}

impl HybridClassifier {
    /// Pre-computes category embeddings when the layer is enabled. If that
    /// fails, embedding scoring stays off for the lifetime of the classifier.
    pub fn new(taxonomy: Taxonomy, layer: SemanticLayer) -> Self {
        let embeddings = CategoryEmbeddings::build(&taxonomy, &layer);
        if layer.is_enabled() && embeddings.is_none() {
            tracing::warn!("Falling back to keyword-only classification");
        }
        Self {
            taxonomy,
            layer,
            embeddings,
            sample_chars: DEFAULT_SAMPLE_CHARS,
        }
    }

    pub fn keyword_only(taxonomy: Taxonomy) -> Self {
        Self::new(taxonomy, SemanticLayer::disabled())
    }

    /// Load the taxonomy named in the settings (or the built-in one).
    /// A taxonomy that cannot be loaded is a fatal start-up error.
    pub fn from_settings(settings: &PipelineSettings, layer: SemanticLayer) -> Result<Self, ClassifyError> {
        let taxonomy = match &settings.taxonomy_path {
            Some(path) => Taxonomy::load(path)?,
            None => Taxonomy::default(),
        };
        Ok(Self::new(taxonomy, layer).with_sample_chars(settings.classify_sample_chars))
    }

    pub fn with_sample_chars(mut self, sample_chars: usize) -> Self {
        self.sample_chars = sample_chars;
        self
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// True when embedding scoring participates in decisions.
    pub fn semantic_enabled(&self) -> bool {
        self.embeddings.is_some()
    }

    /// Classify a document by its text and extracted keywords.
    ///
    /// Never fails: no text and no keywords yield ("Sonstiges", "Unkategorisiert", 0).
    pub fn categorize(&self, text: &str, keywords: &[String]) -> CategoryDecision {
        if text.trim().is_empty() && keywords.is_empty() {
            return CategoryDecision {
                main_category: FALLBACK_CATEGORY.to_string(),
                sub_category: UNCATEGORIZED.to_string(),
                confidence: 0.0,
                keyword_score: 0.0,
                embedding_score: None,
                source: DecisionSource::Empty,
            };
        }

        let keyword = classify_by_keywords(&self.taxonomy, text, keywords);
        let embedding = self.score_embedding(text);
        let (chosen, source) = merge_scores(&keyword, embedding.as_ref());

        let sub_category = subcategorize(&self.taxonomy, &chosen.category, text);

        tracing::info!(
            category = %chosen.category,
            sub_category = %sub_category,
            confidence = chosen.confidence,
            keyword = keyword.confidence,
            embedding = embedding.as_ref().map(|e| e.confidence),
            ?source,
            "Document categorized"
        );

        CategoryDecision {
            main_category: chosen.category,
            sub_category,
            confidence: chosen.confidence,
            keyword_score: keyword.confidence,
            embedding_score: embedding.map(|e| e.confidence),
            source,
        }
    }

    fn score_embedding(&self, text: &str) -> Option<ScoredCategory> {
        let embeddings = self.embeddings.as_ref()?;
        if text.trim().is_empty() {
            return None;
        }
        let vector = self.layer.embed_prefix(text, self.sample_chars)?;
        embeddings.best_match(&vector)
    }
}
