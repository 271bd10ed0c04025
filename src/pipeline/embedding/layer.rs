use std::fmt;

use super::types::{EmbeddingModel, SharedEmbedder};
use crate::config::PipelineSettings;

/// The optional semantic layer: an embedding model resolved once at start-up.
///
/// Cloning shares the same model. A disabled layer is a normal mode of
/// operation; callers fall back to keyword-only behaviour.
#[derive(Clone, Default)]
pub struct SemanticLayer {
    model: Option<SharedEmbedder>,
}

impl SemanticLayer {
    pub fn disabled() -> Self {
        Self { model: None }
    }

    pub fn with_model(model: SharedEmbedder) -> Self {
        Self { model: Some(model) }
    }

    /// Resolve the layer from settings. A model that fails to load disables the
    /// layer for the lifetime of this value, with a single warning.
    pub fn load(settings: &PipelineSettings) -> Self {
        if !settings.semantic_enabled {
            tracing::info!("Semantic layer disabled by settings");
            return Self::disabled();
        }
        Self::load_model(settings)
    }

    #[cfg(feature = "onnx-embeddings")]
    fn load_model(settings: &PipelineSettings) -> Self {
        use super::embedder::OnnxEmbedder;

        let Some(dir) = settings
            .embedding_model_dir
            .clone()
            .or_else(crate::config::embedding_model_dir)
        else {
            tracing::warn!("No embedding model directory, semantic layer disabled");
            return Self::disabled();
        };

        match OnnxEmbedder::load(&dir) {
            Ok(model) => Self::with_model(std::sync::Arc::new(model)),
            Err(e) => {
                tracing::warn!(error = %e, "Embedding model failed to load, semantic layer disabled");
                Self::disabled()
            }
        }
    }

    #[cfg(not(feature = "onnx-embeddings"))]
    fn load_model(_settings: &PipelineSettings) -> Self {
        tracing::warn!("Built without onnx-embeddings, semantic layer disabled");
        Self::disabled()
    }

    pub fn is_enabled(&self) -> bool {
        self.model.is_some()
    }

    pub fn model(&self) -> Option<&SharedEmbedder> {
        self.model.as_ref()
    }

    /// Embed the first `max_chars` characters of `text`.
    ///
    /// `None` when the layer is disabled or this call failed; a failure only
    /// affects the current call.
    pub fn embed_prefix(&self, text: &str, max_chars: usize) -> Option<Vec<f32>> {
        let model = self.model.as_ref()?;
        let sample = truncate_chars(text, max_chars);
        match model.embed(sample) {
            Ok(vector) => Some(vector),
            Err(e) => {
                tracing::warn!(error = %e, "Embedding failed for this document");
                None
            }
        }
    }
}

impl fmt::Debug for SemanticLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SemanticLayer")
            .field("enabled", &self.is_enabled())
            .field("dimension", &self.model.as_ref().map(|m| m.dimension()))
            .finish()
    }
}

/// Prefix of at most `max_chars` Unicode scalar values.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
