use std::collections::HashMap;

use super::types::EmbeddingModel;
use super::EmbeddingError;

/// Embedding dimension of the multilingual MiniLM sentence model.
pub const EMBEDDING_DIM: usize = 384;

// ONNX embedder, behind the `onnx-embeddings` feature

#[cfg(feature = "onnx-embeddings")]
mod onnx {
    use super::{EmbeddingError, EmbeddingModel, EMBEDDING_DIM};
    use ort::session::Session;
    use std::path::Path;
    use std::sync::Mutex;

    /// Sentence embedding model run through ONNX Runtime.
    ///
    /// The model directory must contain:
    /// - `model.onnx` (weights)
    /// - `tokenizer.json` (HuggingFace tokenizer definition)
    ///
    /// `Session::run` needs `&mut self`, so the session sits behind a Mutex;
    /// concurrent callers are serialized through it.
    pub struct OnnxEmbedder {
        session: Mutex<Session>,
        tokenizer: tokenizers::Tokenizer,
    }

    impl OnnxEmbedder {
        pub fn load(model_dir: &Path) -> Result<Self, EmbeddingError> {
            let model_path = model_dir.join("model.onnx");
            let tokenizer_path = model_dir.join("tokenizer.json");

            if !model_path.exists() {
                return Err(EmbeddingError::ModelNotFound(model_path));
            }
            if !tokenizer_path.exists() {
                return Err(EmbeddingError::ModelNotFound(tokenizer_path));
            }

            let session = Session::builder()
                .map_err(|e: ort::Error| EmbeddingError::ModelInit(e.to_string()))?
                .with_intra_threads(2)
                .map_err(|e: ort::Error| EmbeddingError::ModelInit(e.to_string()))?
                .commit_from_file(&model_path)
                .map_err(|e: ort::Error| EmbeddingError::ModelInit(format!("ONNX load failed: {e}")))?;

            let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path)
                .map_err(|e| EmbeddingError::ModelInit(format!("Tokenizer load failed: {e}")))?;

            tracing::info!(model_dir = %model_dir.display(), "ONNX embedder loaded");

            Ok(Self {
                session: Mutex::new(session),
                tokenizer,
            })
        }

        /// Tokenize, run inference, mean-pool over the attention mask and L2-normalize.
        fn infer(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            use ort::value::TensorRef;

            if text.trim().is_empty() {
                return Err(EmbeddingError::EmptyInput);
            }

            let encoding = self
                .tokenizer
                .encode(text, true)
                .map_err(|e| EmbeddingError::Tokenization(e.to_string()))?;

            let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
            let attention_mask: Vec<i64> = encoding
                .get_attention_mask()
                .iter()
                .map(|&m| m as i64)
                .collect();
            let token_type_ids: Vec<i64> = encoding.get_type_ids().iter().map(|&t| t as i64).collect();

            let seq_len = input_ids.len();

            let ids_array = ndarray::Array2::from_shape_vec((1, seq_len), input_ids)
                .map_err(|e| EmbeddingError::Inference(e.to_string()))?;
            let mask_array = ndarray::Array2::from_shape_vec((1, seq_len), attention_mask.clone())
                .map_err(|e| EmbeddingError::Inference(e.to_string()))?;
            let type_array = ndarray::Array2::from_shape_vec((1, seq_len), token_type_ids)
                .map_err(|e| EmbeddingError::Inference(e.to_string()))?;

            let ids_tensor =
                TensorRef::from_array_view(&ids_array).map_err(|e| EmbeddingError::Inference(e.to_string()))?;
            let mask_tensor =
                TensorRef::from_array_view(&mask_array).map_err(|e| EmbeddingError::Inference(e.to_string()))?;
            let type_tensor =
                TensorRef::from_array_view(&type_array).map_err(|e| EmbeddingError::Inference(e.to_string()))?;

            let mut session = self
                .session
                .lock()
                .map_err(|_| EmbeddingError::Inference("Session lock poisoned".to_string()))?;

            let outputs = session
                .run(ort::inputs![ids_tensor, mask_tensor, type_tensor])
                .map_err(|e| EmbeddingError::Inference(format!("ONNX inference failed: {e}")))?;

            // [1, seq_len, EMBEDDING_DIM]
            let (shape, output_data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| EmbeddingError::Inference(format!("Output extraction: {e}")))?;

            if shape.len() != 3 || shape[2] as usize != EMBEDDING_DIM {
                return Err(EmbeddingError::Inference(format!(
                    "Unexpected output shape: {shape:?}, expected [1, {seq_len}, {EMBEDDING_DIM}]"
                )));
            }

            let mut pooled = vec![0.0f32; EMBEDDING_DIM];
            let mut mask_sum = 0.0f32;

            for (token_idx, &mask_val) in attention_mask.iter().enumerate().take(seq_len) {
                let mask_val = mask_val as f32;
                mask_sum += mask_val;
                let offset = token_idx * EMBEDDING_DIM;
                for (dim_idx, p) in pooled.iter_mut().enumerate() {
                    *p += output_data[offset + dim_idx] * mask_val;
                }
            }

            if mask_sum > 0.0 {
                for val in &mut pooled {
                    *val /= mask_sum;
                }
            }

            super::l2_normalize(&mut pooled);
            Ok(pooled)
        }
    }

    impl EmbeddingModel for OnnxEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.infer(text)
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            texts.iter().map(|t| self.infer(t)).collect()
        }

        fn dimension(&self) -> usize {
            EMBEDDING_DIM
        }
    }
}

#[cfg(feature = "onnx-embeddings")]
pub use onnx::OnnxEmbedder;

/// Mock embedding model for testing. Produces deterministic unit vectors.
pub struct MockEmbedder {
    dimension: usize,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self {
            dimension: EMBEDDING_DIM,
        }
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingModel for MockEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(deterministic_vector(text, self.dimension))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts
            .iter()
            .map(|t| deterministic_vector(t, self.dimension))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Test model returning caller-chosen vectors for exact texts.
///
/// Texts without a registered vector get the fallback vector, or an
/// inference error when no fallback is set.
pub struct FixedEmbedder {
    dimension: usize,
    vectors: HashMap<String, Vec<f32>>,
    fallback: Option<Vec<f32>>,
}

impl FixedEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: HashMap::new(),
            fallback: None,
        }
    }

    pub fn with(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.into(), vector);
        self
    }

    pub fn with_fallback(mut self, vector: Vec<f32>) -> Self {
        self.fallback = Some(vector);
        self
    }
}

impl EmbeddingModel for FixedEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.vectors
            .get(text)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| EmbeddingError::Inference(format!("No vector registered for {text:?}")))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Test model whose every call fails.
pub struct FailingEmbedder;

impl EmbeddingModel for FailingEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Inference("model unavailable".to_string()))
    }

    fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Err(EmbeddingError::Inference("model unavailable".to_string()))
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }
}

/// Deterministic unit vector derived from the text bytes.
fn deterministic_vector(text: &str, dim: usize) -> Vec<f32> {
    let mut vec = vec![0.0f32; dim];
    let bytes = text.as_bytes();

    for (i, slot) in vec.iter_mut().enumerate() {
        let byte_idx = i % bytes.len().max(1);
        *slot = (bytes.get(byte_idx).copied().unwrap_or(0) as f32 + i as f32) / 255.0;
    }

    l2_normalize(&mut vec);
    vec
}

fn l2_normalize(vec: &mut [f32]) {
    let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for val in vec.iter_mut() {
            *val /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_embed_returns_correct_dimension() {
        let embedder = MockEmbedder::new();
        let vec = embedder.embed("Stromrechnung Januar").unwrap();
        assert_eq!(vec.len(), EMBEDDING_DIM);
        assert_eq!(MockEmbedder::with_dimension(8).embed("x").unwrap().len(), 8);
    }

    #[test]
    fn mock_embed_batch_returns_correct_count() {
        let embedder = MockEmbedder::new();
        let vecs = embedder.embed_batch(&["eins", "zwei", "drei"]).unwrap();
        assert_eq!(vecs.len(), 3);
        assert!(vecs.iter().all(|v| v.len() == EMBEDDING_DIM));
    }

    #[test]
    fn mock_embed_is_deterministic() {
        let embedder = MockEmbedder::new();
        assert_eq!(embedder.embed("gleicher Text").unwrap(), embedder.embed("gleicher Text").unwrap());
        assert_ne!(embedder.embed("Text A").unwrap(), embedder.embed("Text B").unwrap());
    }

    #[test]
    fn mock_embed_is_l2_normalized() {
        let vec = MockEmbedder::new().embed("Normierung").unwrap();
        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01, "Vector should be L2-normalized, got norm = {norm}");
    }

    #[test]
    fn fixed_embedder_lookup_and_fallback() {
        let embedder = FixedEmbedder::new(2).with("a", vec![1.0, 0.0]);
        assert_eq!(embedder.embed("a").unwrap(), vec![1.0, 0.0]);
        assert!(matches!(embedder.embed("b"), Err(EmbeddingError::Inference(_))));

        let embedder = embedder.with_fallback(vec![0.0, 1.0]);
        assert_eq!(embedder.embed("b").unwrap(), vec![0.0, 1.0]);
        assert_eq!(embedder.dimension(), 2);
    }

    #[test]
    fn failing_embedder_always_errors() {
        assert!(FailingEmbedder.embed("x").is_err());
        assert!(FailingEmbedder.embed_batch(&["x"]).is_err());
    }

    #[test]
    fn l2_normalize_leaves_zero_vector() {
        let mut zero = vec![0.0f32; 4];
        l2_normalize(&mut zero);
        assert_eq!(zero, vec![0.0; 4]);
    }

    #[cfg(feature = "onnx-embeddings")]
    #[test]
    fn onnx_load_reports_missing_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = OnnxEmbedder::load(dir.path()).err().unwrap();
        assert!(matches!(err, EmbeddingError::ModelNotFound(ref path) if path.ends_with("model.onnx")));
    }

    #[cfg(feature = "onnx-embeddings")]
    #[test]
    fn onnx_load_reports_missing_tokenizer() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("model.onnx"), b"not a model").unwrap();
        let err = OnnxEmbedder::load(dir.path()).err().unwrap();
        assert!(matches!(err, EmbeddingError::ModelNotFound(ref path) if path.ends_with("tokenizer.json")));
    }
}
