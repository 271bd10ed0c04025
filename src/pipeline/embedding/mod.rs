pub mod types;
pub mod embedder;
pub mod similarity;
pub mod layer;

pub use types::*;
pub use embedder::*;
pub use similarity::*;
pub use layer::*;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Embedding model not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("Embedding model initialization: {0}")]
    ModelInit(String),

    #[error("Tokenization error: {0}")]
    Tokenization(String),

    #[error("Embedding generation failed: {0}")]
    Inference(String),

    #[error("Cannot embed empty text")]
    EmptyInput,
}
