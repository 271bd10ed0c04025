pub mod types;
pub mod confidence;
pub mod ocr;
pub mod backends;
pub mod merge;

pub use types::*;
pub use confidence::*;
pub use backends::*;
pub use merge::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnsembleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OCR backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("OCR recognition failed in {engine}: {reason}")]
    Recognition { engine: String, reason: String },

    #[error("Text encoding error: {0}")]
    EncodingError(String),

    #[error("No OCR backend is available")]
    NoBackends,
}
