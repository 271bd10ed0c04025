use serde::{Deserialize, Serialize};

use super::EnsembleError;

/// Text and confidence reported by one OCR backend for one document.
///
/// `confidence` is on the engine scale `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOcrResult {
    pub engine_id: String,
    pub text: String,
    pub confidence: f32,
}

impl RawOcrResult {
    pub fn new(engine_id: impl Into<String>, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            engine_id: engine_id.into(),
            text: text.into(),
            confidence: confidence.clamp(0.0, 100.0),
        }
    }

    /// Empty result used when an engine produced nothing usable.
    pub fn empty(engine_id: impl Into<String>) -> Self {
        Self::new(engine_id, String::new(), 0.0)
    }
}

/// Why the merger picked the winning engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    SingleEngine,
    HighConfidenceSingle,
    HighConfidenceLonger,
    PrimaryTooShort,
    HigherConfidence,
    /// No engine ran at all; `text` is empty.
    NoInput,
}

impl DecisionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleEngine => "single_engine",
            Self::HighConfidenceSingle => "high_confidence_single",
            Self::HighConfidenceLonger => "high_confidence_longer",
            Self::PrimaryTooShort => "primary_too_short",
            Self::HigherConfidence => "higher_confidence",
            Self::NoInput => "no_input",
        }
    }
}

/// The winning OCR text for a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedText {
    pub text: String,
    pub winning_engine: String,
    pub decision_reason: DecisionReason,
}

/// Bounding box of a recognised token, in image pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One recognised token with its engine-reported confidence (0-100, may be negative
/// when the engine could not score it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrToken {
    pub text: String,
    pub confidence: f32,
    pub bounding_box: Option<BoundingBox>,
}

/// Raw page output of a backend before it is reduced to a `RawOcrResult`.
#[derive(Debug, Clone)]
pub struct OcrPageResult {
    pub text: String,
    pub tokens: Vec<OcrToken>,
}

/// An OCR engine the pipeline can call.
///
/// `available()` is queried once when backends are resolved at startup;
/// `recognize` is a blocking, CPU-bound call.
pub trait OcrBackend {
    fn engine_id(&self) -> &str;

    fn available(&self) -> bool;

    fn recognize(&self, image_bytes: &[u8]) -> Result<OcrPageResult, EnsembleError>;
}

/// Allow `Box<dyn OcrBackend>` to be used as `&impl OcrBackend`.
impl OcrBackend for Box<dyn OcrBackend + Send + Sync> {
    fn engine_id(&self) -> &str {
        (**self).engine_id()
    }

    fn available(&self) -> bool {
        (**self).available()
    }

    fn recognize(&self, image_bytes: &[u8]) -> Result<OcrPageResult, EnsembleError> {
        (**self).recognize(image_bytes)
    }
}
