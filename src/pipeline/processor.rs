//! Document processing entry point.
//!
//! Drives one document through the stages in order:
//! hash gate → OCR merge → sanitize → features → category → tags/fields → duplicates.
//!
//! Engines are injected at construction (OCR backends, embedding model) and
//! resolved once; `process` itself never fails.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{ConfigError, PipelineSettings};
use crate::pipeline::classify::{generate_tags, CategoryDecision, ClassifyError, HybridClassifier};
use crate::pipeline::duplicate::{
    find_exact, sha256_hex, ContentFingerprint, DuplicateDetector, DuplicateVerdict, StoredFingerprint,
};
use crate::pipeline::embedding::SemanticLayer;
use crate::pipeline::ensemble::ocr::TesseractCli;
use crate::pipeline::ensemble::{
    merge_with_threshold, EnsembleError, MergedText, OcrBackendSet, RawOcrResult, SharedBackend,
};
use crate::pipeline::features::{
    extract_fields, extract_fields_for_year, sanitize_ocr_text, DocumentFields, ExtractedFeatures, FeatureExtractor,
};

/// Keywords joined into the record summary.
const SUMMARY_KEYWORDS: usize = 5;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Fatal errors. Only construction and OCR-less image processing can fail.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Taxonomy error: {0}")]
    Classify(#[from] ClassifyError),

    #[error("OCR error: {0}")]
    Ensemble(#[from] EnsembleError),
}

// ---------------------------------------------------------------------------
// Input and result types
// ---------------------------------------------------------------------------

/// A document as handed over by the ingestion collaborator.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub raw_bytes: Vec<u8>,
    /// One result per OCR engine, primary first.
    pub ocr_results: Vec<RawOcrResult>,
}

impl DocumentInput {
    pub fn new(raw_bytes: impl Into<Vec<u8>>, ocr_results: Vec<RawOcrResult>) -> Self {
        Self {
            raw_bytes: raw_bytes.into(),
            ocr_results,
        }
    }
}

/// Reduced-capability modes a record went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Degradation {
    /// Only one OCR engine contributed.
    SingleEngine,
    /// Semantic scoring was configured but did not contribute.
    KeywordOnly,
    /// OCR produced no usable text.
    NoTextExtracted,
}

/// Everything the pipeline learned about a new document, ready for storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub record_id: Uuid,
    pub merged: MergedText,
    pub features: ExtractedFeatures,
    pub decision: CategoryDecision,
    pub fingerprint: ContentFingerprint,
    pub verdict: DuplicateVerdict,
    pub tags: Vec<String>,
    pub fields: Option<DocumentFields>,
    pub document_date: Option<NaiveDate>,
    pub summary: String,
    /// Near duplicates exist; advisory only, the record is still stored.
    pub duplicate_candidate: bool,
    pub degraded: Vec<Degradation>,
    pub low_confidence: bool,
}

#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    /// Same bytes already stored; nothing was processed.
    ExactDuplicate { existing_id: i64, sha256: String },
    Processed(Box<DocumentRecord>),
}

impl PipelineOutcome {
    pub fn record(&self) -> Option<&DocumentRecord> {
        match self {
            Self::Processed(record) => Some(&**record),
            Self::ExactDuplicate { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Owns the resolved engines and runs the stages for one document at a time.
///
/// `process` takes `&self`; a pipeline can be shared across worker threads.
pub struct DocumentPipeline {
    settings: PipelineSettings,
    backends: Option<OcrBackendSet>,
    extractor: FeatureExtractor,
    classifier: HybridClassifier,
    detector: DuplicateDetector,
    reference_year: Option<i32>,
}

impl DocumentPipeline {
    pub fn new(
        settings: PipelineSettings,
        backends: Option<OcrBackendSet>,
        layer: SemanticLayer,
    ) -> Result<Self, ProcessingError> {
        settings.validate()?;
        let classifier = HybridClassifier::from_settings(&settings, layer.clone())?;
        let detector = DuplicateDetector::new(layer)
            .with_sample_chars(settings.fingerprint_sample_chars)
            .with_threshold(settings.duplicate_threshold);

        Ok(Self {
            extractor: FeatureExtractor::new(settings.max_keywords),
            classifier,
            detector,
            backends,
            settings,
            reference_year: None,
        })
    }

    /// Resolve every engine from settings: the semantic layer and the local
    /// Tesseract binary. A missing Tesseract leaves only `process` usable.
    pub fn from_settings(settings: PipelineSettings) -> Result<Self, ProcessingError> {
        let layer = SemanticLayer::load(&settings);
        let tesseract: SharedBackend = Box::new(TesseractCli::new());
        let backends = match OcrBackendSet::resolve(vec![tesseract]) {
            Ok(set) => Some(set),
            Err(e) => {
                tracing::warn!(error = %e, "No OCR backend, only pre-recognised text can be processed");
                None
            }
        };
        Self::new(settings, backends, layer)
    }

    /// Pin the year used for date plausibility and tax-year fallback.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.extractor = self.extractor.with_reference_year(year);
        self.reference_year = Some(year);
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn classifier(&self) -> &HybridClassifier {
        &self.classifier
    }

    /// Run the resolved OCR backends over an image, then [`Self::process`].
    pub fn process_image(
        &self,
        raw_bytes: &[u8],
        existing: &[StoredFingerprint],
    ) -> Result<PipelineOutcome, ProcessingError> {
        let backends = self.backends.as_ref().ok_or(EnsembleError::NoBackends)?;

        // Skip OCR entirely for bytes we already have.
        if let Some(outcome) = exact_duplicate(raw_bytes, existing) {
            return Ok(outcome);
        }

        let input = DocumentInput::new(raw_bytes, backends.run(raw_bytes));
        Ok(self.process(&input, existing))
    }

    /// Process one document against previously stored fingerprints.
    pub fn process(&self, input: &DocumentInput, existing: &[StoredFingerprint]) -> PipelineOutcome {
        if let Some(outcome) = exact_duplicate(&input.raw_bytes, existing) {
            return outcome;
        }

        let mut degraded = Vec::new();
        if input.ocr_results.len() < 2 {
            degraded.push(Degradation::SingleEngine);
        }

        let merged = merge_with_threshold(&input.ocr_results, self.settings.high_confidence);
        let text = sanitize_ocr_text(&merged.text);
        if text.trim().is_empty() {
            degraded.push(Degradation::NoTextExtracted);
        }

        let features = self.extractor.extract(&text);
        let decision = self.classifier.categorize(&text, &features.keywords);
        if self.settings.semantic_enabled && decision.embedding_score.is_none() {
            degraded.push(Degradation::KeywordOnly);
        }

        let tags = generate_tags(&text, &decision.main_category);
        let fields = match self.reference_year {
            Some(year) => extract_fields_for_year(&decision.main_category, &text, &features, year),
            None => extract_fields(&decision.main_category, &text, &features),
        };

        let fingerprint = self.detector.fingerprint(&input.raw_bytes, Some(&merged.text));
        let verdict = self.detector.check(&fingerprint, existing);
        let duplicate_candidate = !verdict.near_duplicates.is_empty();

        let low_confidence =
            decision.confidence < self.settings.low_confidence_threshold || !degraded.is_empty();

        let record = DocumentRecord {
            record_id: Uuid::new_v4(),
            document_date: features.document_date(),
            summary: features
                .keywords
                .iter()
                .take(SUMMARY_KEYWORDS)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" "),
            merged,
            features,
            decision,
            fingerprint,
            verdict,
            tags,
            fields,
            duplicate_candidate,
            degraded,
            low_confidence,
        };

        tracing::info!(
            record_id = %record.record_id,
            engine = %record.merged.winning_engine,
            category = %record.decision.main_category,
            confidence = record.decision.confidence,
            duplicate_candidate = record.duplicate_candidate,
            degraded = ?record.degraded,
            "Document processed"
        );

        PipelineOutcome::Processed(Box::new(record))
    }
}

fn exact_duplicate(raw_bytes: &[u8], existing: &[StoredFingerprint]) -> Option<PipelineOutcome> {
    let probe = ContentFingerprint {
        sha256: sha256_hex(raw_bytes),
        embedding: None,
    };
    let existing_id = find_exact(&probe, existing)?;
    tracing::info!(existing_id, sha256 = %probe.sha256, "Exact duplicate, skipping processing");
    Some(PipelineOutcome::ExactDuplicate {
        existing_id,
        sha256: probe.sha256,
    })
}
