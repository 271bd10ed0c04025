//! Startup resolution of OCR backends into the ordered set the pipeline runs.
//!
//! Availability is checked once here. Backends that are missing at startup are
//! dropped for the process lifetime; the first surviving backend is the primary.

use super::confidence::to_raw_result;
use super::types::{OcrBackend, RawOcrResult};
use super::EnsembleError;

pub type SharedBackend = Box<dyn OcrBackend + Send + Sync>;

/// The OCR engines resolved at startup, in registration order.
pub struct OcrBackendSet {
    backends: Vec<SharedBackend>,
}

impl OcrBackendSet {
    /// Keep the candidates whose `available()` returns true, preserving order.
    pub fn resolve(candidates: Vec<SharedBackend>) -> Result<Self, EnsembleError> {
        let mut backends = Vec::with_capacity(candidates.len());

        for backend in candidates {
            if backend.available() {
                tracing::info!(engine = backend.engine_id(), "OCR backend available");
                backends.push(backend);
            } else {
                tracing::warn!(
                    engine = backend.engine_id(),
                    "OCR backend unavailable, continuing without it"
                );
            }
        }

        if backends.is_empty() {
            return Err(EnsembleError::NoBackends);
        }

        if backends.len() == 1 {
            tracing::info!("Running in single-engine OCR mode");
        }

        Ok(Self { backends })
    }

    pub fn engine_ids(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.engine_id()).collect()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Run every backend over the image.
    ///
    /// A failing primary still contributes an empty, zero-confidence result so the
    /// merger keeps its primary slot; failing secondaries are left out.
    pub fn run(&self, image_bytes: &[u8]) -> Vec<RawOcrResult> {
        let mut results = Vec::with_capacity(self.backends.len());

        for (index, backend) in self.backends.iter().enumerate() {
            match backend.recognize(image_bytes) {
                Ok(page) => {
                    let raw = to_raw_result(backend.engine_id(), &page);
                    tracing::debug!(
                        engine = %raw.engine_id,
                        confidence = raw.confidence,
                        chars = raw.text.len(),
                        "OCR backend finished"
                    );
                    results.push(raw);
                }
                Err(e) if index == 0 => {
                    tracing::error!(engine = backend.engine_id(), error = %e, "Primary OCR backend failed");
                    results.push(RawOcrResult::empty(backend.engine_id()));
                }
                Err(e) => {
                    tracing::warn!(
                        engine = backend.engine_id(),
                        error = %e,
                        "Secondary OCR backend failed, falling back to remaining engines"
                    );
                }
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ensemble::ocr::{FailingOcrEngine, MockOcrEngine};

    fn boxed<B: OcrBackend + Send + Sync + 'static>(backend: B) -> SharedBackend {
        Box::new(backend)
    }

    #[test]
    fn resolve_drops_unavailable_backends() {
        let set = OcrBackendSet::resolve(vec![
            boxed(MockOcrEngine::new("tesseract", "Text", 90.0)),
            boxed(FailingOcrEngine::new("easyocr", false)),
        ])
        .unwrap();
        assert_eq!(set.engine_ids(), vec!["tesseract"]);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn resolve_fails_without_any_backend() {
        let result = OcrBackendSet::resolve(vec![boxed(FailingOcrEngine::new("easyocr", false))]);
        assert!(matches!(result, Err(EnsembleError::NoBackends)));
    }

    #[test]
    fn run_skips_failing_secondary() {
        let set = OcrBackendSet::resolve(vec![
            boxed(MockOcrEngine::new("tesseract", "Rechnung", 85.0)),
            boxed(FailingOcrEngine::new("easyocr", true)),
        ])
        .unwrap();
        let results = set.run(b"img");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].engine_id, "tesseract");
        assert!((results[0].confidence - 85.0).abs() < f32::EPSILON);
    }

    #[test]
    fn run_keeps_slot_for_failing_primary() {
        let set = OcrBackendSet::resolve(vec![
            boxed(FailingOcrEngine::new("tesseract", true)),
            boxed(MockOcrEngine::new("easyocr", "Vertrag", 70.0)),
        ])
        .unwrap();
        let results = set.run(b"img");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0], RawOcrResult::empty("tesseract"));
        assert_eq!(results[1].engine_id, "easyocr");
    }
}
