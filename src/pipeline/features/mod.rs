pub mod types;
pub mod sanitize;
pub mod dates;
pub mod amounts;
pub mod keywords;
pub mod language_detect;
pub mod quality;
pub mod fields;

pub use types::*;
pub use sanitize::*;
pub use fields::*;

use chrono::{Datelike, Local};

use self::amounts::extract_amounts;
use self::dates::extract_dates;
use self::keywords::{extract_keywords, DEFAULT_MAX_KEYWORDS};
use self::language_detect::detect_language;
use self::quality::extraction_quality;

/// Texts with fewer trimmed characters than this are treated as "nothing extracted".
pub const MIN_TEXT_CHARS: usize = 10;

/// Regex/heuristic passes over merged OCR text.
///
/// Holds no mutable state; one instance can be shared across worker threads.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    max_keywords: usize,
    reference_year: Option<i32>,
}

impl FeatureExtractor {
    pub fn new(max_keywords: usize) -> Self {
        Self {
            max_keywords,
            reference_year: None,
        }
    }

    /// Pin the "current year" used for the date plausibility window.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = Some(year);
        self
    }

    pub fn max_keywords(&self) -> usize {
        self.max_keywords
    }

    fn current_year(&self) -> i32 {
        self.reference_year.unwrap_or_else(|| Local::now().year())
    }

    /// Extract dates, amounts, keywords and language from `text`.
    ///
    /// Empty or near-empty text yields empty collections, never an error.
    pub fn extract(&self, text: &str) -> ExtractedFeatures {
        if text.trim().chars().count() < MIN_TEXT_CHARS {
            tracing::warn!(chars = text.trim().chars().count(), "Too little text to extract features");
            return ExtractedFeatures::default();
        }

        let dates = extract_dates(text, self.current_year());
        if dates.is_empty() {
            tracing::warn!("No date recognised in document");
        }

        let mut features = ExtractedFeatures {
            dates,
            amounts: extract_amounts(text),
            keywords: extract_keywords(text, self.max_keywords),
            detected_language: Some(detect_language(text)),
            quality: 0.0,
        };
        features.quality = extraction_quality(text, &features);

        tracing::debug!(
            dates = features.dates.len(),
            amounts = features.amounts.len(),
            keywords = features.keywords.len(),
            language = features.detected_language.as_deref().unwrap_or("-"),
            quality = features.quality,
            "Features extracted"
        );

        features
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_KEYWORDS)
    }
}

/// Extract with default settings (20 keywords, current calendar year).
pub fn extract(text: &str) -> ExtractedFeatures {
    FeatureExtractor::default().extract(text)
}
