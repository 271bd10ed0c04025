use super::types::{OcrPageResult, OcrToken, RawOcrResult};

/// Engine-scale (0-100) confidence thresholds used by the merger.
pub mod thresholds {
    /// At or above this an engine's output is trusted on its own.
    pub const HIGH_CONF: f32 = 80.0;

    /// Primary output with fewer non-whitespace characters than this counts as "too short".
    pub const PRIMARY_MIN_CHARS: usize = 20;

    /// Secondary output must have more non-whitespace characters than this to replace
    /// a too-short primary.
    pub const SECONDARY_MIN_CHARS: usize = 50;
}

/// Mean confidence over tokens the engine actually scored (confidence > 0).
/// An engine with no scored tokens has confidence 0.
pub fn engine_confidence(tokens: &[OcrToken]) -> f32 {
    let (sum, count) = tokens
        .iter()
        .filter(|t| t.confidence > 0.0)
        .fold((0.0f64, 0usize), |(sum, count), t| (sum + t.confidence as f64, count + 1));

    if count == 0 {
        return 0.0;
    }

    (sum / count as f64).clamp(0.0, 100.0) as f32
}

/// Reduce a backend's page output to the text+confidence pair the merger consumes.
pub fn to_raw_result(engine_id: &str, page: &OcrPageResult) -> RawOcrResult {
    RawOcrResult::new(engine_id, page.text.clone(), engine_confidence(&page.tokens))
}

/// Count of non-whitespace characters, the length measure used by the too-short rule.
pub fn significant_chars(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(text: &str, confidence: f32) -> OcrToken {
        OcrToken {
            text: text.to_string(),
            confidence,
            bounding_box: None,
        }
    }

    #[test]
    fn mean_of_positive_tokens() {
        let tokens = vec![token("Rechnung", 90.0), token("Nr", 70.0)];
        assert!((engine_confidence(&tokens) - 80.0).abs() < f32::EPSILON);
    }

    #[test]
    fn unscored_tokens_are_ignored() {
        let tokens = vec![token("Strom", 60.0), token("??", -1.0), token("", 0.0)];
        assert!((engine_confidence(&tokens) - 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn no_tokens_means_zero_confidence() {
        assert_eq!(engine_confidence(&[]), 0.0);
        assert_eq!(engine_confidence(&[token("x", -1.0)]), 0.0);
    }

    #[test]
    fn raw_result_carries_engine_and_text() {
        let page = OcrPageResult {
            text: "Gesamtbetrag 45,50 EUR".into(),
            tokens: vec![token("Gesamtbetrag", 88.0), token("45,50", 92.0), token("EUR", 96.0)],
        };
        let raw = to_raw_result("easyocr", &page);
        assert_eq!(raw.engine_id, "easyocr");
        assert_eq!(raw.text, "Gesamtbetrag 45,50 EUR");
        assert!((raw.confidence - 92.0).abs() < 0.001);
    }

    #[test]
    fn significant_chars_skips_whitespace() {
        assert_eq!(significant_chars("  a b\n\tc  "), 3);
        assert_eq!(significant_chars(""), 0);
    }
}
