use super::types::ExtractedFeatures;

pub mod thresholds {
    /// Text longer than this (in chars) earns the length component.
    pub const MIN_TEXT_CHARS: usize = 50;
    pub const TEXT_WEIGHT: f64 = 0.3;
    pub const DATE_WEIGHT: f64 = 0.3;
    pub const AMOUNT_WEIGHT: f64 = 0.2;
    pub const LANGUAGE_WEIGHT: f64 = 0.2;
}

/// Heuristic extraction quality in [0, 1].
///
/// Rewards enough text, at least one date, at least one amount and
/// German as detected language.
pub fn extraction_quality(text: &str, features: &ExtractedFeatures) -> f64 {
    let mut score = 0.0;

    if text.chars().count() > thresholds::MIN_TEXT_CHARS {
        score += thresholds::TEXT_WEIGHT;
    }
    if !features.dates.is_empty() {
        score += thresholds::DATE_WEIGHT;
    }
    if !features.amounts.is_empty() {
        score += thresholds::AMOUNT_WEIGHT;
    }
    if features.detected_language.as_deref() == Some("de") {
        score += thresholds::LANGUAGE_WEIGHT;
    }

    f64::min(score, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const LONG: &str = "Dieser Text ist deutlich länger als fünfzig Zeichen, damit er zählt.";

    #[test]
    fn full_score() {
        let features = ExtractedFeatures {
            dates: vec![NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()],
            amounts: vec![45.5],
            detected_language: Some("de".into()),
            ..Default::default()
        };
        assert!((extraction_quality(LONG, &features) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn partial_scores() {
        let english = ExtractedFeatures {
            detected_language: Some("en".into()),
            ..Default::default()
        };
        assert!((extraction_quality(LONG, &english) - 0.3).abs() < 1e-9);

        let german_short = ExtractedFeatures {
            amounts: vec![1.0],
            detected_language: Some("de".into()),
            ..Default::default()
        };
        assert!((extraction_quality("kurz", &german_short) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn nothing_found_scores_zero() {
        assert_eq!(extraction_quality("", &ExtractedFeatures::default()), 0.0);
    }
}
