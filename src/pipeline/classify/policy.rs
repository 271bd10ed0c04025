use super::types::{DecisionSource, ScoredCategory};

pub mod thresholds {
    /// Keyword confidence above which keywords win outright.
    pub const KEYWORD_DECISIVE: f64 = 0.7;
    /// Embedding confidence above which the embedding wins (when keywords are not decisive).
    pub const EMBEDDING_DECISIVE: f64 = 0.6;
}

/// Combine keyword and embedding results, first matching rule wins:
/// 1. keyword confidence > 0.7: keywords;
/// 2. embedding confidence > 0.6: embedding;
/// 3. keyword confidence > embedding confidence: keywords;
/// 4. embedding if it produced a category, else keywords, with the larger
///    of both confidences.
///
/// Without an embedding result the keyword result is returned unchanged.
pub fn merge_scores(
    keyword: &ScoredCategory,
    embedding: Option<&ScoredCategory>,
) -> (ScoredCategory, DecisionSource) {
    let Some(embedding) = embedding else {
        return (keyword.clone(), DecisionSource::Keywords);
    };

    if keyword.confidence > thresholds::KEYWORD_DECISIVE {
        (keyword.clone(), DecisionSource::Keywords)
    } else if embedding.confidence > thresholds::EMBEDDING_DECISIVE {
        (embedding.clone(), DecisionSource::Embedding)
    } else if keyword.confidence > embedding.confidence {
        (keyword.clone(), DecisionSource::Keywords)
    } else {
        let confidence = keyword.confidence.max(embedding.confidence);
        if embedding.category.is_empty() {
            (ScoredCategory::new(keyword.category.clone(), confidence), DecisionSource::Keywords)
        } else {
            (ScoredCategory::new(embedding.category.clone(), confidence), DecisionSource::Embedding)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(category: &str, confidence: f64) -> ScoredCategory {
        ScoredCategory::new(category, confidence)
    }

    #[test]
    fn keyword_only_without_embedding() {
        let (result, source) = merge_scores(&scored("Rechnungen", 0.2), None);
        assert_eq!(result, scored("Rechnungen", 0.2));
        assert_eq!(source, DecisionSource::Keywords);
    }

    #[test]
    fn decisive_keywords_beat_confident_embedding() {
        let (result, source) = merge_scores(&scored("Rechnungen", 0.71), Some(&scored("Bank", 0.99)));
        assert_eq!(result.category, "Rechnungen");
        assert!((result.confidence - 0.71).abs() < 1e-9);
        assert_eq!(source, DecisionSource::Keywords);
    }

    #[test]
    fn keyword_threshold_is_strict() {
        let (result, _) = merge_scores(&scored("Rechnungen", 0.7), Some(&scored("Bank", 0.65)));
        assert_eq!(result.category, "Bank");
    }

    #[test]
    fn confident_embedding_wins_over_weak_keywords() {
        let (result, source) = merge_scores(&scored("Rechnungen", 0.65), Some(&scored("Bank", 0.61)));
        assert_eq!(result, scored("Bank", 0.61));
        assert_eq!(source, DecisionSource::Embedding);
    }

    #[test]
    fn weak_signals_prefer_stronger_keywords() {
        let (result, source) = merge_scores(&scored("Rechnungen", 0.55), Some(&scored("Bank", 0.5)));
        assert_eq!(result, scored("Rechnungen", 0.55));
        assert_eq!(source, DecisionSource::Keywords);
    }

    #[test]
    fn weak_signals_prefer_embedding_on_tie_or_higher() {
        let (result, source) = merge_scores(&scored("Rechnungen", 0.4), Some(&scored("Bank", 0.55)));
        assert_eq!(result, scored("Bank", 0.55));
        assert_eq!(source, DecisionSource::Embedding);

        let (result, _) = merge_scores(&scored("Rechnungen", 0.5), Some(&scored("Bank", 0.5)));
        assert_eq!(result, scored("Bank", 0.5));
    }

    #[test]
    fn empty_embedding_category_falls_back_to_keywords() {
        let (result, source) = merge_scores(&scored("Sonstiges", 0.0), Some(&scored("", 0.3)));
        assert_eq!(result, scored("Sonstiges", 0.3));
        assert_eq!(source, DecisionSource::Keywords);
    }
}
