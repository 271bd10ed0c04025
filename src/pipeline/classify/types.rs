use serde::{Deserialize, Serialize};

/// Which signal decided the main category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    Keywords,
    Embedding,
    /// No text and no keywords.
    Empty,
}

/// Result of classifying one document against the taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDecision {
    /// A taxonomy category or "Sonstiges".
    pub main_category: String,
    pub sub_category: String,
    /// In [0, 1].
    pub confidence: f64,
    /// Keyword confidence (best score / sum of scores).
    pub keyword_score: f64,
    /// Embedding confidence; `None` when the semantic layer did not run.
    pub embedding_score: Option<f64>,
    pub source: DecisionSource,
}

/// Outcome of one scoring method: the best category and its confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCategory {
    pub category: String,
    pub confidence: f64,
}

impl ScoredCategory {
    pub fn new(category: impl Into<String>, confidence: f64) -> Self {
        Self {
            category: category.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scored_category_clamps() {
        assert_eq!(ScoredCategory::new("Bank", 1.4).confidence, 1.0);
        assert_eq!(ScoredCategory::new("Bank", -0.2).confidence, 0.0);
    }

    #[test]
    fn decision_serializes_snake_case_source() {
        let decision = CategoryDecision {
            main_category: "Rechnungen".into(),
            sub_category: "Strom".into(),
            confidence: 0.8,
            keyword_score: 0.8,
            embedding_score: None,
            source: DecisionSource::Keywords,
        };
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["source"], "keywords");
        assert!(json["embedding_score"].is_null());
    }
}
