use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Structured signals pulled out of merged OCR text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFeatures {
    /// Newest first; `dates[0]` is the document date.
    pub dates: Vec<NaiveDate>,
    /// Largest first; `amounts[0]` is taken as the total.
    pub amounts: Vec<f64>,
    /// Most frequent first.
    pub keywords: Vec<String>,
    pub detected_language: Option<String>,
    /// Extraction quality in [0, 1].
    pub quality: f64,
}

impl ExtractedFeatures {
    /// True when no date, amount or keyword was found.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() && self.amounts.is_empty() && self.keywords.is_empty()
    }

    pub fn document_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn total_amount(&self) -> Option<f64> {
        self.amounts.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_use_sort_conventions() {
        let features = ExtractedFeatures {
            dates: vec![
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            ],
            amounts: vec![120.0, 19.0],
            keywords: vec!["rechnung".into()],
            detected_language: Some("de".into()),
            quality: 1.0,
        };
        assert_eq!(features.document_date(), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(features.total_amount(), Some(120.0));
        assert!(!features.is_empty());
        assert!(ExtractedFeatures::default().is_empty());
    }

    #[test]
    fn dates_serialize_as_iso_strings() {
        let features = ExtractedFeatures {
            dates: vec![NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()],
            ..Default::default()
        };
        let json = serde_json::to_value(&features).unwrap();
        assert_eq!(json["dates"][0], "2024-01-15");
    }
}
