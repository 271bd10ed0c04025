use std::collections::HashSet;

use super::taxonomy::Taxonomy;
use super::types::ScoredCategory;
use super::FALLBACK_CATEGORY;

pub mod weights {
    /// Trigger found as a whole word in the text.
    pub const WHOLE_WORD: f64 = 2.0;
    /// Trigger found only inside a longer word.
    pub const SUBSTRING: f64 = 1.0;
    /// Trigger present in the caller's keyword list (on top of the text match).
    pub const KEYWORD_LIST: f64 = 1.5;
}

/// Raw keyword score per category, in taxonomy order.
pub fn category_scores(taxonomy: &Taxonomy, text: &str, keywords: &[String]) -> Vec<(String, f64)> {
    let text_lower = text.to_lowercase();
    let keyword_set: HashSet<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    taxonomy
        .categories()
        .iter()
        .map(|category| {
            let score: f64 = category
                .keywords
                .iter()
                .map(|trigger| trigger_score(trigger, &text_lower, &keyword_set))
                .sum();
            (category.name.clone(), score)
        })
        .collect()
}

fn trigger_score(trigger: &str, text_lower: &str, keyword_set: &HashSet<String>) -> f64 {
    let mut score = 0.0;
    if contains_whole_word(text_lower, trigger) {
        score += weights::WHOLE_WORD;
    } else if text_lower.contains(trigger) {
        score += weights::SUBSTRING;
    }
    if keyword_set.contains(trigger) {
        score += weights::KEYWORD_LIST;
    }
    score
}

/// Keyword classification: highest score wins (earliest category on ties),
/// confidence = best score / sum of all scores.
///
/// All-zero scores yield "Sonstiges" with confidence 0.
pub fn classify_by_keywords(taxonomy: &Taxonomy, text: &str, keywords: &[String]) -> ScoredCategory {
    let scores = category_scores(taxonomy, text, keywords);

    let mut best: Option<&(String, f64)> = None;
    for entry in &scores {
        if best.map_or(true, |b| entry.1 > b.1) {
            best = Some(entry);
        }
    }

    let total: f64 = scores.iter().map(|(_, s)| s).sum();
    match best {
        Some((name, score)) if *score > 0.0 && total > 0.0 => {
            tracing::debug!(category = %name, score, total, "Keyword scoring");
            ScoredCategory::new(name.clone(), (score / total).min(1.0))
        }
        _ => ScoredCategory::new(FALLBACK_CATEGORY, 0.0),
    }
}

/// True when `needle` occurs in `haystack` delimited by non-alphanumeric
/// characters or the text edges on both sides.
pub fn contains_whole_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, matched)| {
        let end = start + matched.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..].chars().next().map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}
