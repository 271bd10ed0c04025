use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

pub const DEFAULT_MAX_KEYWORDS: usize = 20;

/// German function words that never count as keywords.
pub const STOP_WORDS: &[&str] = &[
    "der", "die", "das", "und", "oder", "aber", "ein", "eine", "einen", "dem", "den", "des", "im",
    "in", "von", "zu", "mit", "auf", "für", "ist", "sind", "wird", "werden", "wurde", "wurden",
    "sein", "haben", "hat", "kann", "soll", "muss", "dass", "als", "wenn", "wie", "bei", "nach",
    "vor", "über", "unter", "zwischen", "durch", "an", "aus",
];

static STOP_SET: LazyLock<HashSet<&'static str>> = LazyLock::new(|| STOP_WORDS.iter().copied().collect());

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zäöüß]{3,}\b").expect("Invalid keyword pattern"));

/// Most frequent non-stop-words (lowercased, >= 3 letters), up to `max_keywords`.
/// Equal counts keep the order of first occurrence.
pub fn extract_keywords(text: &str, max_keywords: usize) -> Vec<String> {
    let lowered = text.to_lowercase();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for m in WORD.find_iter(&lowered) {
        let word = m.as_str();
        if STOP_SET.contains(word) {
            continue;
        }
        let count = counts.entry(word).or_insert(0);
        if *count == 0 {
            order.push(word);
        }
        *count += 1;
    }

    // Stable sort: ties stay in first-seen order
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order
        .into_iter()
        .take(max_keywords)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_ordering() {
        let text = "Strom Rechnung Strom Zähler Strom Rechnung";
        assert_eq!(extract_keywords(text, 20), vec!["strom", "rechnung", "zähler"]);
    }

    #[test]
    fn stop_words_and_short_words_removed() {
        let text = "Die Rechnung für das Haus ist da und wir zahlen bei Eingang";
        let keywords = extract_keywords(text, 20);
        assert_eq!(keywords, vec!["rechnung", "haus", "wir", "zahlen", "eingang"]);
    }

    #[test]
    fn respects_limit() {
        let text = "eins zwei drei vier fünf sechs";
        assert_eq!(extract_keywords(text, 2), vec!["eins", "zwei"]);
        assert!(extract_keywords(text, 0).is_empty());
    }

    #[test]
    fn digits_are_not_part_of_words() {
        let keywords = extract_keywords("Kunde 4711 Vertrag2024 Ende", 20);
        assert_eq!(keywords, vec!["kunde", "ende"]);
    }

    #[test]
    fn umlauts_and_eszett_kept() {
        let keywords = extract_keywords("Gebühr Straße Gebühr", 20);
        assert_eq!(keywords, vec!["gebühr", "straße"]);
    }

    #[test]
    fn empty_text() {
        assert!(extract_keywords("", 20).is_empty());
    }
}
