use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Tag rules: a tag applies when any of its needles occurs in the lowercased text.
const TAG_RULES: &[(&str, &[&str])] = &[
    ("dringend", &["mahnung", "zahlungserinnerung", "frist", "sofort", "fällig"]),
    ("steuer", &["steuer", "finanzamt", "elster", "bescheid"]),
    ("garantie", &["garantie", "gewährleistung", "kaufbeleg"]),
    ("abo", &["monatlich", "abonnement", "kündbar"]),
    ("auto", &["kfz", "auto", "werkstatt", "tüv", "tankstelle"]),
    ("wohnen", &["miete", "nebenkosten", "strom", "gas", "wasser", "vermieter"]),
    ("gesundheit", &["arzt", "apotheke", "krankenkasse", "rezept"]),
    ("reise", &["bahn", "flug", "hotel", "ticket", "buchung"]),
];

static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"20\d{2}").expect("Invalid year pattern"));

/// Rule-based tags plus `cat:<category>` and one `year:<yyyy>` per year
/// mentioned in the text. Sorted, without duplicates.
pub fn generate_tags(text: &str, category: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut tags = BTreeSet::new();

    for (tag, needles) in TAG_RULES {
        if needles.iter().any(|n| lower.contains(n)) {
            tags.insert(tag.to_string());
        }
    }

    if !category.is_empty() {
        tags.insert(format!("cat:{}", category.to_lowercase()));
    }

    for year in YEAR.find_iter(text) {
        tags.insert(format!("year:{}", year.as_str()));
    }

    tags.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoice_tags() {
        let tags = generate_tags("RECHNUNG\nDatum: 15.01.2024\nStromverbrauch, fällig am 01.02.2024", "Rechnungen");
        assert_eq!(tags, vec!["cat:rechnungen", "dringend", "wohnen", "year:2024"]);
    }

    #[test]
    fn multiple_years_and_rules() {
        let tags = generate_tags("Bahn Ticket 2023, Hotel Buchung 2024, Apotheke", "Sonstiges");
        assert_eq!(
            tags,
            vec!["cat:sonstiges", "gesundheit", "reise", "year:2023", "year:2024"]
        );
    }

    #[test]
    fn umlaut_needles_match() {
        let tags = generate_tags("TÜV-Bericht der Werkstatt", "Verträge");
        assert_eq!(tags, vec!["auto", "cat:verträge"]);
    }

    #[test]
    fn empty_category_adds_no_cat_tag() {
        assert!(generate_tags("", "").is_empty());
    }
}
