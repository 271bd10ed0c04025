use std::sync::LazyLock;

use regex::Regex;

/// German-formatted euro amounts: `1.234,56 €`, `€ 45,50`, `EUR 12,00`, `45,50 EUR`.
static AMOUNT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    const NUMBER: &str = r"((?:\d{1,3}(?:\.\d{3})+|\d+),\d{2})";
    [
        format!(r"{NUMBER}\s*€"),
        format!(r"€\s*{NUMBER}"),
        format!(r"(?i)\bEUR\s*{NUMBER}"),
        format!(r"(?i){NUMBER}\s*EUR\b"),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid amount pattern"))
    .collect()
});

/// Extract positive euro amounts, largest first, without duplicates.
pub fn extract_amounts(text: &str) -> Vec<f64> {
    let mut amounts: Vec<f64> = Vec::new();

    for pattern in AMOUNT_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            let Some(raw) = caps.get(1) else {
                continue;
            };
            let Some(value) = parse_german_amount(raw.as_str()) else {
                continue;
            };
            if !amounts.iter().any(|existing| existing.to_bits() == value.to_bits()) {
                amounts.push(value);
            }
        }
    }

    amounts.sort_by(|a, b| b.total_cmp(a));
    amounts
}

/// `1.234,56` -> 1234.56. Only strictly positive, finite values are returned.
pub fn parse_german_amount(raw: &str) -> Option<f64> {
    let normalized = raw.replace('.', "").replace(',', ".");
    let value: f64 = normalized.parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_separator_and_euro_sign() {
        assert_eq!(extract_amounts("Summe: 1.234,56 €"), vec![1234.56]);
    }

    #[test]
    fn eur_suffix_and_prefix() {
        assert_eq!(extract_amounts("Gesamtbetrag: 45,50 EUR"), vec![45.5]);
        assert_eq!(extract_amounts("Betrag EUR 12,00"), vec![12.0]);
        assert_eq!(extract_amounts("zahlbar € 9,99"), vec![9.99]);
    }

    #[test]
    fn sorted_descending_and_deduplicated() {
        let text = "Netto 38,24 €\nMwSt 7,26 €\nBrutto 45,50 €\nZu zahlen: 45,50 EUR";
        assert_eq!(extract_amounts(text), vec![45.5, 38.24, 7.26]);
    }

    #[test]
    fn zero_amounts_are_dropped() {
        assert_eq!(extract_amounts("Gutschrift 0,00 € und Rest 3,10 €"), vec![3.1]);
    }

    #[test]
    fn plain_numbers_without_currency_ignored() {
        assert!(extract_amounts("Kundennummer 12,34 und 2024").is_empty());
        assert!(extract_amounts("Vertrag Nr. 1.234").is_empty());
    }

    #[test]
    fn lowercase_eur_accepted() {
        assert_eq!(extract_amounts("gesamt 100,00 eur"), vec![100.0]);
    }

    #[test]
    fn parse_helper() {
        assert_eq!(parse_german_amount("1.000.000,01"), Some(1_000_000.01));
        assert_eq!(parse_german_amount("0,00"), None);
        assert_eq!(parse_german_amount("abc"), None);
    }
}
