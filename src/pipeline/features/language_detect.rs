//! Lightweight language detection for merged OCR text.
//!
//! Distinguishes German from English by indicator-word frequency plus an
//! umlaut bonus. German wins short texts and ties, since nearly every
//! archived letter is German.

const GERMAN_INDICATORS: &[&str] = &[
    // Function words
    "der ", "die ", "das ", "und ", "ist ", "nicht ", "mit ", "für ", "auf ", "ein ",
    "eine ", "den ", "dem ", "des ", "sie ", "wir ", "ihr ", "bitte ", "sehr ", "vom ",
    // Correspondence and billing vocabulary
    "rechnung", "betrag", "datum", "zahlung", "vertrag", "versicherung", "kunden",
    "mit freundlichen", "sehr geehrte", "bescheid", "konto", "überweisung", "mwst",
    "straße", "frist", "kündigung",
];

const ENGLISH_INDICATORS: &[&str] = &[
    "the ", "and ", "was ", "for ", "are ", "but ", "not ", "you ",
    "your ", "this ", "that ", "with ", "have ", "from ", "will ", "please ",
    "invoice", "amount", "payment", "contract", "insurance", "account",
    "dear ", "sincerely", "total", "due ",
];

/// Detect the primary language of the text: "de" or "en".
pub fn detect_language(text: &str) -> String {
    if text.trim().chars().count() < 20 {
        return "de".to_string();
    }

    let lower = text.to_lowercase();

    let german = count_indicators(&lower, GERMAN_INDICATORS) + count_german_letters(&lower);
    let english = count_indicators(&lower, ENGLISH_INDICATORS);

    if german >= english {
        "de".to_string()
    } else {
        "en".to_string()
    }
}

fn count_indicators(lower_text: &str, indicators: &[&str]) -> u32 {
    indicators
        .iter()
        .map(|indicator| lower_text.matches(indicator).count() as u32)
        .sum()
}

/// Each two umlauts or ß count as one point.
fn count_german_letters(lower_text: &str) -> u32 {
    let count = lower_text
        .chars()
        .filter(|ch| matches!(ch, 'ä' | 'ö' | 'ü' | 'ß'))
        .count() as u32;
    count / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_german_invoice() {
        let text = "RECHNUNG\nDatum: 15.01.2024\nStromverbrauch\nGesamtbetrag: 45,50 EUR";
        assert_eq!(detect_language(text), "de");
    }

    #[test]
    fn detects_english_letter() {
        let text = "Dear customer, please find the invoice for your account attached. The total amount is due next week.";
        assert_eq!(detect_language(text), "en");
    }

    #[test]
    fn detects_german_letter() {
        let text = "Sehr geehrte Damen und Herren, die Kündigung für den Vertrag ist bei uns eingegangen.";
        assert_eq!(detect_language(text), "de");
    }

    #[test]
    fn short_text_defaults_to_german() {
        assert_eq!(detect_language("Invoice total"), "de");
        assert_eq!(detect_language(""), "de");
    }

    #[test]
    fn tie_defaults_to_german() {
        assert_eq!(detect_language("0123456789 0123456789 0123456789"), "de");
    }
}
