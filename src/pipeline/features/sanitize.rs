/// Sanitize merged OCR text before feature extraction.
/// Strips control characters and OCR noise symbols, keeps umlauts, currency signs
/// and the punctuation dates and amounts depend on.
pub fn sanitize_ocr_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| {
            c.is_alphanumeric()
                || c.is_whitespace()
                || matches!(
                    c,
                    '.' | ','
                        | ';'
                        | ':'
                        | '-'
                        | '/'
                        | '('
                        | ')'
                        | '+'
                        | '='
                        | '%'
                        | '#'
                        | '@'
                        | '&'
                        | '\''
                        | '"'
                        | '!'
                        | '?'
                        | '*'
                        | '_'
                        | '€'
                        | '$'
                        | '§'
                        | '„'
                        | '“'
                        | '«'
                        | '»'
                        | '\u{2013}' // En-dash
                )
        })
        .collect::<String>()
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_control_characters() {
        let raw = "Betrag: 45,50 EUR\x01\x02\x00\nDatum: 15.01.2024";
        let clean = sanitize_ocr_text(raw);
        assert_eq!(clean, "Betrag: 45,50 EUR\nDatum: 15.01.2024");
    }

    #[test]
    fn keeps_umlauts_and_currency() {
        let raw = "Überweisung für Müller & Söhne: € 1.234,56";
        assert_eq!(sanitize_ocr_text(raw), raw);
    }

    #[test]
    fn drops_blank_lines_and_trims() {
        let raw = "  RECHNUNG  \n\n   \n\tStromverbrauch ";
        assert_eq!(sanitize_ocr_text(raw), "RECHNUNG\nStromverbrauch");
    }

    #[test]
    fn removes_ocr_noise_symbols() {
        let raw = "Kunden|nummer ~ 4711 ¬";
        assert_eq!(sanitize_ocr_text(raw), "Kundennummer  4711");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(sanitize_ocr_text(""), "");
    }
}
