//! Date recognition for German (and, as a fallback, English) documents.
//!
//! Patterns are tried in priority order: dates introduced by a context word
//! ("Datum", "vom", "am", "den"), bare numeric dates, then written-out month
//! names. Every match is parsed independently; a match that does not form a
//! plausible calendar date is skipped without affecting the others.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

/// Earliest year accepted as a document date.
pub const MIN_YEAR: i32 = 1990;

static CONTEXT_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:datum|vom|am|den)\s*[:.]?\s*(\d{1,2}[./]\d{1,2}[./]\d{2,4})")
        .expect("Invalid context date pattern")
});

static BARE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2}[./]\d{1,2}[./]\d{2,4})").expect("Invalid bare date pattern")
});

static TEXTUAL_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})\.?\s+(januar|jänner|februar|märz|maerz|april|mai|juni|juli|august|september|oktober|november|dezember|january|february|march|may|june|july|october|december)\s+(\d{4})\b",
    )
    .expect("Invalid textual date pattern")
});

static NUMERIC_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[./]").expect("Invalid date separator pattern"));

/// Extract plausible dates, newest first, without duplicates.
///
/// Years outside `[MIN_YEAR, current_year + 1]` are rejected.
pub fn extract_dates(text: &str, current_year: i32) -> Vec<NaiveDate> {
    let max_year = current_year + 1;
    let mut seen = HashSet::new();
    let mut dates = Vec::new();

    let numeric = [&*CONTEXT_DATE, &*BARE_DATE].into_iter().flat_map(|pattern| {
        pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| parse_numeric_date(m.as_str()))
    });
    let textual = TEXTUAL_DATE.captures_iter(text).map(|caps| {
        parse_textual_date(
            caps.get(1).map_or("", |m| m.as_str()),
            caps.get(2).map_or("", |m| m.as_str()),
            caps.get(3).map_or("", |m| m.as_str()),
        )
    });

    for candidate in numeric.chain(textual) {
        let Some(date) = candidate else {
            continue;
        };
        if !(MIN_YEAR..=max_year).contains(&date.year()) {
            tracing::trace!(%date, "Date outside plausible range, skipped");
            continue;
        }
        if seen.insert(date) {
            dates.push(date);
        }
    }

    dates.sort_unstable_by(|a, b| b.cmp(a));
    dates
}

/// Parse `d.m.y` / `d/m/y`; when that is not a calendar date, retry as `m/d/y`.
pub fn parse_numeric_date(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = NUMERIC_SEPARATOR.split(raw).collect();
    let [first, second, year] = parts.as_slice() else {
        return None;
    };

    let first: u32 = first.parse().ok()?;
    let second: u32 = second.parse().ok()?;
    let year = normalize_year(year)?;

    NaiveDate::from_ymd_opt(year, second, first).or_else(|| NaiveDate::from_ymd_opt(year, first, second))
}

fn parse_textual_date(day: &str, month_name: &str, year: &str) -> Option<NaiveDate> {
    let day: u32 = day.parse().ok()?;
    let month = month_number(month_name)?;
    let year: i32 = year.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Two-digit years: 00-68 map to 20xx, 69-99 to 19xx.
fn normalize_year(raw: &str) -> Option<i32> {
    let value: i32 = raw.parse().ok()?;
    match raw.len() {
        2 if value <= 68 => Some(2000 + value),
        2 => Some(1900 + value),
        4 => Some(value),
        _ => None,
    }
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "januar" | "jänner" | "january" => 1,
        "februar" | "february" => 2,
        "märz" | "maerz" | "march" => 3,
        "april" => 4,
        "mai" | "may" => 5,
        "juni" | "june" => 6,
        "juli" | "july" => 7,
        "august" => 8,
        "september" => 9,
        "oktober" | "october" => 10,
        "november" => 11,
        "dezember" | "december" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn context_date_is_found() {
        let dates = extract_dates("Rechnungsdatum: 15.01.2024", 2026);
        assert_eq!(dates, vec![ymd(2024, 1, 15)]);
    }

    #[test]
    fn dates_sorted_newest_first_and_deduplicated() {
        let text = "Datum: 15.01.2024\nLeistung vom 01.12.2023 bis 31.12.2023\nDatum 15.01.2024";
        let dates = extract_dates(text, 2026);
        assert_eq!(dates, vec![ymd(2024, 1, 15), ymd(2023, 12, 31), ymd(2023, 12, 1)]);
    }

    #[test]
    fn rejects_years_outside_window() {
        let current = 2026;
        let text = format!("Datum: 01.01.1899\nam 02.02.{}\nden 03.03.{}", current + 2, current + 1);
        let dates = extract_dates(&text, current);
        assert_eq!(dates, vec![ymd(current + 1, 3, 3)]);
        assert!(extract_dates("vom 31.12.1989", current).is_empty());
        assert_eq!(extract_dates("vom 01.01.1990", current), vec![ymd(1990, 1, 1)]);
    }

    #[test]
    fn slash_dates_and_two_digit_years() {
        assert_eq!(parse_numeric_date("05/03/24"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_numeric_date("05.03.99"), Some(ymd(1999, 3, 5)));
        assert_eq!(parse_numeric_date("1.2.024"), None);
    }

    #[test]
    fn english_month_day_order_as_fallback() {
        // 13th month does not exist, so 12/13/2023 is read month-first
        assert_eq!(parse_numeric_date("12/13/2023"), Some(ymd(2023, 12, 13)));
    }

    #[test]
    fn impossible_dates_are_skipped_silently() {
        let dates = extract_dates("Datum: 31.02.2024 und 10.04.2024", 2026);
        assert_eq!(dates, vec![ymd(2024, 4, 10)]);
        assert!(extract_dates("Datum: 45.45.2024", 2026).is_empty());
    }

    #[test]
    fn written_out_months() {
        let dates = extract_dates("Berlin, den 3. März 2024 sowie 12 January 2023", 2026);
        assert_eq!(dates, vec![ymd(2024, 3, 3), ymd(2023, 1, 12)]);
    }

    #[test]
    fn amounts_are_not_mistaken_for_dates() {
        assert!(extract_dates("Summe 1.234,56 EUR", 2026).is_empty());
    }

    #[test]
    fn no_dates_in_plain_text() {
        assert!(extract_dates("Keine Angaben vorhanden", 2026).is_empty());
    }
}
