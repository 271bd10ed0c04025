//! Category-specific document fields (invoice, insurance, contract, bank, tax).
//!
//! Built on top of [`ExtractedFeatures`]: dates are newest first, amounts
//! largest first, so "first date" and "largest amount" are index 0.

use std::sync::LazyLock;

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::types::ExtractedFeatures;

const MAX_COMPANY_CHARS: usize = 100;
const MAX_DESCRIPTION_CHARS: usize = 100;
const COMPANY_SCAN_LINES: usize = 10;
const UNKNOWN_COMPANY: &str = "Unbekannt";

static LEGAL_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:gmbh|ag|kg|ohg|se|kgaa|e\.v)\b").expect("Invalid legal form pattern")
});

static POLICY_NUMBER: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"police[-\s]?nr\.?\s*:?\s*(\w+)",
        r"versicherungsnummer\s*:?\s*(\w+)",
        r"vertragsnummer\s*:?\s*(\w+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid policy number pattern"))
    .collect()
});

static NOTICE_PERIOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(monat|wochen|tag)").expect("Invalid notice period pattern"));

static TAX_OFFICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"finanzamt[ \t]+([a-zäöüß -]+)").expect("Invalid tax office pattern"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceFields {
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub company: String,
    pub expense_category: String,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceFields {
    pub insurer: String,
    pub policy_number: Option<String>,
    pub premium: Option<f64>,
    pub payment_interval: String,
    pub term_end: Option<NaiveDate>,
    pub insurance_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractFields {
    pub counterparty: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub notice_period: Option<String>,
    pub monthly_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankFields {
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub document_type: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxFields {
    pub year: i32,
    pub amount: Option<f64>,
    pub document_type: String,
    pub tax_office: Option<String>,
}

/// Structured fields for the categories that carry them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentFields {
    Invoice(InvoiceFields),
    Insurance(InsuranceFields),
    Contract(ContractFields),
    Bank(BankFields),
    Tax(TaxFields),
}

/// Extract fields for `category`; `None` for categories without a field set.
pub fn extract_fields(category: &str, text: &str, features: &ExtractedFeatures) -> Option<DocumentFields> {
    extract_fields_for_year(category, text, features, Local::now().year())
}

/// Same as [`extract_fields`], with an explicit fallback year for tax documents.
pub fn extract_fields_for_year(
    category: &str,
    text: &str,
    features: &ExtractedFeatures,
    reference_year: i32,
) -> Option<DocumentFields> {
    let lower = text.to_lowercase();
    let dates = &features.dates;
    let amount = features.total_amount();

    let fields = match category {
        "Rechnungen" => DocumentFields::Invoice(InvoiceFields {
            date: dates.first().copied(),
            amount,
            company: extract_company(text),
            expense_category: expense_category(&lower).to_string(),
            due_date: dates.get(1).copied(),
        }),
        "Versicherungen" => DocumentFields::Insurance(InsuranceFields {
            insurer: extract_company(text),
            policy_number: policy_number(&lower),
            premium: amount,
            payment_interval: payment_interval(&lower).to_string(),
            term_end: dates.last().copied(),
            insurance_type: insurance_type(&lower).to_string(),
        }),
        "Verträge" => DocumentFields::Contract(ContractFields {
            counterparty: extract_company(text),
            start: dates.first().copied(),
            end: dates.get(1).copied(),
            notice_period: notice_period(&lower),
            monthly_amount: amount,
        }),
        "Bank" => DocumentFields::Bank(BankFields {
            date: dates.first().copied(),
            amount,
            document_type: bank_document_type(&lower).to_string(),
            description: text.chars().take(MAX_DESCRIPTION_CHARS).collect(),
        }),
        "Steuer" => DocumentFields::Tax(TaxFields {
            year: dates.first().map(|d| d.year()).unwrap_or(reference_year),
            amount,
            document_type: if lower.contains("bescheid") {
                "Steuerbescheid"
            } else {
                "Steuerdokument"
            }
            .to_string(),
            tax_office: tax_office(&lower),
        }),
        _ => return None,
    };

    Some(fields)
}

/// First of the leading lines naming a company, else the first line.
fn extract_company(text: &str) -> String {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| l.chars().count() > 3)
        .collect();

    let company = lines.iter().take(COMPANY_SCAN_LINES).find(|line| {
        let lower = line.to_lowercase();
        LEGAL_FORM.is_match(line) || lower.contains("versicherung") || lower.contains("stadtwerke")
    });

    match company.or(lines.first()) {
        Some(line) => line.chars().take(MAX_COMPANY_CHARS).collect(),
        None => UNKNOWN_COMPANY.to_string(),
    }
}

fn expense_category(lower: &str) -> &'static str {
    const TABLE: &[(&str, &[&str])] = &[
        ("Haushalt", &["strom", "gas", "wasser", "müll"]),
        ("Kommunikation", &["internet", "telefon", "handy", "mobilfunk"]),
        ("Versicherung", &["versicherung", "beitrag", "police"]),
        ("Einkauf", &["amazon", "ebay", "shop", "kaufland", "rewe", "edeka"]),
        ("Gesundheit", &["apotheke", "arzt", "kranken"]),
        ("Unterhaltung", &["netflix", "spotify", "disney", "kino"]),
        ("Transport", &["tanken", "benzin", "bahn", "ticket"]),
    ];
    first_match(lower, TABLE).unwrap_or("Sonstiges")
}

fn insurance_type(lower: &str) -> &'static str {
    const TABLE: &[(&str, &[&str])] = &[
        ("Krankenversicherung", &["kranken", "gesundheit"]),
        ("Haftpflicht", &["haftpflicht"]),
        ("KFZ", &["kfz", "auto", "kraftfahrzeug"]),
        ("Hausrat", &["hausrat"]),
        ("Rechtsschutz", &["rechtsschutz"]),
        ("Leben", &["lebensversicherung"]),
    ];
    first_match(lower, TABLE).unwrap_or("Sonstige")
}

fn payment_interval(lower: &str) -> &'static str {
    if lower.contains("monatlich") || lower.contains("pro monat") {
        "monatlich"
    } else if lower.contains("jährlich") || lower.contains("pro jahr") {
        "jährlich"
    } else if lower.contains("quartal") {
        "vierteljährlich"
    } else if lower.contains("halbjahr") {
        "halbjährlich"
    } else {
        "unbekannt"
    }
}

fn bank_document_type(lower: &str) -> &'static str {
    if lower.contains("kontoauszug") {
        "Kontoauszug"
    } else if lower.contains("kreditkarte") {
        "Kreditkarte"
    } else if lower.contains("depot") {
        "Depot"
    } else if lower.contains("kredit") || lower.contains("darlehen") {
        "Kredit"
    } else {
        "Sonstige"
    }
}

fn policy_number(lower: &str) -> Option<String> {
    POLICY_NUMBER
        .iter()
        .find_map(|pattern| pattern.captures(lower))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_uppercase())
}

fn notice_period(lower: &str) -> Option<String> {
    let caps = NOTICE_PERIOD.captures(lower)?;
    Some(format!("{} {}", caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

fn tax_office(lower: &str) -> Option<String> {
    let name = TAX_OFFICE.captures(lower)?.get(1)?.as_str().trim();
    (!name.is_empty()).then(|| title_case(name))
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            word.split('-')
                .map(|part| {
                    let mut chars = part.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars).collect(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<String>>()
                .join("-")
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn first_match(lower: &str, table: &[(&'static str, &[&str])]) -> Option<&'static str> {
    table
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| lower.contains(n)))
        .map(|(name, _)| *name)
}
