//! Category taxonomy: categories, their trigger keywords and sub-category rules.
//!
//! Order is significant everywhere: keyword-score ties go to the earlier
//! category, and the first matching sub-category rule wins.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ClassifyError, GENERAL_SUBCATEGORY};

/// Sub-category assigned when any of its patterns occurs in the lowercased text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubcategoryRule {
    pub name: String,
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub subcategories: Vec<SubcategoryRule>,
    /// Used when no rule matches; "Allgemein" when unset.
    #[serde(default)]
    pub fallback_subcategory: Option<String>,
}

impl CategoryDefinition {
    pub fn fallback_subcategory(&self) -> &str {
        self.fallback_subcategory.as_deref().unwrap_or(GENERAL_SUBCATEGORY)
    }

    /// Text encoded once as the category prototype: `"{name}: {kw1, kw2, ...}"`.
    pub fn prototype_text(&self) -> String {
        format!("{}: {}", self.name, self.keywords.join(", "))
    }
}

/// Immutable after load; shared read-only across worker threads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Taxonomy {
    categories: Vec<CategoryDefinition>,
}

impl Taxonomy {
    /// Build and validate a taxonomy. Keywords and patterns are lowercased.
    pub fn new(categories: Vec<CategoryDefinition>) -> Result<Self, ClassifyError> {
        if categories.is_empty() {
            return Err(ClassifyError::EmptyTaxonomy);
        }

        let mut seen = HashSet::new();
        for category in &categories {
            if category.name.trim().is_empty() {
                return Err(ClassifyError::EmptyCategoryName);
            }
            if !seen.insert(category.name.as_str()) {
                return Err(ClassifyError::DuplicateCategory(category.name.clone()));
            }
        }

        let categories = categories
            .into_iter()
            .map(|mut c| {
                c.keywords = normalize(c.keywords);
                for rule in &mut c.subcategories {
                    rule.patterns = normalize(std::mem::take(&mut rule.patterns));
                }
                c
            })
            .collect();

        Ok(Self { categories })
    }

    pub fn from_json(raw: &str) -> Result<Self, ClassifyError> {
        #[derive(Deserialize)]
        struct TaxonomyFile {
            categories: Vec<CategoryDefinition>,
        }

        let file: TaxonomyFile = serde_json::from_str(raw)?;
        Self::new(file.categories)
    }

    pub fn load(path: &Path) -> Result<Self, ClassifyError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ClassifyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let taxonomy = Self::from_json(&raw)?;
        tracing::info!(
            path = %path.display(),
            categories = taxonomy.len(),
            "Taxonomy loaded"
        );
        Ok(taxonomy)
    }

    pub fn categories(&self) -> &[CategoryDefinition] {
        &self.categories
    }

    pub fn get(&self, name: &str) -> Option<&CategoryDefinition> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for Taxonomy {
    /// Built-in German household taxonomy.
    fn default() -> Self {
        Self {
            categories: vec![
                category(
                    "Rechnungen",
                    &[
                        "rechnung",
                        "invoice",
                        "rechnungsnummer",
                        "betrag",
                        "gesamtbetrag",
                        "zahlung",
                        "mwst",
                        "fällig",
                        "strom",
                        "kundennummer",
                    ],
                    &[
                        ("Strom", &["strom", "stadtwerke", "energie", "kwh"]),
                        ("Gas", &["gas", "heizung", "erdgas"]),
                        ("Wasser", &["wasser", "wasserwerk", "abwasser"]),
                        ("Internet", &["internet", "telekom", "vodafone", "o2", "dsl", "glasfaser"]),
                        ("Telefon", &["telefon", "handy", "mobilfunk", "smartphone"]),
                        ("Versicherung", &["versicherung", "beitrag", "police"]),
                        ("Einkauf", &["amazon", "shop", "bestell", "lieferung", "kauf"]),
                        ("GEZ", &["rundfunk", "gez", "beitrag"]),
                    ],
                    Some("Sonstige_Rechnungen"),
                ),
                category(
                    "Versicherungen",
                    &[
                        "versicherung",
                        "police",
                        "versicherungsschein",
                        "versicherungsnehmer",
                        "beitrag",
                        "schadensfall",
                        "haftpflicht",
                        "kfz",
                    ],
                    &[
                        (
                            "Krankenversicherung",
                            &["kranken", "gesundheit", "krankenkasse", "tkk", "aok", "barmer"],
                        ),
                        ("Haftpflicht", &["haftpflicht", "privathaftpflicht"]),
                        ("KFZ", &["kfz", "auto", "kraftfahrzeug", "fahrzeug"]),
                        ("Hausrat", &["hausrat", "einbruch"]),
                        ("Rechtsschutz", &["rechtsschutz", "rechtschutz"]),
                        ("Lebensversicherung", &["lebensversicherung", "leben"]),
                        ("Berufsunfähigkeit", &["berufsunfähigkeit", "bu-versicherung"]),
                    ],
                    Some("Sonstige_Versicherungen"),
                ),
                category(
                    "Verträge",
                    &[
                        "vertrag",
                        "contract",
                        "mietvertrag",
                        "laufzeit",
                        "kündigung",
                        "vertragspartner",
                        "miete",
                        "unterschrift",
                    ],
                    &[
                        ("Mietvertrag", &["miete", "wohnung", "haus", "vermieter"]),
                        ("Arbeitsvertrag", &["arbeit", "anstellung", "gehalt", "arbeitgeber"]),
                        ("Handyvertrag", &["handy", "mobilfunk", "smartphone"]),
                        ("Stromvertrag", &["strom", "energie"]),
                        ("Internetvertrag", &["internet", "dsl"]),
                    ],
                    Some("Sonstige_Verträge"),
                ),
                category(
                    "Bank",
                    &[
                        "bank",
                        "konto",
                        "kontoauszug",
                        "iban",
                        "überweisung",
                        "kreditkarte",
                        "depot",
                        "sparkasse",
                        "darlehen",
                    ],
                    &[
                        ("Kontoauszug", &["kontoauszug", "konto"]),
                        ("Kreditkarte", &["kreditkarte", "visa", "mastercard"]),
                        ("Depot", &["depot", "wertpapier", "aktie"]),
                        ("Kredit", &["kredit", "darlehen"]),
                    ],
                    Some("Sonstige_Bankdokumente"),
                ),
                category(
                    "Steuer",
                    &[
                        "steuer",
                        "finanzamt",
                        "steuerbescheid",
                        "einkommensteuer",
                        "steuernummer",
                        "elster",
                        "lohnsteuer",
                    ],
                    &[],
                    Some("Steuerdokumente"),
                ),
                category(
                    "Medizin",
                    &[
                        "arzt",
                        "befund",
                        "diagnose",
                        "rezept",
                        "krankenkasse",
                        "praxis",
                        "patient",
                        "labor",
                    ],
                    &[
                        ("Arztbriefe", &["arzt", "befund", "diagnose"]),
                        ("Rezepte", &["rezept", "medikament"]),
                        ("Krankschreibung", &["krankschreibung", "arbeitsunfähig"]),
                        ("Labor", &["labor", "blutwerte", "blutbild"]),
                    ],
                    Some("Sonstige_Medizin"),
                ),
                category(
                    "Behörden",
                    &[
                        "behörde",
                        "bürgeramt",
                        "ordnungsamt",
                        "antrag",
                        "aktenzeichen",
                        "meldebescheinigung",
                        "stadtverwaltung",
                        "landratsamt",
                    ],
                    &[],
                    Some("Behördendokumente"),
                ),
            ],
        }
    }
}

fn category(
    name: &str,
    keywords: &[&str],
    rules: &[(&str, &[&str])],
    fallback: Option<&str>,
) -> CategoryDefinition {
    CategoryDefinition {
        name: name.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        subcategories: rules
            .iter()
            .map(|(rule, patterns)| SubcategoryRule {
                name: rule.to_string(),
                patterns: patterns.iter().map(|p| p.to_string()).collect(),
            })
            .collect(),
        fallback_subcategory: fallback.map(str::to_string),
    }
}

fn normalize(words: Vec<String>) -> Vec<String> {
    words
        .into_iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_taxonomy_is_valid() {
        let taxonomy = Taxonomy::default();
        let rebuilt = Taxonomy::new(taxonomy.categories().to_vec()).unwrap();
        assert_eq!(rebuilt, taxonomy);
        assert_eq!(taxonomy.categories()[0].name, "Rechnungen");
        assert!(taxonomy.get("Sonstiges").is_none());
    }

    #[test]
    fn from_json_lowercases_and_keeps_order() {
        let raw = r#"{"categories": [
            {"name": "Rechnungen", "keywords": ["Rechnung", " Invoice "],
             "subcategories": [{"name": "Strom", "patterns": ["STROM"]}],
             "fallback_subcategory": "Sonstige_Rechnungen"},
            {"name": "Verträge", "keywords": ["vertrag"]}
        ]}"#;
        let taxonomy = Taxonomy::from_json(raw).unwrap();
        assert_eq!(taxonomy.len(), 2);
        let invoices = &taxonomy.categories()[0];
        assert_eq!(invoices.keywords, vec!["rechnung", "invoice"]);
        assert_eq!(invoices.subcategories[0].patterns, vec!["strom"]);
        assert_eq!(invoices.fallback_subcategory(), "Sonstige_Rechnungen");
        assert_eq!(taxonomy.categories()[1].fallback_subcategory(), GENERAL_SUBCATEGORY);
    }

    #[test]
    fn rejects_invalid_taxonomies() {
        assert!(matches!(
            Taxonomy::from_json(r#"{"categories": []}"#),
            Err(ClassifyError::EmptyTaxonomy)
        ));
        assert!(matches!(
            Taxonomy::from_json(r#"{"categories": [{"name": "Bank"}, {"name": "Bank"}]}"#),
            Err(ClassifyError::DuplicateCategory(name)) if name == "Bank"
        ));
        assert!(matches!(
            Taxonomy::from_json(r#"{"categories": [{"name": "  "}]}"#),
            Err(ClassifyError::EmptyCategoryName)
        ));
        assert!(matches!(Taxonomy::from_json("{"), Err(ClassifyError::Parse(_))));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taxonomy.json");
        std::fs::write(&path, r#"{"categories": [{"name": "Bank", "keywords": ["konto"]}]}"#).unwrap();
        let taxonomy = Taxonomy::load(&path).unwrap();
        assert_eq!(taxonomy.get("Bank").unwrap().keywords, vec!["konto"]);

        let missing = Taxonomy::load(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ClassifyError::Io { .. })));
    }

    #[test]
    fn prototype_text_joins_keywords() {
        let taxonomy = Taxonomy::from_json(r#"{"categories": [{"name": "Bank", "keywords": ["konto", "iban"]}]}"#)
            .unwrap();
        assert_eq!(taxonomy.categories()[0].prototype_text(), "Bank: konto, iban");
    }
}
