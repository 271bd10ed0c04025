use super::taxonomy::Taxonomy;
use super::GENERAL_SUBCATEGORY;

/// Sub-category for `category`: first rule with a pattern contained in the
/// lowercased text, else the category's fallback.
///
/// Categories outside the taxonomy (including "Sonstiges") get "Allgemein".
pub fn subcategorize(taxonomy: &Taxonomy, category: &str, text: &str) -> String {
    let Some(definition) = taxonomy.get(category) else {
        return GENERAL_SUBCATEGORY.to_string();
    };

    let lower = text.to_lowercase();
    definition
        .subcategories
        .iter()
        .find(|rule| rule.patterns.iter().any(|p| lower.contains(p.as_str())))
        .map(|rule| rule.name.clone())
        .unwrap_or_else(|| definition.fallback_subcategory().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoice_subcategories() {
        let taxonomy = Taxonomy::default();
        assert_eq!(subcategorize(&taxonomy, "Rechnungen", "Ihre Stromrechnung von den Stadtwerken"), "Strom");
        assert_eq!(subcategorize(&taxonomy, "Rechnungen", "Abrechnung Erdgas"), "Gas");
        assert_eq!(subcategorize(&taxonomy, "Rechnungen", "Ihre Bestellung bei uns"), "Einkauf");
        assert_eq!(subcategorize(&taxonomy, "Rechnungen", "Rechnung Nr. 17"), "Sonstige_Rechnungen");
    }

    #[test]
    fn first_rule_in_table_order_wins() {
        let taxonomy = Taxonomy::default();
        // "beitrag" is listed under Versicherung before GEZ
        assert_eq!(subcategorize(&taxonomy, "Rechnungen", "Rundfunkbeitrag"), "Versicherung");
    }

    #[test]
    fn other_categories() {
        let taxonomy = Taxonomy::default();
        assert_eq!(
            subcategorize(&taxonomy, "Versicherungen", "Ihre Krankenversicherung bei der AOK"),
            "Krankenversicherung"
        );
        assert_eq!(subcategorize(&taxonomy, "Verträge", "Mietvertrag für Wohnung"), "Mietvertrag");
        assert_eq!(subcategorize(&taxonomy, "Bank", "Ihr Kontoauszug"), "Kontoauszug");
        assert_eq!(subcategorize(&taxonomy, "Medizin", "Laborwerte"), "Labor");
        assert_eq!(subcategorize(&taxonomy, "Steuer", "Einkommensteuer"), "Steuerdokumente");
        assert_eq!(subcategorize(&taxonomy, "Behörden", "Aktenzeichen 4"), "Behördendokumente");
        assert_eq!(subcategorize(&taxonomy, "Bank", "Nichts"), "Sonstige_Bankdokumente");
    }

    #[test]
    fn unknown_category_is_general() {
        let taxonomy = Taxonomy::default();
        assert_eq!(subcategorize(&taxonomy, "Sonstiges", "Strom"), GENERAL_SUBCATEGORY);
        assert_eq!(subcategorize(&taxonomy, "Urlaub", ""), GENERAL_SUBCATEGORY);
    }
}
