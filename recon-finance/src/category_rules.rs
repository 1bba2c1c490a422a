//! Keyword rules mapping a transaction description to a spending category.
//!
//! Rules are tried in declaration order; the first rule with a keyword
//! contained in the uppercased description wins.

use recon_core::Transaction;
use serde::{Deserialize, Serialize};

pub const OTHER_CATEGORY: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    /// Uppercase substrings. Trailing spaces are significant (`"CB "`).
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_uppercase()).collect(),
        }
    }

    fn matches(&self, upper: &str) -> bool {
        self.keywords.iter().any(|k| upper.contains(k.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRules {
    pub rules: Vec<CategoryRule>,
    pub fallback: String,
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self {
            rules: vec![
                CategoryRule::new("Transfers", &["VIREMENT", "VIR", "TRANSFERT", "VERS CLIENT"]),
                CategoryRule::new("Salaries", &["SALAIRE", "PAIE", "REMUNERATION"]),
                CategoryRule::new("Direct Debits", &["PRELEVEMENT", "PRLV", "SEPA"]),
                CategoryRule::new("Bank Fees", &["FRAIS", "COMMISSION", "AGIOS", "COTISATION"]),
                CategoryRule::new("Rent", &["LOYER", "BAIL"]),
                CategoryRule::new("Cheques", &["CHEQUE", "CHQ"]),
                CategoryRule::new("Withdrawals", &["RETRAIT", "GAB", "DAB"]),
                CategoryRule::new("Card Payments", &["CB ", "CARTE", "VISA", "MASTERCARD"]),
            ],
            fallback: OTHER_CATEGORY.to_string(),
        }
    }
}

impl CategoryRules {
    pub fn categorize(&self, description: &str) -> &str {
        let upper = description.to_uppercase();
        self.rules
            .iter()
            .find(|r| r.matches(&upper))
            .map_or(self.fallback.as_str(), |r| r.name.as_str())
    }

    pub fn categorize_transaction(&self, txn: &Transaction) -> &str {
        self.categorize(&txn.description)
    }

    /// Every category name this rule set can return, fallback last.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .map(|r| r.name.as_str())
            .chain(std::iter::once(self.fallback.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("VIR.WEB RECU DE EL MRABET", "Transfers")]
    #[case("Virement emis vers Said", "Transfers")]
    #[case("SALAIRE JANVIER", "Salaries")]
    #[case("PRLV SEPA ORANGE", "Direct Debits")]
    #[case("FRAIS TENUE DE COMPTE", "Bank Fees")]
    #[case("AGIOS T4", "Bank Fees")]
    #[case("LOYER BUREAU", "Rent")]
    #[case("REMISE CHQ 1234", "Cheques")]
    #[case("RETRAIT GAB CASA ANFA", "Withdrawals")]
    #[case("CB MARJANE 05/01", "Card Payments")]
    #[case("ACHAT TPE", "Other")]
    fn test_default_rules(#[case] description: &str, #[case] expected: &str) {
        assert_eq!(CategoryRules::default().categorize(description), expected);
    }

    #[test]
    fn test_first_declared_rule_wins() {
        let rules = CategoryRules::default();
        // Bank Fees and Cheques both match; Bank Fees is declared first.
        assert_eq!(rules.categorize("FRAIS POUR CERTIFICATION CHEQUES"), "Bank Fees");
        // Transfers before Withdrawals.
        assert_eq!(rules.categorize("RETRAIT SUITE VIREMENT"), "Transfers");
        for _ in 0..3 {
            assert_eq!(rules.categorize("RETRAIT SUITE VIREMENT"), "Transfers");
        }
    }

    #[test]
    fn test_card_keyword_needs_trailing_space() {
        let rules = CategoryRules::default();
        assert_eq!(rules.categorize("CB MARJANE"), "Card Payments");
        assert_eq!(rules.categorize("CBMARJANE"), "Other");
    }

    #[test]
    fn test_custom_rules_and_transaction() {
        let rules = CategoryRules {
            rules: vec![CategoryRule::new("Groceries", &["marjane", "carrefour"])],
            fallback: "Misc".to_string(),
        };
        let txn = Transaction::debit(
            chrono::NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            "Achat Carrefour Market",
            rust_decimal::Decimal::new(12050, 2),
        );
        assert_eq!(rules.categorize_transaction(&txn), "Groceries");
        assert_eq!(rules.categorize("loyer"), "Misc");
        assert_eq!(rules.category_names().collect::<Vec<_>>(), vec!["Groceries", "Misc"]);
    }
}
