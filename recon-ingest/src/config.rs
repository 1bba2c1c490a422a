//! Keyword tables driving statement assembly.
//!
//! Every heuristic list lives here so that supporting a new label or marker
//! is a config change. Defaults match Attijariwafa Bank OCR output.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A character sequence OCR commonly misreads in account numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrCorrection {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Bank name used when the extraction carries none.
    pub bank_name: String,
    /// Holder name used when the extraction carries none.
    pub default_holder: String,
    /// Lowercase substrings identifying documents of this bank.
    pub detection_markers: Vec<String>,
    /// Each entry is a set of words that must all appear on an
    /// opening-balance line.
    pub opening_markers: Vec<Vec<String>>,
    pub closing_markers: Vec<Vec<String>>,
    /// Qualifiers printed after a balance; a debtor qualifier negates it.
    pub creditor_qualifiers: Vec<String>,
    pub debtor_qualifiers: Vec<String>,
    /// Lines containing any of these (case-insensitive) are boilerplate.
    pub skip_patterns: Vec<String>,
    /// Description keywords marking a single-amount line as a debit.
    pub debit_keywords: Vec<String>,
    /// Keywords introducing the account number, e.g. `COMPTE: 00 0193...`.
    pub account_keywords: Vec<String>,
    pub account_corrections: Vec<OcrCorrection>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            bank_name: "Attijariwafa Bank".to_string(),
            default_holder: "Unknown".to_string(),
            detection_markers: strings(&["attijariwafa", "attijari", "releve de compte"]),
            opening_markers: vec![
                strings(&["SOLDE", "DEPART"]),
                strings(&["SOLDE", "INITIAL"]),
                strings(&["SOLDE", "PRECEDENT"]),
                strings(&["STARTING", "BALANCE"]),
                strings(&["OPENING", "BALANCE"]),
            ],
            closing_markers: vec![
                strings(&["FINAL"]),
                strings(&["SOLDE", "NOUVEAU"]),
                strings(&["NEW", "BALANCE"]),
                strings(&["CLOSING", "BALANCE"]),
            ],
            creditor_qualifiers: strings(&["CREDITEUR", "CREDITOR"]),
            debtor_qualifiers: strings(&["DEBITEUR", "DEBTOR"]),
            skip_patterns: strings(&[
                "TOTAL MOUVEMENTS",
                "PAGE",
                "---",
                "LIBELLE",
                "VALEUR",
                "CAPITAUX",
                "CREDIT",
                "DATE",
                "Attijariwafa",
                "CamScanner",
                "société anonyme",
                "capital",
                "Siège",
                "arrêté",
            ]),
            debit_keywords: strings(&[
                "FRAIS",
                "PRELEVEMENT",
                "TIMBRE",
                "PAIEMENT",
                "RETRAIT",
                "COMMISSION",
                "VIREMENT EMIS",
                "CNSS",
            ]),
            account_keywords: strings(&["COMPTE", "ACCOUNT"]),
            account_corrections: vec![
                OcrCorrection {
                    from: "E".to_string(),
                    to: String::new(),
                },
                OcrCorrection {
                    from: "S".to_string(),
                    to: "5".to_string(),
                },
            ],
        }
    }
}

impl AssemblerConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parse assembler config")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let p = path.as_ref();
        let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
        Self::from_toml_str(&s).with_context(|| format!("load {}", p.display()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serialize assembler config")
    }

    /// True when a line contains a boilerplate substring.
    pub fn is_boilerplate(&self, line: &str) -> bool {
        let lower = line.to_lowercase();
        self.skip_patterns
            .iter()
            .any(|p| lower.contains(&p.to_lowercase()))
    }

    /// True when the uppercased description contains a debit keyword.
    pub fn implies_debit(&self, description: &str) -> bool {
        let upper = description.to_uppercase();
        self.debit_keywords
            .iter()
            .any(|k| upper.contains(&k.to_uppercase()))
    }

    pub fn apply_account_corrections(&self, raw: &str) -> String {
        let mut out: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        for c in &self.account_corrections {
            out = out.replace(&c.from, &c.to);
        }
        out
    }
}
