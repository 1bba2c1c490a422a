use recon_core::amount::{check_range, parse_amount};
use recon_core::Period;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

static FILENAME_PERIOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?P<month>\d{2})-(?P<year>\d{4})").expect("valid regex"));

/// Context derived from outside the document text (typically its filename).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHints {
    pub period: Option<Period>,
    pub account_fragment: Option<String>,
}

impl DocumentHints {
    /// Read hints from names like `Relevé_AWB_01-2025_ZPT.pdf`: the `MM-YYYY`
    /// group is the period, the last `_` token that is not the period is the
    /// account fragment.
    pub fn from_filename(name: &str) -> Self {
        let stem = Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(name);

        let period = FILENAME_PERIOD.captures(stem).and_then(|caps| {
            let month = caps["month"].parse().ok()?;
            let year = caps["year"].parse().ok()?;
            Period::new(year, month)
        });

        let account_fragment = stem
            .rsplit('_')
            .next()
            .filter(|tok| stem.contains('_') && !tok.is_empty())
            .filter(|tok| !FILENAME_PERIOD.is_match(tok))
            .filter(|tok| tok.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|tok| tok.to_string());

        Self {
            period,
            account_fragment,
        }
    }
}

/// A monetary value from a structured extraction: a JSON number, a
/// (possibly locale-formatted) string, or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(serde_json::Number),
    Text(String),
}

impl RawAmount {
    /// Missing or blank amounts read as zero.
    pub fn to_decimal(value: Option<&RawAmount>) -> recon_core::Result<Decimal> {
        match value {
            None => Ok(Decimal::ZERO),
            Some(RawAmount::Text(s)) if s.trim().is_empty() => Ok(Decimal::ZERO),
            Some(RawAmount::Text(s)) => parse_amount(s),
            Some(RawAmount::Number(n)) => {
                let s = n.to_string();
                let value = Decimal::from_str(&s)
                    .or_else(|_| Decimal::from_scientific(&s))
                    .map_err(|_| recon_core::ReconError::InvalidAmount { token: s.clone() })?;
                check_range(value, &s)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredTransaction {
    /// `DD/MM/YYYY`
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, alias = "libelle", alias = "designation")]
    pub description: String,
    #[serde(default)]
    pub debit: Option<RawAmount>,
    #[serde(default)]
    pub credit: Option<RawAmount>,
}

/// Pre-structured extraction (e.g. from a vision model). Accepts English keys
/// and the French keys the extraction prompt produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredExtraction {
    #[serde(default, alias = "banque")]
    pub bank_name: Option<String>,
    #[serde(default, alias = "numero_compte", alias = "account_number")]
    pub account_id: Option<String>,
    #[serde(default, alias = "titulaire")]
    pub holder_name: Option<String>,
    #[serde(default, alias = "periode")]
    pub period: Option<String>,
    #[serde(default, alias = "solde_initial")]
    pub opening_balance: Option<RawAmount>,
    #[serde(default, alias = "solde_final")]
    pub closing_balance: Option<RawAmount>,
    #[serde(default)]
    pub transactions: Vec<StructuredTransaction>,
}

/// The two input shapes the assembler accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionInput {
    /// OCR or text-layer output, all pages concatenated.
    RawText { text: String, hints: DocumentHints },
    Structured(StructuredExtraction),
}

impl ExtractionInput {
    pub fn raw_text(text: impl Into<String>, hints: DocumentHints) -> Self {
        Self::RawText {
            text: text.into(),
            hints,
        }
    }

    pub fn from_lines<I, S>(lines: I, hints: DocumentHints) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let text = lines
            .into_iter()
            .map(|l| l.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Self::RawText { text, hints }
    }
}
