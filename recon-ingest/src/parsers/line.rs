//! Transaction line parser for OCR'd statement text.
//!
//! Each strategy is an independent matcher; the first one that yields a
//! transaction wins. Lines no strategy recognizes (headers, page breaks,
//! continuation text) produce `Ok(None)`.
//!
//! Line shapes seen in the wild:
//!   0016BK/06 01] VIR.WEB RECU DE EL MRABET 07 01 2025 2 800,00
//!   0016CW/06 01] FRAIS POUR CERTIFICATION CHEQUES {31 12 2024 33,00
//!   FRAIS TENUE DE COMPTE 31 01 2025 25,00
//!   01/01/2025 ARRETE COMPTE 110,79

use anyhow::Result;
use chrono::NaiveDate;
use recon_core::amount::parse_amount;
use recon_core::{Period, Transaction};
use regex::{Captures, Regex};
use rust_decimal::Decimal;

/// Fallback date context for lines whose date omits the year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineContext {
    pub period: Option<Period>,
}

impl LineContext {
    pub fn new(period: Option<Period>) -> Self {
        Self { period }
    }

    /// Year for a `DD/MM` line. A December line in a January statement belongs
    /// to the previous year.
    fn year_for(&self, line_month: u32) -> Option<i32> {
        let p = self.period?;
        if p.month == 1 && line_month == 12 {
            Some(p.year - 1)
        } else {
            Some(p.year)
        }
    }
}

/// Outcome of one strategy on one line.
type Matched = recon_core::Result<Option<Transaction>>;

type Strategy = fn(&TransactionLineParser, &str, &LineContext) -> Matched;

/// Strategies in priority order.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("coded", TransactionLineParser::match_coded),
    ("bare-date", TransactionLineParser::match_bare_date),
    ("slash-date", TransactionLineParser::match_slash_date),
];

pub struct TransactionLineParser {
    coded_re: Regex,
    bare_re: Regex,
    code_prefix_re: Regex,
    slash_re: Regex,
    debit_keywords: Vec<String>,
}

fn date_from_parts(day: &str, month: &str, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}

fn optional_amount(caps: &Captures, name: &str) -> recon_core::Result<Option<Decimal>> {
    caps.name(name).map(|m| parse_amount(m.as_str())).transpose()
}

impl TransactionLineParser {
    pub fn new(debit_keywords: &[String]) -> Result<Self> {
        // CODE/DD MM] description [DD MM YYYY amount1 [amount2]
        // OCR renders the brackets as ], } or |
        let coded_re = Regex::new(concat!(
            r"^\s*[\dO]+[A-Z]{0,3}[/|](?P<op_day>\d{1,2})\s+(?P<op_month>\d{1,2})[\]}|]\s*",
            r"(?P<desc>.+?)\s+",
            r"[\[{|]?(?P<day>\d{1,2})\s+(?P<month>\d{1,2})\s+(?P<year>\d{4})\s*",
            r"(?P<amount1>\d+[\s\d]*[,.]\d{2})?\s*",
            r"(?P<amount2>\d+[\s\d]*[,.]\d{2})?"
        ))?;

        let bare_re = Regex::new(concat!(
            r"(?P<day>\d{1,2})\s+(?P<month>\d{1,2})\s+(?P<year>\d{4})\s+",
            r"(?P<amount>\d+[\s\d]*[,.]\d{2})"
        ))?;

        let code_prefix_re = Regex::new(r"^[\dO]+[A-Z]{0,3}[/|]\d{1,2}\s+\d{1,2}[\]}|]?\s*")?;

        let slash_re = Regex::new(concat!(
            r"^\s*(?P<day>\d{2})/(?P<month>\d{2})(?:/(?P<year>\d{2,4}))?\s+",
            r"(?P<desc>.*?)\s+",
            r"(?P<amount1>\d{1,3}(?:\s\d{3})*,\d{2})?\s*",
            r"(?P<amount2>\d{1,3}(?:\s\d{3})*,\d{2})?\s*$"
        ))?;

        Ok(Self {
            coded_re,
            bare_re,
            code_prefix_re,
            slash_re,
            debit_keywords: debit_keywords.iter().map(|k| k.to_uppercase()).collect(),
        })
    }

    /// Parse one trimmed line. `Err` only when a matched amount token is not a
    /// number or is implausibly large; callers treat that as a skipped line.
    pub fn parse_line(&self, line: &str, ctx: &LineContext) -> Matched {
        for (name, strategy) in STRATEGIES {
            if let Some(t) = strategy(self, line, ctx)? {
                log::trace!("{name} strategy matched: {line}");
                return Ok(Some(t));
            }
        }
        Ok(None)
    }

    fn is_debit(&self, description: &str) -> bool {
        let upper = description.to_uppercase();
        self.debit_keywords.iter().any(|k| upper.contains(k.as_str()))
    }

    /// Build a transaction from one or two amounts. Two amounts are
    /// (debit, credit); a single one is sided by description keywords.
    fn build(
        &self,
        date: NaiveDate,
        description: &str,
        amount1: Option<Decimal>,
        amount2: Option<Decimal>,
    ) -> Option<Transaction> {
        let (debit, credit) = match (amount1, amount2) {
            (Some(d), Some(c)) => (d, c),
            (Some(a), None) | (None, Some(a)) => {
                if self.is_debit(description) {
                    (a, Decimal::ZERO)
                } else {
                    (Decimal::ZERO, a)
                }
            }
            (None, None) => return None,
        };

        if debit.is_zero() && credit.is_zero() {
            return None;
        }
        Some(Transaction::new(date, description, debit, credit))
    }

    fn match_coded(&self, line: &str, _ctx: &LineContext) -> Matched {
        let Some(caps) = self.coded_re.captures(line) else {
            return Ok(None);
        };

        // The value date carries the year; the operation date does not.
        let Some(date) = caps["year"]
            .parse()
            .ok()
            .and_then(|y| date_from_parts(&caps["day"], &caps["month"], y))
        else {
            return Ok(None);
        };

        let description = caps["desc"].trim();
        let amount1 = optional_amount(&caps, "amount1")?;
        let amount2 = optional_amount(&caps, "amount2")?;
        Ok(self.build(date, description, amount1, amount2))
    }

    fn match_bare_date(&self, line: &str, _ctx: &LineContext) -> Matched {
        let Some(caps) = self.bare_re.captures(line) else {
            return Ok(None);
        };

        let start = caps.name("day").map_or(0, |m| m.start());
        let pre_date = line[..start].trim().trim_end_matches(['[', '{', '|']);
        let description = self.code_prefix_re.replace(pre_date, "");
        let description = description.trim();
        if description.is_empty() {
            return Ok(None);
        }

        let Some(date) = caps["year"]
            .parse()
            .ok()
            .and_then(|y| date_from_parts(&caps["day"], &caps["month"], y))
        else {
            return Ok(None);
        };

        let amount = parse_amount(&caps["amount"])?;
        Ok(self.build(date, description, Some(amount), None))
    }

    fn match_slash_date(&self, line: &str, ctx: &LineContext) -> Matched {
        let Some(caps) = self.slash_re.captures(line) else {
            return Ok(None);
        };

        let month: u32 = match caps["month"].parse() {
            Ok(m) => m,
            Err(_) => return Ok(None),
        };
        let year = match caps.name("year") {
            Some(y) if y.as_str().len() == 4 => y.as_str().parse().ok(),
            Some(y) if y.as_str().len() == 2 => y.as_str().parse::<i32>().ok().map(|v| 2000 + v),
            Some(_) => None,
            None => ctx.year_for(month),
        };
        let Some(date) = year.and_then(|y| date_from_parts(&caps["day"], &caps["month"], y)) else {
            return Ok(None);
        };

        let description = caps["desc"].trim();
        let amount1 = optional_amount(&caps, "amount1")?;
        let amount2 = optional_amount(&caps, "amount2")?;
        // Column layout: a lone amount sits in the debit column.
        let (debit, credit) = match (amount1, amount2) {
            (Some(a), None) | (None, Some(a)) => (Some(a), Some(Decimal::ZERO)),
            sides => sides,
        };
        Ok(self.build(date, description, debit, credit))
    }
}
