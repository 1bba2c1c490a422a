//! Assemble a canonical [`Statement`] from extracted document text or a
//! structured extraction.
//!
//! Raw text is scanned line by line. Each line is, in priority order: an
//! opening-balance marker, a closing-balance marker, boilerplate, or a
//! candidate transaction line.
//!
//!   COMPTE: 00 0193E000000409 21210
//!   SOLDE DEPART AU 31 12 2024 2311,61 CREDITEUR
//!   0016BK/06 01] VIR.WEB RECU DE EL MRABET 07 01 2025 2 800,00
//!   SOLDE FINAL AU 31 01 2025 102 773,14 CREDITEUR

use anyhow::Result;
use chrono::NaiveDate;
use recon_core::amount::parse_amount;
use recon_core::{Period, ReconError, Statement, Transaction};
use regex::{Regex, RegexBuilder};
use rust_decimal::Decimal;

use crate::config::AssemblerConfig;
use crate::parsers::line::{LineContext, TransactionLineParser};
use crate::types::{DocumentHints, ExtractionInput, RawAmount, StructuredExtraction};

/// Period label used when nothing in the document identifies the period.
pub const UNKNOWN_PERIOD_LABEL: &str = "unknown";

/// A line that looked like a transaction but could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    pub line_number: usize,
    pub line: String,
    pub error: ReconError,
}

/// Assembly output: the statement plus what was lost along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledStatement {
    pub statement: Statement,
    /// Non-empty lines that produced nothing (boilerplate, headers, noise).
    pub skipped_lines: usize,
    /// Transaction-shaped lines or rows dropped on a parse error.
    pub rejected_lines: Vec<RejectedLine>,
}

impl AssembledStatement {
    pub fn has_warnings(&self) -> bool {
        !self.rejected_lines.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BalanceKind {
    Opening,
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BalanceMarker {
    amount: Decimal,
    date: Option<NaiveDate>,
}

pub struct StatementAssembler {
    config: AssemblerConfig,
    line_parser: TransactionLineParser,
    balance_re: Regex,
    account_re: Regex,
}

impl StatementAssembler {
    pub fn new(config: AssemblerConfig) -> Result<Self> {
        let qualifiers: Vec<String> = config
            .creditor_qualifiers
            .iter()
            .chain(&config.debtor_qualifiers)
            .map(|q| regex::escape(q))
            .collect();

        // [DD MM] YYYY amount CREDITEUR|DEBITEUR
        let balance_re = RegexBuilder::new(&format!(
            concat!(
                r"(?:(?P<day>\d{{1,2}})\s+(?P<month>\d{{1,2}})\s+)?(?P<year>\d{{4}})\s+",
                r"(?P<amount>\d+(?:\s\d{{3}})*[,.]\d{{2}})\s+",
                r"(?P<side>{})"
            ),
            qualifiers.join("|")
        ))
        .case_insensitive(true)
        .build()?;

        let keywords: Vec<String> = config
            .account_keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect();
        let account_re = RegexBuilder::new(&format!(
            r"(?:{})\s*:\s*(?P<account>[\dA-Z][\dA-Z\s]*)",
            keywords.join("|")
        ))
        .case_insensitive(true)
        .build()?;

        let line_parser = TransactionLineParser::new(&config.debit_keywords)?;

        Ok(Self {
            config,
            line_parser,
            balance_re,
            account_re,
        })
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// True when the text carries one of the configured bank markers.
    pub fn can_process(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.config
            .detection_markers
            .iter()
            .any(|m| lower.contains(&m.to_lowercase()))
    }

    /// Normalize either input shape into a statement.
    pub fn assemble(&self, input: ExtractionInput) -> recon_core::Result<AssembledStatement> {
        match input {
            ExtractionInput::RawText { text, hints } => self.assemble_text(&text, &hints),
            ExtractionInput::Structured(extraction) => Ok(self.assemble_structured(extraction)),
        }
    }

    fn balance_kind(&self, upper: &str) -> Option<BalanceKind> {
        let has_all =
            |words: &Vec<String>| words.iter().all(|w| upper.contains(&w.to_uppercase()));
        if self.config.opening_markers.iter().any(has_all) {
            Some(BalanceKind::Opening)
        } else if self.config.closing_markers.iter().any(has_all) {
            Some(BalanceKind::Closing)
        } else {
            None
        }
    }

    fn parse_balance(&self, line: &str) -> recon_core::Result<Option<BalanceMarker>> {
        let Some(caps) = self.balance_re.captures(line) else {
            return Ok(None);
        };

        let mut amount = parse_amount(&caps["amount"])?;
        let side = caps["side"].to_uppercase();
        if self
            .config
            .debtor_qualifiers
            .iter()
            .any(|q| q.to_uppercase() == side)
        {
            amount = -amount;
        }

        let date = match (caps.name("day"), caps.name("month")) {
            (Some(d), Some(m)) => caps["year"].parse().ok().and_then(|y| {
                NaiveDate::from_ymd_opt(y, m.as_str().parse().ok()?, d.as_str().parse().ok()?)
            }),
            _ => None,
        };

        Ok(Some(BalanceMarker { amount, date }))
    }

    fn parse_account(&self, line: &str) -> Option<String> {
        let caps = self.account_re.captures(line)?;
        let account = self.config.apply_account_corrections(&caps["account"]);
        (!account.is_empty()).then_some(account)
    }

    /// Scan raw text. Fails only when the text is blank.
    pub fn assemble_text(
        &self,
        text: &str,
        hints: &DocumentHints,
    ) -> recon_core::Result<AssembledStatement> {
        if text.trim().is_empty() {
            return Err(ReconError::EmptyDocument);
        }

        let mut opening_balance = Decimal::ZERO;
        let mut closing_balance = Decimal::ZERO;
        let mut account_id: Option<String> = None;
        let mut transactions: Vec<Transaction> = Vec::new();
        let mut skipped_lines = 0usize;
        let mut rejected_lines = Vec::new();
        let mut ctx = LineContext::new(hints.period);

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let upper = line.to_uppercase();

            let names_account = self
                .config
                .account_keywords
                .iter()
                .any(|k| upper.contains(&k.to_uppercase()));
            if account_id.is_none() && names_account {
                account_id = self.parse_account(line);
            }

            if let Some(kind) = self.balance_kind(&upper) {
                match self.parse_balance(line) {
                    Ok(Some(marker)) => {
                        match kind {
                            BalanceKind::Opening => {
                                opening_balance = marker.amount;
                                if ctx.period.is_none() {
                                    ctx.period = marker.date.map(|d| Period::from_date(d).next());
                                }
                            }
                            BalanceKind::Closing => closing_balance = marker.amount,
                        }
                        continue;
                    }
                    Ok(None) => {}
                    Err(error) => {
                        log::warn!("line {}: unreadable balance '{line}': {error}", idx + 1);
                        rejected_lines.push(RejectedLine {
                            line_number: idx + 1,
                            line: line.to_string(),
                            error,
                        });
                        continue;
                    }
                }
            }

            if self.config.is_boilerplate(line) {
                skipped_lines += 1;
                continue;
            }

            match self.line_parser.parse_line(line, &ctx) {
                Ok(Some(t)) => transactions.push(t),
                Ok(None) => skipped_lines += 1,
                Err(error) => {
                    log::warn!("line {}: skipped '{line}': {error}", idx + 1);
                    rejected_lines.push(RejectedLine {
                        line_number: idx + 1,
                        line: line.to_string(),
                        error,
                    });
                }
            }
        }

        let period = match hints.period {
            Some(p) => p.to_string(),
            None => match transactions.first() {
                Some(t) => Period::from_date(t.date).to_string(),
                None => UNKNOWN_PERIOD_LABEL.to_string(),
            },
        };

        let account_id = account_id
            .or_else(|| hints.account_fragment.clone())
            .unwrap_or_default();

        log::info!(
            "assembled statement {period}: {} transaction(s), {} skipped, {} rejected",
            transactions.len(),
            skipped_lines,
            rejected_lines.len()
        );

        Ok(AssembledStatement {
            statement: Statement {
                bank_name: self.config.bank_name.clone(),
                account_id,
                holder_name: self.config.default_holder.clone(),
                period,
                opening_balance,
                closing_balance,
                transactions,
            },
            skipped_lines,
            rejected_lines,
        })
    }

    /// Normalize a structured extraction. Rows with a missing or invalid date
    /// or amount are dropped and reported; unreadable balances read as zero.
    pub fn assemble_structured(&self, extraction: StructuredExtraction) -> AssembledStatement {
        let mut transactions = Vec::with_capacity(extraction.transactions.len());
        let mut rejected_lines = Vec::new();
        let mut skipped_lines = 0usize;

        for (idx, row) in extraction.transactions.iter().enumerate() {
            let raw_date = row.date.as_deref().map(str::trim).filter(|d| !d.is_empty());
            let Some(raw_date) = raw_date else {
                skipped_lines += 1;
                continue;
            };

            let parsed = NaiveDate::parse_from_str(raw_date, "%d/%m/%Y")
                .map_err(|_| ReconError::InvalidDate {
                    value: raw_date.to_string(),
                })
                .and_then(|date| {
                    let debit = RawAmount::to_decimal(row.debit.as_ref())?;
                    let credit = RawAmount::to_decimal(row.credit.as_ref())?;
                    let description = row.description.trim();
                    Ok(Transaction::from_signed_sides(date, description, debit, credit))
                });

            match parsed {
                Ok(t) => transactions.push(t),
                Err(error) => {
                    log::warn!("structured row {}: skipped: {error}", idx + 1);
                    rejected_lines.push(RejectedLine {
                        line_number: idx + 1,
                        line: format!("{row:?}"),
                        error,
                    });
                }
            }
        }

        let balance = |value: Option<&RawAmount>, what: &str| {
            RawAmount::to_decimal(value).unwrap_or_else(|e| {
                log::warn!("unreadable {what}: {e}");
                Decimal::ZERO
            })
        };
        let opening_balance = balance(extraction.opening_balance.as_ref(), "opening balance");
        let closing_balance = balance(extraction.closing_balance.as_ref(), "closing balance");

        let non_blank =
            |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let period = non_blank(extraction.period)
            .or_else(|| {
                transactions
                    .first()
                    .map(|t| Period::from_date(t.date).to_string())
            })
            .unwrap_or_else(|| UNKNOWN_PERIOD_LABEL.to_string());

        AssembledStatement {
            statement: Statement {
                bank_name: non_blank(extraction.bank_name)
                    .unwrap_or_else(|| self.config.bank_name.clone()),
                account_id: non_blank(extraction.account_id).unwrap_or_default(),
                holder_name: non_blank(extraction.holder_name)
                    .unwrap_or_else(|| self.config.default_holder.clone()),
                period,
                opening_balance,
                closing_balance,
                transactions,
            },
            skipped_lines,
            rejected_lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StructuredTransaction;
    use recon_core::check_coherence;

    const JANUARY: &str = r#"
ATTIJARIWAFA BANK
RELEVE DE COMPTE BANCAIRE
COMPTE: 00 0193E000000409 21210
DATE LIBELLE VALEUR DEBIT CREDIT
SOLDE DEPART AU 31 12 2024 2311,61 CREDITEUR
0016BK/06 01] VIR.WEB RECU DE EL MRABET 07 01 2025 2 800,00
0016CW/06 01] FRAIS POUR CERTIFICATION CHEQUES {31 12 2024 33,00
RETRAIT GAB CASA ANFA 12 01 2025 1 000,00
Page 1 / 2
0016BK/20 01] PAIEMENT CNSS |20 01 2025 410,25
TOTAL MOUVEMENTS 1 443,25 2 800,00
SOLDE FINAL AU 31 01 2025 3 668,36 CREDITEUR
CamScanner
"#;

    fn assembler() -> StatementAssembler {
        StatementAssembler::new(AssemblerConfig::default()).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_assemble_ocr_statement() {
        let hints = DocumentHints::from_filename("Relevé_AWB_01-2025_ZPT.pdf");
        let out = assembler().assemble_text(JANUARY, &hints).unwrap();
        let s = &out.statement;

        assert_eq!(s.bank_name, "Attijariwafa Bank");
        assert_eq!(s.account_id, "00019300000040921210");
        assert_eq!(s.period, "01/2025");
        assert_eq!(s.opening_balance, Decimal::new(231161, 2));
        assert_eq!(s.closing_balance, Decimal::new(366836, 2));
        assert_eq!(s.transactions.len(), 4);
        assert_eq!(s.transactions[0].credit, Decimal::new(280000, 2));
        assert_eq!(s.transactions[1].debit, Decimal::new(3300, 2));
        assert_eq!(s.transactions[3].date, date(2025, 1, 20));
        assert!(out.rejected_lines.is_empty());
        assert!(check_coherence(s).is_coherent);
    }

    #[test]
    fn test_debtor_balance_is_negative() {
        let text = "SOLDE DEPART AU 31 12 2024 1 250,00 DEBITEUR\n\
                    FINAL AU 31 01 2025 980,50 debiteur";
        let s = assembler()
            .assemble_text(text, &DocumentHints::default())
            .unwrap()
            .statement;
        assert_eq!(s.opening_balance, Decimal::new(-125000, 2));
        assert_eq!(s.closing_balance, Decimal::new(-98050, 2));
    }

    #[test]
    fn test_english_markers() {
        let text = "OPENING BALANCE 31 12 2024 100,00 CREDITOR\n\
                    NEW BALANCE 31 01 2025 80,00 CREDITOR";
        let s = assembler()
            .assemble_text(text, &DocumentHints::default())
            .unwrap()
            .statement;
        assert_eq!(s.opening_balance, Decimal::new(10000, 2));
        assert_eq!(s.closing_balance, Decimal::new(8000, 2));
    }

    #[test]
    fn test_opening_marker_date_seeds_year_context() {
        let text = "SOLDE DEPART AU 31 12 2024 100,00 CREDITEUR\n15/01 VIREMENT RECU 50,00";
        let s = assembler()
            .assemble_text(text, &DocumentHints::default())
            .unwrap()
            .statement;
        assert_eq!(s.transactions.len(), 1);
        assert_eq!(s.transactions[0].date, date(2025, 1, 15));
        assert_eq!(s.period, "01/2025");
    }

    #[test]
    fn test_period_and_account_fallbacks() {
        let text = "RETRAIT GAB 03 02 2025 200,00";
        let out = assembler()
            .assemble_text(text, &DocumentHints::from_filename("scan_ZPT.pdf"))
            .unwrap();
        assert_eq!(out.statement.period, "02/2025");
        assert_eq!(out.statement.account_id, "ZPT");

        let out = assembler()
            .assemble_text("nothing useful here", &DocumentHints::default())
            .unwrap();
        assert_eq!(out.statement.period, UNKNOWN_PERIOD_LABEL);
        assert!(out.statement.resolved_period().is_unknown());
        assert_eq!(out.skipped_lines, 1);
    }

    #[test]
    fn test_malformed_lines_do_not_abort_the_document() {
        let mut lines: Vec<String> = (1..=10)
            .map(|d| format!("RETRAIT GAB AGENCE {d:02} 01 2025 {d}0,00"))
            .collect();
        lines.insert(3, "0016BK/06 01] VIR RECU 31 02 2025 100,00".to_string());
        lines.insert(7, "0016BK/06 01] REGULARISATION 07 01 2025 0,00".to_string());
        lines.insert(9, "%%% illisible 12 ## 2025".to_string());

        let out = assembler()
            .assemble(ExtractionInput::from_lines(&lines, DocumentHints::default()))
            .unwrap();
        assert_eq!(out.statement.transactions.len(), 10);
        assert_eq!(out.skipped_lines, 3);
        assert_eq!(out.statement.total_debit(), Decimal::new(550, 0));
    }

    #[test]
    fn test_unreadable_amount_is_rejected_with_its_line_number() {
        let text = "\
SOLDE DEPART AU 31 12 2024 100,00 CREDITEUR
RETRAIT GAB 10 01 2025 50 000 000 000 000 000 000 000 000 000,00
0016BK/15 01] VIR RECU DE SAID 15 01 2025 40,00
RETRAIT GAB 20 01 2025 30,00";
        let out = assembler().assemble_text(text, &DocumentHints::default()).unwrap();

        assert_eq!(out.statement.transactions.len(), 2);
        assert_eq!(out.rejected_lines.len(), 1);
        let rejected = &out.rejected_lines[0];
        assert_eq!(rejected.line_number, 2);
        assert!(rejected.line.starts_with("RETRAIT GAB 10 01 2025"));
        assert!(matches!(rejected.error, ReconError::InvalidAmount { .. }));
        assert!(out.has_warnings());
    }

    #[test]
    fn test_oversized_amounts_cannot_overflow_balance_checks() {
        let line = "RETRAIT GAB 10 01 2025 50 000 000 000 000 000 000 000 000 000,00";
        let text = format!("{line}\n{line}\nRETRAIT GAB 11 01 2025 5,00");
        let out = assembler().assemble_text(&text, &DocumentHints::default()).unwrap();

        assert_eq!(out.statement.transactions.len(), 1);
        assert_eq!(out.rejected_lines.len(), 2);
        let check = check_coherence(&out.statement);
        assert_eq!(check.computed_closing_balance, Decimal::new(-500, 2));
    }

    #[test]
    fn test_blank_text_is_empty_document() {
        assert_eq!(
            assembler().assemble_text("  \n\n ", &DocumentHints::default()),
            Err(ReconError::EmptyDocument)
        );
    }

    #[test]
    fn test_boilerplate_only_document_has_no_transactions() {
        let text = "ATTIJARIWAFA BANK\nDATE LIBELLE VALEUR DEBIT CREDIT\nPage 1 / 1";
        let out = assembler().assemble_text(text, &DocumentHints::default()).unwrap();
        assert!(out.statement.transactions.is_empty());
        assert_eq!(out.skipped_lines, 3);
    }

    #[test]
    fn test_can_process() {
        let a = assembler();
        assert!(a.can_process(JANUARY));
        assert!(a.can_process("Releve de compte n° 3"));
        assert!(!a.can_process("BANQUE POPULAIRE extrait"));
    }

    #[test]
    fn test_structured_extraction() {
        let extraction = StructuredExtraction {
            bank_name: Some("  ".to_string()),
            account_id: Some("0193000000409".to_string()),
            holder_name: Some("EL MRABET".to_string()),
            period: Some("Janvier 2025".to_string()),
            opening_balance: Some(RawAmount::Text("2 311,61".to_string())),
            closing_balance: Some(RawAmount::Text("bogus".to_string())),
            transactions: vec![
                StructuredTransaction {
                    date: Some("07/01/2025".to_string()),
                    description: "VIR RECU".to_string(),
                    debit: None,
                    credit: Some(RawAmount::Text("2800".to_string())),
                },
                StructuredTransaction {
                    date: None,
                    description: "no date".to_string(),
                    ..Default::default()
                },
                StructuredTransaction {
                    date: Some("2025-01-09".to_string()),
                    description: "iso date".to_string(),
                    debit: Some(RawAmount::Text("10".to_string())),
                    credit: None,
                },
            ],
        };

        let out = assembler().assemble(ExtractionInput::Structured(extraction)).unwrap();
        let s = &out.statement;
        assert_eq!(s.bank_name, "Attijariwafa Bank");
        assert_eq!(s.holder_name, "EL MRABET");
        assert_eq!(s.period, "Janvier 2025");
        assert_eq!(s.opening_balance, Decimal::new(231161, 2));
        assert_eq!(s.closing_balance, Decimal::ZERO);
        assert_eq!(s.transactions.len(), 1);
        assert_eq!(s.transactions[0].credit, Decimal::new(2800, 0));
        assert_eq!(out.skipped_lines, 1);
        assert_eq!(out.rejected_lines.len(), 1);
        assert_eq!(
            out.rejected_lines[0].error,
            ReconError::InvalidDate {
                value: "2025-01-09".to_string()
            }
        );
    }

    fn signed_row(debit: Option<&str>, credit: Option<&str>) -> StructuredExtraction {
        StructuredExtraction {
            transactions: vec![StructuredTransaction {
                date: Some("05/01/2025".to_string()),
                description: "FRAIS".to_string(),
                debit: debit.map(|d| RawAmount::Text(d.to_string())),
                credit: credit.map(|c| RawAmount::Text(c.to_string())),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_structured_negative_debit_is_booked_as_credit() {
        let s = assembler()
            .assemble_structured(signed_row(Some("-50,00"), None))
            .statement;
        let t = &s.transactions[0];
        assert_eq!(t.debit, Decimal::ZERO);
        assert_eq!(t.credit, Decimal::new(5000, 2));
        assert_eq!(t.signed_amount(), Decimal::new(5000, 2));
    }

    #[test]
    fn test_structured_negative_credit_is_booked_as_debit() {
        let s = assembler()
            .assemble_structured(signed_row(None, Some("-50,00")))
            .statement;
        let t = &s.transactions[0];
        assert_eq!(t.debit, Decimal::new(5000, 2));
        assert_eq!(t.credit, Decimal::ZERO);
        assert_eq!(s.total_debit(), Decimal::new(5000, 2));
    }

    #[test]
    fn test_structured_period_falls_back_to_first_transaction() {
        let extraction = StructuredExtraction {
            transactions: vec![StructuredTransaction {
                date: Some("15/03/2024".to_string()),
                description: "x".to_string(),
                debit: Some(RawAmount::Text("1,00".to_string())),
                credit: None,
            }],
            ..Default::default()
        };
        let s = assembler().assemble_structured(extraction).statement;
        assert_eq!(s.period, "03/2024");
        assert_eq!(s.holder_name, "Unknown");
        assert_eq!(s.account_id, "");
    }
}
