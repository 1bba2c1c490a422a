//! Statement periods: a calendar (year, month) resolved from free-form labels.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static DASHED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<month>\d{1,2})-(?P<year>\d{4})$").expect("valid regex"));
static SLASHED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<month>\d{1,2})/(?P<year>\d{4})$").expect("valid regex"));

/// Localized month names (lowercase). Unaccented spellings cover OCR output.
const MONTH_NAMES: &[(&str, u32)] = &[
    ("janvier", 1),
    ("février", 2),
    ("fevrier", 2),
    ("mars", 3),
    ("avril", 4),
    ("mai", 5),
    ("juin", 6),
    ("juillet", 7),
    ("août", 8),
    ("aout", 8),
    ("septembre", 9),
    ("octobre", 10),
    ("novembre", 11),
    ("décembre", 12),
    ("decembre", 12),
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
];

/// A statement period. Orders by year, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    /// Sentinel for labels that could not be resolved. Sorts before any real
    /// statement period.
    pub const UNKNOWN: Period = Period {
        year: 2000,
        month: 1,
    };

    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Strictly parse `mm-yyyy`, `mm/yyyy` or `<month name> yyyy`.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();

        for re in [&*DASHED, &*SLASHED] {
            if let Some(caps) = re.captures(label) {
                let month = caps["month"].parse().ok()?;
                let year = caps["year"].parse().ok()?;
                return Self::new(year, month);
            }
        }

        let lower = label.to_lowercase();
        let parts: Vec<&str> = lower.split_whitespace().collect();
        if parts.len() < 2 {
            return None;
        }
        let month = MONTH_NAMES
            .iter()
            .find(|(name, _)| *name == parts[0])
            .map(|(_, m)| *m)?;
        let year_token = parts[parts.len() - 1];
        if year_token.len() != 4 {
            return None;
        }
        Self::new(year_token.parse().ok()?, month)
    }

    /// Lenient parse: unresolvable labels map to [`Period::UNKNOWN`].
    pub fn resolve(label: &str) -> Self {
        Self::parse(label).unwrap_or_else(|| {
            log::debug!("unresolved period label '{label}', using sentinel");
            Self::UNKNOWN
        })
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }

    /// Signed number of calendar months from `self` to `later`.
    pub fn months_until(&self, later: &Period) -> i32 {
        (later.year - self.year) * 12 + (later.month as i32 - self.month as i32)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:04}", self.month, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("01-2025", 2025, 1)]
    #[case("1-2025", 2025, 1)]
    #[case("12/2024", 2024, 12)]
    #[case("Janvier 2024", 2024, 1)]
    #[case("février 2024", 2024, 2)]
    #[case("FEVRIER 2024", 2024, 2)]
    #[case("Décembre 2023", 2023, 12)]
    #[case("  march 2022 ", 2022, 3)]
    fn test_parse_labels(#[case] label: &str, #[case] year: i32, #[case] month: u32) {
        assert_eq!(Period::parse(label), Some(Period { year, month }));
    }

    #[rstest]
    #[case("")]
    #[case("Inconnue")]
    #[case("13/2024")]
    #[case("00-2024")]
    #[case("Brumaire 2024")]
    #[case("2024-01")]
    #[case("Janvier 24")]
    fn test_unresolvable_labels_use_sentinel(#[case] label: &str) {
        assert_eq!(Period::parse(label), None);
        assert_eq!(Period::resolve(label), Period::UNKNOWN);
        assert!(Period::resolve(label).is_unknown());
    }

    #[test]
    fn test_sorting_mixed_labels_is_total() {
        let labels = ["03/2024", "garbage", "Janvier 2024", "02-2024", ""];
        let mut periods: Vec<Period> = labels.iter().map(|l| Period::resolve(l)).collect();
        periods.sort();
        assert_eq!(periods[0], Period::UNKNOWN);
        assert_eq!(periods[1], Period::UNKNOWN);
        assert_eq!(periods[2], Period { year: 2024, month: 1 });
        assert_eq!(periods[4], Period { year: 2024, month: 3 });
    }

    #[test]
    fn test_months_until_crosses_years() {
        let dec = Period::new(2024, 12).unwrap();
        let jan = Period::new(2025, 1).unwrap();
        assert_eq!(dec.months_until(&jan), 1);
        assert_eq!(jan.months_until(&dec), -1);
        assert_eq!(dec.next(), jan);
        assert_eq!(dec.months_until(&Period::new(2025, 3).unwrap()), 3);
    }

    #[test]
    fn test_display_is_canonical_label() {
        let p = Period::new(2025, 1).unwrap();
        assert_eq!(p.to_string(), "01/2025");
        assert_eq!(Period::parse(&p.to_string()), Some(p));
    }
}
