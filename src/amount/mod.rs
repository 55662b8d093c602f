pub mod import;

use thiserror::Error;

use crate::format::format_btc;

pub const SATS_PER_BTC: i64 = 100_000_000;

/// One user-entered amount. `sats` is signed: wallet imports carry sent
/// transactions as negative amounts, which stay in the entry list but are
/// filtered out before layout. `id` is stable for the lifetime of the entry
/// and ties layout rectangles back to their source.
#[derive(Debug, Clone, PartialEq)]
pub struct AmountEntry {
    pub id: u32,
    pub label: String,
    pub sats: i64,
}

impl AmountEntry {
    pub fn btc(&self) -> f64 {
        self.sats as f64 / SATS_PER_BTC as f64
    }
}

#[derive(Debug, Error)]
pub enum ParseAmountError {
    #[error("line {line}: `{text}` is not a number")]
    NotANumber { line: usize, text: String },
    #[error("line {line}: amount is not finite")]
    NonFinite { line: usize },
    #[error("line {line}: amount exceeds the representable satoshi range")]
    OutOfRange { line: usize },
}

/// Parses one BTC amount per line. Blank and whitespace-only lines are
/// skipped; anything else must be a finite decimal number. Entry ids are
/// assigned sequentially from 0; callers that append into an existing list
/// re-assign them.
pub fn parse_amounts(text: &str) -> Result<Vec<AmountEntry>, ParseAmountError> {
    let mut entries = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        let line = idx + 1;
        let btc: f64 = trimmed
            .parse()
            .map_err(|_| ParseAmountError::NotANumber {
                line,
                text: trimmed.to_string(),
            })?;
        if !btc.is_finite() {
            return Err(ParseAmountError::NonFinite { line });
        }
        let sats = btc_to_sats(btc).ok_or(ParseAmountError::OutOfRange { line })?;
        entries.push(AmountEntry {
            id: entries.len() as u32,
            label: format!("{} BTC", format_btc(sats)),
            sats,
        });
    }
    Ok(entries)
}

/// BTC to satoshis, rounded to the nearest whole satoshi. `None` for
/// non-finite input or amounts outside the `i64` satoshi range.
pub fn btc_to_sats(btc: f64) -> Option<i64> {
    if !btc.is_finite() {
        return None;
    }
    let sats = (btc * SATS_PER_BTC as f64).round();
    if sats < i64::MIN as f64 || sats > i64::MAX as f64 {
        return None;
    }
    Some(sats as i64)
}

/// Sum of the positive entries, i.e. the weight actually laid out.
pub fn total_sats(entries: &[AmountEntry]) -> u64 {
    entries
        .iter()
        .filter(|e| e.sats > 0)
        .map(|e| e.sats as u64)
        .sum()
}

/// Amounts seeded when the app starts with no input.
pub fn demo_sats() -> Vec<i64> {
    vec![12_000_000, 3_500_000, 800_000, 42_000_000]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_amount_per_line() {
        let entries = parse_amounts("0.12\n0.035\n0.008\n0.42\n").unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].sats, 12_000_000);
        assert_eq!(entries[0].label, "0.12 BTC");
        assert_eq!(entries[1].sats, 3_500_000);
        assert_eq!(entries[3].sats, 42_000_000);
        let ids: Vec<u32> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn skips_blank_and_whitespace_lines() {
        let entries = parse_amounts("\n  0.5  \n\n\t\n1\n").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].sats, 50_000_000);
        assert_eq!(entries[1].sats, 100_000_000);
    }

    #[test]
    fn rejects_garbage_with_line_number() {
        let err = parse_amounts("0.5\nnot-a-number\n").unwrap_err();
        match err {
            ParseAmountError::NotANumber { line, text } => {
                assert_eq!(line, 2);
                assert_eq!(text, "not-a-number");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_non_finite() {
        assert!(matches!(
            parse_amounts("inf\n"),
            Err(ParseAmountError::NonFinite { line: 1 })
        ));
        assert!(matches!(
            parse_amounts("NaN\n"),
            Err(ParseAmountError::NonFinite { line: 1 })
        ));
    }

    #[test]
    fn keeps_negative_amounts() {
        let entries = parse_amounts("-0.25\n0.1\n").unwrap();
        assert_eq!(entries[0].sats, -25_000_000);
        assert_eq!(entries[0].label, "-0.25 BTC");
        assert_eq!(total_sats(&entries), 10_000_000);
    }

    #[test]
    fn sats_conversion_rounds() {
        assert_eq!(btc_to_sats(0.12), Some(12_000_000));
        assert_eq!(btc_to_sats(0.000000015), Some(2));
        assert_eq!(btc_to_sats(0.0), Some(0));
        assert_eq!(btc_to_sats(f64::NAN), None);
        assert_eq!(btc_to_sats(1e15), None);
    }

    #[test]
    fn total_ignores_non_positive_entries() {
        let entries = vec![
            AmountEntry {
                id: 0,
                label: "1 BTC".into(),
                sats: 100_000_000,
            },
            AmountEntry {
                id: 1,
                label: "-0.5 BTC".into(),
                sats: -50_000_000,
            },
            AmountEntry {
                id: 2,
                label: "0 BTC".into(),
                sats: 0,
            },
        ];
        assert_eq!(total_sats(&entries), 100_000_000);
    }
}
