use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

/// Satoshi count with thousands separators, e.g. `12,000,000`.
pub fn format_sats(sats: u64) -> String {
    group_thousands(&sats.to_string())
}

/// BTC amount in its shortest decimal form, e.g. `0.12`.
pub fn format_btc(sats: i64) -> String {
    let btc = sats as f64 / 100_000_000.0;
    format!("{btc}")
}

/// BTC amount with the full 8 decimal places, e.g. `0.56300000`.
pub fn format_btc_fixed(sats: u64) -> String {
    format!("{:.8}", sats as f64 / 100_000_000.0)
}

/// Fiat value with symbol, two decimals, and thousands separators,
/// e.g. `€61,234.50`.
pub fn format_fiat(value: f64, symbol: &str) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{symbol}{}.{frac_part}", group_thousands(int_part))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && i % 3 == offset {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
