//! Price normalization for scraped product data.
//!
//! Scrapers send prices either as numbers or as the text they found on the
//! page (`"¥998,000"`, `"44,650円"`). Everything is reduced to a whole-yen
//! integer before validation.

use serde::{Deserialize, Serialize};

/// Prices at or above this value are refused.
pub const PRICE_CEILING: i64 = 1_000_000;

/// A price as it arrives on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for RawPrice {
    fn from(v: i64) -> Self {
        RawPrice::Integer(v)
    }
}

impl From<&str> for RawPrice {
    fn from(v: &str) -> Self {
        RawPrice::Text(v.to_string())
    }
}

impl From<String> for RawPrice {
    fn from(v: String) -> Self {
        RawPrice::Text(v)
    }
}

/// Normalize a raw price to an integer.
///
/// Numeric input (including numeric strings such as `"998000.5"`) is truncated
/// to its integer part. Any other string is reduced to its digits, so
/// `"¥998,000"` becomes `998000`. Returns `None` when nothing numeric is left.
/// Digit runs too long for an `i64` saturate, which the ceiling check rejects.
pub fn normalize_price(raw: &RawPrice) -> Option<i64> {
    match raw {
        RawPrice::Integer(i) => Some(*i),
        RawPrice::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        RawPrice::Float(_) => None,
        RawPrice::Text(text) => {
            if let Some(value) = parse_numeric(text) {
                return Some(value);
            }
            let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                return None;
            }
            Some(digits.parse::<i64>().unwrap_or(i64::MAX))
        }
    }
}

/// Parse strings that are plain numbers: optional sign, digits, optional
/// fraction and exponent, surrounding whitespace allowed.
fn parse_numeric(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(i);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
}

/// Format a whole-yen amount with thousands separators (e.g. "¥998,000").
pub fn display_yen(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-\u{00a5}{}", grouped)
    } else {
        format!("\u{00a5}{}", grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_yen_text() {
        assert_eq!(normalize_price(&"¥998,000".into()), Some(998_000));
        assert_eq!(normalize_price(&"44,650円".into()), Some(44_650));
        assert_eq!(normalize_price(&"1,200,000".into()), Some(1_200_000));
    }

    #[test]
    fn test_normalize_numbers() {
        assert_eq!(normalize_price(&RawPrice::Integer(350_000)), Some(350_000));
        assert_eq!(normalize_price(&RawPrice::Float(998_000.9)), Some(998_000));
        assert_eq!(normalize_price(&"998000.9".into()), Some(998_000));
        assert_eq!(normalize_price(&" 1200 ".into()), Some(1200));
    }

    #[test]
    fn test_normalize_nothing_numeric() {
        assert_eq!(normalize_price(&"価格未定".into()), None);
        assert_eq!(normalize_price(&"".into()), None);
        assert_eq!(normalize_price(&RawPrice::Float(f64::NAN)), None);
    }

    #[test]
    fn test_normalize_overflowing_digits_saturates() {
        let huge = "9".repeat(40);
        assert_eq!(normalize_price(&huge.as_str().into()), Some(i64::MAX));
    }

    #[test]
    fn test_raw_price_deserializes_untagged() {
        let n: RawPrice = serde_json::from_str("120000").unwrap();
        assert_eq!(n, RawPrice::Integer(120_000));

        let s: RawPrice = serde_json::from_str("\"¥120,000\"").unwrap();
        assert_eq!(s, RawPrice::Text("¥120,000".to_string()));
    }

    #[test]
    fn test_display_yen() {
        assert_eq!(display_yen(998_000), "\u{00a5}998,000");
        assert_eq!(display_yen(500), "\u{00a5}500");
        assert_eq!(display_yen(1_000), "\u{00a5}1,000");
    }
}
