//! Field validators and coercions applied to raw extraction payloads.
//!
//! Everything here runs *before* a pass reaches [`crate::merge::fold`]. The
//! merge itself only chooses between already-clean strings.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;

static BARCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{12,13}$").expect("valid barcode regex"));

/// Captures either a thousands-grouped amount (`1,299.99`) in group 2 or a
/// plain amount with an optional `.`/`,` decimal separator in group 3.
static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-)?(?:([0-9]{1,3}(?:,[0-9]{3})+(?:\.[0-9]+)?)|([0-9]+(?:[.,][0-9]+)?))")
        .expect("valid price regex")
});

/// Lowercase markers that tie an amount to a currency when written next to it.
const CURRENCY_MARKERS: [&str; 8] = ["$", "€", "£", "¥", "usd", "eur", "gbp", "cad"];

static QUANTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(-)?([0-9]+)(?:\.([0-9]+))?").expect("valid quantity regex"));

/// `true` for exactly 12 or 13 ASCII digits (UPC-A / EAN-13 shape).
///
/// The check digit is not verified; shape alone is the trust signal.
#[must_use]
pub fn is_well_formed_barcode(value: &str) -> bool {
    BARCODE_RE.is_match(value)
}

/// Strips whitespace and hyphens that OCR commonly inserts between digit
/// groups. The result may still be malformed; the merge decides preference.
#[must_use]
pub fn normalize_barcode(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Trims and collapses internal whitespace. Blank input becomes `None`.
#[must_use]
pub fn normalize_text(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// Renders a scalar JSON value as field text.
///
/// Arrays, objects and nulls are not field values and yield `None`.
#[must_use]
pub fn stringify_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => normalize_text(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Coerces a price into a two-decimal string, e.g. `"$12.9"` → `"12.90"`.
///
/// Accepts JSON numbers and strings with currency noise (`"USD 4.5"`,
/// `"12,99"`, `"1,299.00"`). Negative or unparseable values yield `None`.
#[must_use]
pub fn coerce_price(value: &Value) -> Option<String> {
    let amount = match value {
        Value::Number(n) => parse_decimal(&n.to_string())?,
        Value::String(s) => parse_price_text(s)?,
        _ => return None,
    };

    if amount.is_sign_negative() {
        return None;
    }

    let mut rounded = amount.round_dp(2);
    rounded.rescale(2);
    Some(rounded.to_string())
}

/// Picks the amount next to a currency marker (`"Pack of 32 - $3.99"` →
/// `3.99`), falling back to the first number in the text.
fn parse_price_text(raw: &str) -> Option<Decimal> {
    let candidates: Vec<_> = PRICE_RE.captures_iter(raw).collect();
    let caps = candidates
        .iter()
        .find(|c| {
            c.get(0)
                .is_some_and(|m| is_currency_adjacent(raw, m.start(), m.end()))
        })
        .or_else(|| candidates.first())?;
    let matched = caps.get(0)?;
    if caps.get(1).is_some() || has_attached_minus(&raw[..matched.start()]) {
        return None;
    }

    let normalized = if let Some(grouped) = caps.get(2) {
        grouped.as_str().replace(',', "")
    } else {
        caps.get(3)?.as_str().replace(',', ".")
    };

    parse_decimal(&normalized)
}

fn is_currency_adjacent(raw: &str, start: usize, end: usize) -> bool {
    let before = raw[..start].trim_end().to_ascii_lowercase();
    let after = raw[end..].trim_start().to_ascii_lowercase();
    CURRENCY_MARKERS
        .iter()
        .any(|marker| before.ends_with(marker) || after.starts_with(marker))
}

/// `true` when `prefix` ends in a sign bound to the amount, as in `"-$3.00"`.
/// A free-standing dash (`"32 - $3.99"`) is a separator, not a sign.
fn has_attached_minus(prefix: &str) -> bool {
    let trimmed = prefix.trim_end();
    let lower = trimmed.to_ascii_lowercase();
    let without_marker = CURRENCY_MARKERS
        .iter()
        .find(|marker| lower.ends_with(*marker))
        .map_or(trimmed, |marker| &trimmed[..trimmed.len() - marker.len()]);
    without_marker.ends_with('-')
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Coerces a unit count into a whole-number string.
///
/// Accepts non-negative integers, integral floats (`3.0`), and text holding
/// an integer (`"32 pack"`, `"Pack of 32"`). Fractional or negative counts
/// yield `None`.
#[must_use]
pub fn coerce_quantity(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            if let Some(whole) = n.as_u64() {
                return Some(whole.to_string());
            }
            let float = n.as_f64()?;
            if float >= 0.0 && float.fract() == 0.0 && float <= 9_007_199_254_740_992.0 {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let whole = float as u64;
                Some(whole.to_string())
            } else {
                None
            }
        }
        Value::String(s) => {
            let caps = QUANTITY_RE.captures(s)?;
            if caps.get(1).is_some() {
                return None;
            }
            if let Some(frac) = caps.get(3) {
                if frac.as_str().chars().any(|c| c != '0') {
                    return None;
                }
            }
            let digits = caps.get(2)?.as_str().trim_start_matches('0');
            Some(if digits.is_empty() {
                "0".to_string()
            } else {
                digits.to_string()
            })
        }
        _ => None,
    }
}

/// Maps a self-reported confidence into `[0, 1]`.
///
/// Missing and non-numeric values count as `0.0`. Out-of-range values are
/// clamped and logged since they point at a misbehaving backend.
#[must_use]
pub fn clamp_confidence(raw: Option<&Value>) -> f64 {
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(c) if c.is_finite() => {
            if !(0.0..=1.0).contains(&c) {
                tracing::warn!(confidence = c, "extraction confidence out of range; clamping");
            }
            c.clamp(0.0, 1.0)
        }
        Some(c) => {
            tracing::warn!(confidence = %c, "non-finite extraction confidence; treating as 0");
            0.0
        }
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn barcode_accepts_twelve_and_thirteen_digits() {
        assert!(is_well_formed_barcode("123456789012"));
        assert!(is_well_formed_barcode("1234567890123"));
    }

    #[test]
    fn barcode_rejects_wrong_length_or_non_digits() {
        assert!(!is_well_formed_barcode("12"));
        assert!(!is_well_formed_barcode("12345678901"));
        assert!(!is_well_formed_barcode("12345678901234"));
        assert!(!is_well_formed_barcode("12345678901O"));
        assert!(!is_well_formed_barcode("１２３４５６７８９０１２"));
        assert!(!is_well_formed_barcode(""));
    }

    #[test]
    fn normalize_barcode_strips_spaces_and_hyphens() {
        assert_eq!(
            normalize_barcode("0 12345-67890 5").as_deref(),
            Some("012345678905")
        );
        assert_eq!(normalize_barcode(" - ").as_deref(), None);
    }

    #[test]
    fn normalize_barcode_keeps_malformed_values() {
        assert_eq!(normalize_barcode("ABC 12").as_deref(), Some("ABC12"));
    }

    #[test]
    fn normalize_text_collapses_whitespace() {
        assert_eq!(
            normalize_text("  RAW\n King   Size ").as_deref(),
            Some("RAW King Size")
        );
        assert_eq!(normalize_text(" \t ").as_deref(), None);
    }

    #[test]
    fn stringify_value_handles_scalars_only() {
        assert_eq!(stringify_value(&json!(" RAW ")).as_deref(), Some("RAW"));
        assert_eq!(stringify_value(&json!(42)).as_deref(), Some("42"));
        assert_eq!(stringify_value(&json!(true)).as_deref(), Some("true"));
        assert_eq!(stringify_value(&json!(null)), None);
        assert_eq!(stringify_value(&json!(["a"])), None);
        assert_eq!(stringify_value(&json!({"a": 1})), None);
    }

    #[test]
    fn coerce_price_from_number() {
        assert_eq!(coerce_price(&json!(12.99)).as_deref(), Some("12.99"));
        assert_eq!(coerce_price(&json!(5)).as_deref(), Some("5.00"));
        assert_eq!(coerce_price(&json!(3.456)).as_deref(), Some("3.46"));
    }

    #[test]
    fn coerce_price_strips_currency_noise() {
        assert_eq!(coerce_price(&json!("$12.9")).as_deref(), Some("12.90"));
        assert_eq!(coerce_price(&json!("USD 4.5")).as_deref(), Some("4.50"));
        assert_eq!(coerce_price(&json!("12,99 €")).as_deref(), Some("12.99"));
        assert_eq!(coerce_price(&json!("$1,299.00")).as_deref(), Some("1299.00"));
    }

    #[test]
    fn coerce_price_prefers_amount_next_to_currency() {
        assert_eq!(coerce_price(&json!("Pack of 32 - $3.99")).as_deref(), Some("3.99"));
        assert_eq!(coerce_price(&json!("2 for $5")).as_deref(), Some("5.00"));
        assert_eq!(coerce_price(&json!("32 ct, 4.99 USD")).as_deref(), Some("4.99"));
        assert_eq!(coerce_price(&json!("50 leaves 1,99 €")).as_deref(), Some("1.99"));
    }

    #[test]
    fn coerce_price_rejects_negative_and_garbage() {
        assert_eq!(coerce_price(&json!(-1.0)), None);
        assert_eq!(coerce_price(&json!("-$3.00")), None);
        assert_eq!(coerce_price(&json!("call for price")), None);
        assert_eq!(coerce_price(&json!(null)), None);
    }

    #[test]
    fn coerce_quantity_from_numbers() {
        assert_eq!(coerce_quantity(&json!(32)).as_deref(), Some("32"));
        assert_eq!(coerce_quantity(&json!(3.0)).as_deref(), Some("3"));
        assert_eq!(coerce_quantity(&json!(2.5)), None);
        assert_eq!(coerce_quantity(&json!(-4)), None);
    }

    #[test]
    fn coerce_quantity_from_text() {
        assert_eq!(coerce_quantity(&json!("32 pack")).as_deref(), Some("32"));
        assert_eq!(coerce_quantity(&json!("Pack of 32")).as_deref(), Some("32"));
        assert_eq!(coerce_quantity(&json!("007")).as_deref(), Some("7"));
        assert_eq!(coerce_quantity(&json!("12.0")).as_deref(), Some("12"));
        assert_eq!(coerce_quantity(&json!("1.5 oz")), None);
        assert_eq!(coerce_quantity(&json!("-2")), None);
        assert_eq!(coerce_quantity(&json!("several")), None);
    }

    #[test]
    fn clamp_confidence_bounds_values() {
        assert!((clamp_confidence(Some(&json!(0.42))) - 0.42).abs() < f64::EPSILON);
        assert!((clamp_confidence(Some(&json!(1.7))) - 1.0).abs() < f64::EPSILON);
        assert!(clamp_confidence(Some(&json!(-0.2))).abs() < f64::EPSILON);
        assert!((clamp_confidence(Some(&json!("0.9"))) - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn clamp_confidence_defaults_missing_to_zero() {
        assert!(clamp_confidence(None).abs() < f64::EPSILON);
        assert!(clamp_confidence(Some(&json!(null))).abs() < f64::EPSILON);
        assert!(clamp_confidence(Some(&json!("high"))).abs() < f64::EPSILON);
        assert!(clamp_confidence(Some(&json!("NaN"))).abs() < f64::EPSILON);
    }
}
