//! Amount parsing with locale auto-detection.
//!
//! Handles the notations seen across bank exports: `1,234.56` (US),
//! `1.234,56` (EU), `1 234,56`, parenthesized/trailing-minus negatives, and
//! embedded currency symbols. Output is minor-unit ×10000 fixed point.

use anyhow::{Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::keywords::CURRENCY_TOKENS;
use crate::types::{AMOUNT_SCALE, AmountFormat};

static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.?\d*$").unwrap());

/// Parses amount cells into ×10000 fixed point. Immutable once constructed.
#[derive(Debug, Clone, Default)]
pub struct AmountParser {
    format: Option<AmountFormat>,
}

impl AmountParser {
    /// An explicit format bypasses locale auto-detection.
    pub fn new(format: Option<AmountFormat>) -> Self {
        Self { format }
    }

    pub fn parse(&self, input: &str) -> Result<i64> {
        let input = input.trim();
        if input.is_empty() {
            bail!("unable to parse amount: empty input");
        }

        let (body, negative) = detect_negative(input);
        let body = strip_currency_tokens(&body);
        let body = body.trim();
        if body.is_empty() {
            bail!("unable to parse amount: '{input}' has no numeric part");
        }

        let normalized = match &self.format {
            Some(fmt) => normalize_explicit(body, fmt),
            None => normalize_auto(body),
        };

        if !NUMERIC_RE.is_match(&normalized) {
            bail!("unable to parse amount: '{input}'");
        }

        let value: f64 = normalized
            .parse()
            .map_err(|e| anyhow::anyhow!("unable to parse amount '{input}': {e}"))?;
        let signed = if negative { -value } else { value };
        Ok((signed * AMOUNT_SCALE as f64).round() as i64)
    }

    /// Render a scaled amount back to a plain decimal string. Round-trips
    /// through [`parse`](Self::parse) losslessly.
    pub fn format(&self, scaled: i64) -> String {
        let sign = if scaled < 0 { "-" } else { "" };
        let abs = scaled.unsigned_abs();
        let whole = abs / AMOUNT_SCALE as u64;
        let frac = abs % AMOUNT_SCALE as u64;
        if frac == 0 {
            format!("{sign}{whole}")
        } else {
            let frac = format!("{frac:04}");
            format!("{sign}{whole}.{}", frac.trim_end_matches('0'))
        }
    }
}

/// First matching notation wins: parentheses, trailing minus, leading minus.
/// A leading plus is stripped as positive.
fn detect_negative(input: &str) -> (String, bool) {
    if let Some(rest) = input.strip_prefix('(') {
        let rest = rest.strip_suffix(')').unwrap_or(rest);
        return (rest.to_string(), true);
    }
    if let Some(rest) = input.strip_suffix('-') {
        return (rest.to_string(), true);
    }
    if let Some(rest) = input.strip_prefix('-') {
        return (rest.to_string(), true);
    }
    if let Some(rest) = input.strip_prefix('+') {
        return (rest.to_string(), false);
    }
    (input.to_string(), false)
}

fn strip_currency_tokens(input: &str) -> String {
    let mut out = input.to_string();
    for token in CURRENCY_TOKENS {
        if out.contains(token) {
            out = out.replace(token, "");
        }
        let lower = token.to_lowercase();
        if lower != *token && out.contains(&lower) {
            out = out.replace(&lower, "");
        }
    }
    out
}

fn normalize_explicit(body: &str, fmt: &AmountFormat) -> String {
    let mut s = body.replace(&fmt.currency_symbol, "");
    s.retain(|c| c != ' ' && c != '\u{a0}');
    if let Some(thousands) = fmt.thousands_separator {
        s.retain(|c| c != thousands);
    }
    if fmt.decimal_separator != '.' {
        s = s.replace(fmt.decimal_separator, ".");
    }
    s
}

/// Locale auto-detection over `.` and `,`: when both appear, the later one
/// is the decimal separator; a lone separator followed by exactly three
/// trailing digits is thousands grouping; repeats imply grouping. Spaces are
/// always grouping.
fn normalize_auto(body: &str) -> String {
    let mut s: String = body
        .chars()
        .filter(|c| *c != ' ' && *c != '\u{a0}')
        .collect();

    let dots: Vec<usize> = s.match_indices('.').map(|(i, _)| i).collect();
    let commas: Vec<usize> = s.match_indices(',').map(|(i, _)| i).collect();

    let decimal = match (dots.last(), commas.last()) {
        (Some(&d), Some(&c)) => Some(if d > c { '.' } else { ',' }),
        (Some(_), None) => lone_separator_role(&s, '.', &dots),
        (None, Some(_)) => lone_separator_role(&s, ',', &commas),
        (None, None) => None,
    };

    match decimal {
        Some('.') => s.retain(|c| c != ','),
        Some(',') => {
            s.retain(|c| c != '.');
            s = s.replace(',', ".");
        }
        _ => s.retain(|c| c != '.' && c != ','),
    }
    s
}

/// Decide whether a separator that appears alone is decimal or grouping.
fn lone_separator_role(s: &str, sep: char, positions: &[usize]) -> Option<char> {
    if positions.len() > 1 {
        return None; // repeated: must be grouping
    }
    let after = &s[positions[0] + 1..];
    if after.len() == 3 && after.chars().all(|c| c.is_ascii_digit()) {
        None // e.g. "1.000" — grouping
    } else {
        Some(sep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> AmountParser {
        AmountParser::default()
    }

    #[test]
    fn test_negative_notations_agree() {
        // The unclosed parenthesis still reads as negative
        assert_eq!(parser().parse("(1,234.56").unwrap(), -12_345_600);
        assert_eq!(parser().parse("(1,234.56)").unwrap(), -12_345_600);
        assert_eq!(parser().parse("-1,234.56").unwrap(), -12_345_600);
        assert_eq!(parser().parse("1,234.56-").unwrap(), -12_345_600);
    }

    #[test]
    fn test_leading_plus_is_positive() {
        assert_eq!(parser().parse("+1,234.56").unwrap(), 12_345_600);
    }

    #[test]
    fn test_locale_auto_detection() {
        assert_eq!(parser().parse("1.234,56").unwrap(), 12_345_600);
        assert_eq!(parser().parse("1,234.56").unwrap(), 12_345_600);
    }

    #[test]
    fn test_lone_separator_with_three_trailing_digits_is_grouping() {
        assert_eq!(parser().parse("1.000").unwrap(), 10_000_000);
        assert_eq!(parser().parse("1,000").unwrap(), 10_000_000);
        assert_eq!(parser().parse("100,000").unwrap(), 1_000_000_000);
    }

    #[test]
    fn test_lone_separator_otherwise_is_decimal() {
        assert_eq!(parser().parse("1.5").unwrap(), 15_000);
        assert_eq!(parser().parse("12.25").unwrap(), 122_500);
        assert_eq!(parser().parse("3,99").unwrap(), 39_900);
    }

    #[test]
    fn test_repeated_separator_is_grouping() {
        assert_eq!(parser().parse("1.234.567").unwrap(), 12_345_670_000);
        assert_eq!(parser().parse("1,234,567.89").unwrap(), 12_345_678_900);
    }

    #[test]
    fn test_space_grouping() {
        assert_eq!(parser().parse("1 234 567,89").unwrap(), 12_345_678_900);
    }

    #[test]
    fn test_currency_symbols_stripped() {
        assert_eq!(parser().parse("₫100,000").unwrap(), 1_000_000_000);
        assert_eq!(parser().parse("100,000 VND").unwrap(), 1_000_000_000);
        assert_eq!(parser().parse("100000đ").unwrap(), 1_000_000_000);
        assert_eq!(parser().parse("$1,234.56").unwrap(), 12_345_600);
        assert_eq!(parser().parse("(₫50,000)").unwrap(), -500_000_000);
    }

    #[test]
    fn test_explicit_format() {
        let parser = AmountParser::new(Some(AmountFormat {
            decimal_separator: ',',
            thousands_separator: Some('.'),
            currency_symbol: "€".to_string(),
        }));
        assert_eq!(parser.parse("€1.234,56").unwrap(), 12_345_600);
        // Explicit format is not second-guessed
        assert_eq!(parser.parse("1,5").unwrap(), 15_000);
    }

    #[test]
    fn test_rounding_not_truncation() {
        // 0.6 at the ×10000 scale; truncation would give 0
        assert_eq!(parser().parse("0.00006").unwrap(), 1);
    }

    #[test]
    fn test_error_conditions() {
        assert!(parser().parse("").is_err());
        assert!(parser().parse("   ").is_err());
        assert!(parser().parse("₫").is_err());
        assert!(parser().parse("VND").is_err());
        assert!(parser().parse("12a34").is_err());
        assert!(parser().parse("--5").is_err());
    }

    #[test]
    fn test_round_trip_stability() {
        let parser = parser();
        for s in ["1,234.56", "₫100,000", "(42.50)", "0.0001", "7"] {
            let once = parser.parse(s).unwrap();
            let again = parser.parse(&parser.format(once)).unwrap();
            assert_eq!(once, again, "round trip diverged for {s}");
        }
    }
}
