//! Description normalization: strip bank boilerplate, pull out the merchant
//! name, and settle the casing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::keywords::{BOILERPLATE_PREFIXES, CITY_TOKENS, MINOR_WORDS};

/// Fallback description when cleaning leaves nothing behind.
pub const DEFAULT_DESCRIPTION: &str = "Imported Transaction";

// REF:..., TRACE#:..., AUTH:..., TXN:... and friends
static REF_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:REF|TRACE#?|AUTH|TXN|TRANS|FT)[:#]\S+").unwrap());

// Account/card numbers: unbroken digit runs of 10+
static LONG_DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{10,}").unwrap());

// Masked card patterns like "**** **** **** 1234"
static MASKED_CARD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\*{2,}[ \-]?)+(?:\d{4})?").unwrap());

static FIVE_DIGIT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{5,}").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Cleans raw statement descriptions into merchant-style names.
///
/// The prefix and city tables are injectable so tests (and other locales)
/// can substitute their own.
#[derive(Debug, Clone)]
pub struct DescriptionCleaner {
    prefixes: Vec<String>,
    city_tokens: Vec<String>,
}

impl Default for DescriptionCleaner {
    fn default() -> Self {
        Self {
            prefixes: BOILERPLATE_PREFIXES.iter().map(|s| s.to_string()).collect(),
            city_tokens: CITY_TOKENS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl DescriptionCleaner {
    pub fn new(prefixes: Vec<String>, city_tokens: Vec<String>) -> Self {
        Self {
            prefixes,
            city_tokens,
        }
    }

    pub fn clean(&self, input: &str) -> String {
        let s = self.strip_prefix(input.trim());
        let s = REF_CODE_RE.replace_all(&s, " ");
        let s = LONG_DIGITS_RE.replace_all(&s, " ");
        let s = MASKED_CARD_RE.replace_all(&s, " ");
        let s = self.extract_merchant(&s);
        let s = WHITESPACE_RE.replace_all(s.trim(), " ").into_owned();
        let s = normalize_case(&s);
        if s.is_empty() {
            DEFAULT_DESCRIPTION.to_string()
        } else {
            s
        }
    }

    /// Remove the first matching boilerplate prefix (upper-case comparison).
    fn strip_prefix(&self, input: &str) -> String {
        let upper = input.to_uppercase();
        for prefix in &self.prefixes {
            if upper.starts_with(prefix.as_str()) {
                // Slice by the upper-cased length; prefixes are chosen so
                // case folding does not change their byte length.
                if input.is_char_boundary(prefix.len()) {
                    return input[prefix.len()..].to_string();
                }
            }
        }
        input.to_string()
    }

    /// Try, in order: text before a city/country token, text before a 5+
    /// digit run, the first 3–30 characters. First hit of 3+ chars wins.
    fn extract_merchant(&self, input: &str) -> String {
        let trimmed = input.trim();
        let upper = trimmed.to_uppercase();

        let city_pos = self
            .city_tokens
            .iter()
            .filter_map(|city| upper.find(city.as_str()))
            .min();
        if let Some(pos) = city_pos {
            if trimmed.is_char_boundary(pos) {
                let before = trimmed[..pos].trim();
                if before.chars().count() >= 3 {
                    return before.to_string();
                }
            }
        }

        if let Some(m) = FIVE_DIGIT_RUN_RE.find(trimmed) {
            let before = trimmed[..m.start()].trim();
            if before.chars().count() >= 3 {
                return before.to_string();
            }
        }

        if trimmed.chars().count() >= 3 {
            return trimmed.chars().take(30).collect::<String>().trim().to_string();
        }

        trimmed.to_string()
    }
}

/// Title-case strings that are entirely upper- or lower-case (ignoring
/// non-letters); mixed-case input is assumed already well-formed.
fn normalize_case(input: &str) -> String {
    let letters: Vec<char> = input.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.is_empty() {
        return input.to_string();
    }
    let all_upper = letters.iter().all(|c| c.is_uppercase());
    let all_lower = letters.iter().all(|c| c.is_lowercase());
    if !all_upper && !all_lower {
        return input.to_string();
    }
    title_case(input)
}

fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i > 0 && MINOR_WORDS.contains(&lower.as_str()) {
                lower
            } else {
                let mut chars = lower.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => lower,
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
