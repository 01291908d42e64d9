//! Cascading date parser for statement cells.
//!
//! Strategies are tried in order until one produces a date that passes range
//! validation: preferred-format parse, standard templates (with Vietnamese
//! month names normalized first), regex extraction with day/month repair,
//! then unix-timestamp interpretation.

use anyhow::{Result, bail};
use chrono::{DateTime, Duration, Months, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

const MONTH_ABBREVS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

static VN_MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)th[áa]ng\s*0?(\d{1,2})").unwrap());

// D/M/Y or M/D/Y with 2- or 4-digit year
static DMY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{2,4})").unwrap());

// ISO-ish Y-M-D
static YMD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})[/\-.](\d{1,2})[/\-.](\d{1,2})").unwrap());

const DAY_FIRST_TEMPLATES: &[&str] = &[
    "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d %b %Y", "%d-%b-%Y", "%d/%m/%y", "%d-%m-%y",
];

const MONTH_FIRST_TEMPLATES: &[&str] = &[
    "%m/%d/%Y", "%m-%d-%Y", "%b %d %Y", "%b %d, %Y", "%m/%d/%y",
];

const ISO_TEMPLATES: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

const DATETIME_TEMPLATES: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parses dates from statement cells. Immutable once constructed; safe to
/// share across row-parsing tasks.
#[derive(Debug, Clone)]
pub struct DateParser {
    preferred_format: Option<String>,
    tz: Tz,
}

impl Default for DateParser {
    fn default() -> Self {
        Self {
            preferred_format: None,
            tz: chrono_tz::Asia::Ho_Chi_Minh,
        }
    }
}

impl DateParser {
    /// `preferred_format` uses display tokens ("DD/MM/YYYY"); it breaks
    /// day/month ties but never prevents an unambiguous parse.
    pub fn new(preferred_format: Option<&str>, tz: Tz) -> Self {
        Self {
            preferred_format: preferred_format.map(str::to_string),
            tz,
        }
    }

    pub fn with_preferred_format(preferred_format: &str) -> Self {
        Self {
            preferred_format: Some(preferred_format.to_string()),
            ..Self::default()
        }
    }

    pub fn parse(&self, input: &str) -> Result<NaiveDate> {
        let input = input.trim();
        if input.is_empty() {
            bail!("unable to parse date: empty input");
        }

        let strategies: &[fn(&Self, &str) -> Option<NaiveDate>] = &[
            Self::try_preferred_format,
            Self::try_templates,
            Self::try_regex_extraction,
            Self::try_unix_timestamp,
        ];

        for strategy in strategies {
            if let Some(date) = strategy(self, input) {
                if self.in_valid_range(date) {
                    return Ok(date);
                }
                tracing::debug!(%date, input, "candidate date rejected by range validation");
            }
        }

        bail!("unable to parse date: '{input}'")
    }

    /// True when the preferred format (or the default locale) puts the day
    /// before the month.
    fn day_first(&self) -> bool {
        match &self.preferred_format {
            Some(fmt) => {
                let fmt = fmt.to_uppercase();
                match (fmt.find("DD"), fmt.find("MM")) {
                    (Some(d), Some(m)) => d < m,
                    _ => true,
                }
            }
            None => true,
        }
    }

    fn try_preferred_format(&self, input: &str) -> Option<NaiveDate> {
        let fmt = display_format_to_chrono(self.preferred_format.as_deref()?);
        NaiveDate::parse_from_str(input, &fmt).ok()
    }

    fn try_templates(&self, input: &str) -> Option<NaiveDate> {
        let normalized = normalize_vietnamese_months(input);
        let input = normalized.as_ref();

        let ordered: Vec<&str> = if self.day_first() {
            DAY_FIRST_TEMPLATES
                .iter()
                .chain(ISO_TEMPLATES)
                .chain(MONTH_FIRST_TEMPLATES)
                .copied()
                .collect()
        } else {
            MONTH_FIRST_TEMPLATES
                .iter()
                .chain(ISO_TEMPLATES)
                .chain(DAY_FIRST_TEMPLATES)
                .copied()
                .collect()
        };

        for template in ordered {
            if let Ok(date) = NaiveDate::parse_from_str(input, template) {
                return Some(date);
            }
        }
        for template in DATETIME_TEMPLATES {
            if let Ok(dt) = NaiveDateTime::parse_from_str(input, template) {
                return Some(dt.date());
            }
        }
        None
    }

    /// Pull a date pattern out of surrounding text, repairing the day/month
    /// interpretation when the preferred order is impossible.
    fn try_regex_extraction(&self, input: &str) -> Option<NaiveDate> {
        if let Some(caps) = YMD_RE.captures(input) {
            let y: i32 = caps[1].parse().ok()?;
            let m: u32 = caps[2].parse().ok()?;
            let d: u32 = caps[3].parse().ok()?;
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                return Some(date);
            }
        }

        let caps = DMY_RE.captures(input)?;
        let a: u32 = caps[1].parse().ok()?;
        let b: u32 = caps[2].parse().ok()?;
        let year = expand_year(caps[3].parse().ok()?);

        let (mut day, mut month) = if self.day_first() { (a, b) } else { (b, a) };
        if month > 12 || day > 31 {
            std::mem::swap(&mut day, &mut month);
        }
        NaiveDate::from_ymd_opt(year, month, day)
    }

    fn try_unix_timestamp(&self, input: &str) -> Option<NaiveDate> {
        let digits: String = input.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return None;
        }
        let mut secs: i64 = digits.parse().ok()?;
        if secs.abs() > 10_000_000_000 {
            secs /= 1000; // milliseconds
        }
        Some(DateTime::<Utc>::from_timestamp(secs, 0)?.date_naive())
    }

    /// Reject dates more than a day in the future (timezone-skew grace) or
    /// more than 50 years in the past.
    fn in_valid_range(&self, date: NaiveDate) -> bool {
        let today = Utc::now().with_timezone(&self.tz).date_naive();
        if date > today + Duration::days(1) {
            return false;
        }
        // Month arithmetic clamps Feb 29 instead of failing on it.
        let floor = today
            .checked_sub_months(Months::new(50 * 12))
            .unwrap_or(NaiveDate::MIN);
        date >= floor
    }
}

/// Convert display tokens ("DD/MM/YYYY") into a chrono format string.
fn display_format_to_chrono(fmt: &str) -> String {
    fmt.to_uppercase()
        .replace("YYYY", "%Y")
        .replace("MMM", "%b")
        .replace("MM", "%m")
        .replace("DD", "%d")
        .replace("YY", "%y")
}

/// "Tháng 3" / "thang 03" → "Mar", so the standard templates can match.
fn normalize_vietnamese_months(input: &str) -> std::borrow::Cow<'_, str> {
    VN_MONTH_RE.replace_all(input, |caps: &regex::Captures| {
        caps[1]
            .parse::<usize>()
            .ok()
            .and_then(|m| MONTH_ABBREVS.get(m.wrapping_sub(1)))
            .map_or_else(|| caps[0].to_string(), |abbrev| (*abbrev).to_string())
    })
}

fn expand_year(y: i32) -> i32 {
    match y {
        0..=50 => 2000 + y,
        51..=99 => 1900 + y,
        _ => y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn years_ago(years: u32) -> NaiveDate {
        Utc::now()
            .date_naive()
            .checked_sub_months(Months::new(years * 12))
            .unwrap()
    }

    fn day_first_parser() -> DateParser {
        DateParser::with_preferred_format("DD/MM/YYYY")
    }

    #[test]
    fn test_preferred_format_wins() {
        let parser = day_first_parser();
        let date = parser.parse("15/01/2026").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
    }

    #[test]
    fn test_ambiguity_repair_against_preference() {
        // month=15 is impossible, so MM/DD preference must not stop the
        // parse from resolving to 15 January.
        let parser = DateParser::with_preferred_format("MM/DD/YYYY");
        let date = parser.parse("15/01/2026").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
    }

    #[test]
    fn test_month_first_preference_honored_when_ambiguous() {
        let parser = DateParser::with_preferred_format("MM/DD/YYYY");
        let date = parser.parse("01/02/2026").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
    }

    #[test]
    fn test_iso_dates() {
        let parser = DateParser::default();
        assert_eq!(
            parser.parse("2026-03-07").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 7).unwrap()
        );
    }

    #[test]
    fn test_vietnamese_month_names() {
        let parser = day_first_parser();
        let date = parser.parse("15 Tháng 3 2026").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
    }

    #[test]
    fn test_two_digit_year_windows() {
        let parser = day_first_parser();
        assert_eq!(
            parser.parse("15/01/26").unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
        );
        // 99 maps to 1999, which is within the 50-year window
        assert_eq!(
            parser.parse("15/01/99").unwrap(),
            NaiveDate::from_ymd_opt(1999, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_datetime_templates() {
        let parser = day_first_parser();
        assert_eq!(
            parser.parse("15/01/2026 13:45:00").unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_embedded_date_extracted() {
        let parser = day_first_parser();
        assert_eq!(
            parser.parse("GD ngay 15.01.2026 luc 10h").unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_unix_timestamp_seconds_and_millis() {
        let parser = day_first_parser();
        // 2026-01-15 00:00:00 UTC
        assert_eq!(
            parser.parse("1768435200").unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
        );
        assert_eq!(
            parser.parse("1768435200000").unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_rejects_far_past_and_future() {
        let parser = day_first_parser();

        let stale = years_ago(53);
        assert!(parser.parse(&stale.format("%d/%m/%Y").to_string()).is_err());

        let ahead = Utc::now().date_naive() + Duration::days(3);
        assert!(parser.parse(&ahead.format("%d/%m/%Y").to_string()).is_err());
    }

    #[test]
    fn test_fifty_year_window_active_on_any_calendar_day() {
        // The floor must hold even when subtracting whole years from today
        // would land on a nonexistent date (a Feb 29 anchor).
        let parser = day_first_parser();
        assert!(parser.parse(&years_ago(49).format("%d/%m/%Y").to_string()).is_ok());
        assert!(parser.parse(&years_ago(51).format("%d/%m/%Y").to_string()).is_err());
    }

    #[test]
    fn test_tomorrow_within_grace() {
        let parser = day_first_parser();
        let tomorrow = Utc::now().date_naive() + Duration::days(1);
        // A day of skew is allowed for timezone differences
        assert!(parser.parse(&tomorrow.format("%d/%m/%Y").to_string()).is_ok());
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(day_first_parser().parse("").is_err());
        assert!(day_first_parser().parse("   ").is_err());
    }

    #[test]
    fn test_garbage_fails() {
        assert!(day_first_parser().parse("not a date").is_err());
    }
}
