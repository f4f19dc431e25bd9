//! Flexible textual parsers for temporal, complex, and boolean values.
//!
//! String-to-datetime and string-to-duration coercions go through these
//! parsers instead of the per-element conversion table, so that archive
//! exports with mixed locale formats still round-trip.

use chrono::{DateTime, Duration as TimeDelta, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use num_complex::Complex64;
use once_cell::sync::Lazy;
use regex::Regex;

/// Clock-style interval: `[Nd ]H:MM:SS[.fff]`, optionally signed.
static DURATION_CLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-)?(?:(\d+)d\s+)?(\d+):([0-5]?\d):([0-5]?\d(?:\.\d+)?)$").unwrap()
});

/// Single-unit interval: `90s`, `1.5h`, `3 days`.
static DURATION_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(-?\d+(?:\.\d+)?)\s*(s|sec|secs|m|min|mins|h|hr|hrs|d|day|days)$").unwrap()
});

/// Ordered format lists for datetime text.
#[derive(Debug, Clone)]
pub struct TextParserConfig {
    /// Naive datetime formats, tried in order and interpreted as UTC.
    pub datetime_formats: Vec<String>,
    /// Date-only formats, tried in order and anchored at UTC midnight.
    pub date_formats: Vec<String>,
}

impl Default for TextParserConfig {
    fn default() -> Self {
        Self {
            datetime_formats: vec![
                "%Y-%m-%dT%H:%M:%S%.f".to_string(),
                "%Y-%m-%d %H:%M:%S%.f".to_string(),
            ],
            date_formats: vec![
                "%Y-%m-%d".to_string(), // ISO date
                "%Y/%m/%d".to_string(), // Alt ISO
                "%m/%d/%Y".to_string(), // US date
                "%d-%m-%Y".to_string(), // European date
            ],
        }
    }
}

/// Parses textual values against a configured format list.
#[derive(Debug, Clone, Default)]
pub struct TextParser {
    config: TextParserConfig,
}

impl TextParser {
    /// Create a parser with the default format lists.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom format lists.
    pub fn with_config(config: TextParserConfig) -> Self {
        Self { config }
    }

    /// Parse a timezone-aware datetime. Text with an explicit offset keeps
    /// it; naive text is interpreted as UTC.
    pub fn parse_datetime(&self, raw: &str) -> Option<DateTime<FixedOffset>> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt);
        }
        if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f %z") {
            return Some(dt);
        }
        for fmt in &self.config.datetime_formats {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Utc.from_utc_datetime(&naive).fixed_offset());
            }
        }
        for fmt in &self.config.date_formats {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                let naive = date.and_hms_opt(0, 0, 0)?;
                return Some(Utc.from_utc_datetime(&naive).fixed_offset());
            }
        }
        None
    }

    /// Parse a time interval: bare seconds (`"90.5"`), clock form
    /// (`"1d 02:03:04.5"`), or single-unit form (`"90s"`, `"1.5h"`).
    pub fn parse_duration(&self, raw: &str) -> Option<TimeDelta> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(secs) = s.parse::<f64>() {
            return duration_from_secs(secs);
        }
        if let Some(caps) = DURATION_CLOCK.captures(s) {
            let sign = if caps.get(1).is_some() { -1.0 } else { 1.0 };
            let days: f64 = caps.get(2).map_or(Ok(0.0), |m| m.as_str().parse()).ok()?;
            let hours: f64 = caps[3].parse().ok()?;
            let minutes: f64 = caps[4].parse().ok()?;
            let seconds: f64 = caps[5].parse().ok()?;
            let total = days * 86_400.0 + hours * 3_600.0 + minutes * 60.0 + seconds;
            return duration_from_secs(sign * total);
        }
        if let Some(caps) = DURATION_UNIT.captures(s) {
            let value: f64 = caps[1].parse().ok()?;
            let scale = match caps[2].to_ascii_lowercase().as_str() {
                "s" | "sec" | "secs" => 1.0,
                "m" | "min" | "mins" => 60.0,
                "h" | "hr" | "hrs" => 3_600.0,
                _ => 86_400.0,
            };
            return duration_from_secs(value * scale);
        }
        None
    }
}

static DEFAULT_PARSER: Lazy<TextParser> = Lazy::new(TextParser::new);

/// Parse a datetime with the default format lists.
pub fn parse_datetime(raw: &str) -> Option<DateTime<FixedOffset>> {
    DEFAULT_PARSER.parse_datetime(raw)
}

/// Parse a duration with the default format lists.
pub fn parse_duration(raw: &str) -> Option<TimeDelta> {
    DEFAULT_PARSER.parse_duration(raw)
}

/// Parse a complex number. Accepts `a+bi` and `a+bj` forms, with or without
/// surrounding parentheses.
pub fn parse_complex(raw: &str) -> Option<Complex64> {
    let mut s = raw.trim();
    if s.starts_with('(') && s.ends_with(')') {
        s = &s[1..s.len() - 1];
    }
    let normalized;
    let s = if s.ends_with('j') || s.ends_with('J') {
        normalized = format!("{}i", &s[..s.len() - 1]);
        normalized.as_str()
    } else {
        s
    };
    s.parse::<Complex64>().ok()
}

/// Parse a boolean: `true`/`t` and `false`/`f`, any case.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "t" => Some(true),
        "false" | "f" => Some(false),
        _ => None,
    }
}

/// Build an aware datetime from Unix seconds (fractional allowed).
pub(crate) fn datetime_from_unix(secs: f64) -> Option<DateTime<FixedOffset>> {
    if !secs.is_finite() {
        return None;
    }
    let mut whole = secs.div_euclid(1.0);
    let mut nanos = ((secs - whole) * 1e9).round();
    if nanos >= 1e9 {
        whole += 1.0;
        nanos = 0.0;
    }
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp(whole as i64, nanos as u32).map(|dt| dt.fixed_offset())
}

/// Build a time interval from seconds (fractional allowed).
pub(crate) fn duration_from_secs(secs: f64) -> Option<TimeDelta> {
    if !secs.is_finite() {
        return None;
    }
    let nanos = (secs * 1e9).round();
    if nanos < i64::MIN as f64 || nanos > i64::MAX as f64 {
        return None;
    }
    Some(TimeDelta::nanoseconds(nanos as i64))
}

/// Unix seconds of an aware datetime, with subsecond precision.
pub(crate) fn unix_seconds(dt: &DateTime<FixedOffset>) -> f64 {
    dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) * 1e-9
}

/// Total seconds of an interval, with subsecond precision.
pub(crate) fn total_seconds(td: &TimeDelta) -> f64 {
    td.num_seconds() as f64
        + (*td - TimeDelta::seconds(td.num_seconds()))
            .num_nanoseconds()
            .unwrap_or(0) as f64
            * 1e-9
}
