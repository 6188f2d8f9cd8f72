//! # Display Formatting
//!
//! Currency, percentage and timestamp rendering for tables and reports.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Placeholder for missing values.
pub const MISSING: &str = "-";

/// Format an amount in US dollars with thousands separators: `-$1,234.56`.
#[must_use]
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return MISSING.to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let grouped = group_thousands(whole);
    // "-0.00" is shown without a sign.
    if value.is_sign_negative() && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        format!("-${grouped}.{cents}")
    } else {
        format!("${grouped}.{cents}")
    }
}

/// Format an optional amount, `-` when absent.
#[must_use]
pub fn format_optional_currency(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), format_currency)
}

/// Format a percentage with two decimals: `1.50%`.
#[must_use]
pub fn format_percent(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}%")
    } else {
        MISSING.to_string()
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// =============================================================================
// TIMESTAMPS
// =============================================================================

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 (`2025-03-01T12:00:00+00:00`), naive ISO date-times with
/// or without fractional seconds (taken as UTC), and bare dates (midnight UTC).
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, pattern) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Render a backend timestamp in the given time zone as
/// `MM/DD/YYYY, HH:MM AM`. Missing or unparsable input renders as `-`.
#[must_use]
pub fn format_datetime_in<Tz: TimeZone>(text: Option<&str>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    text.and_then(parse_timestamp)
        .map(|utc| {
            utc.with_timezone(tz)
                .format("%m/%d/%Y, %I:%M %p")
                .to_string()
        })
        .unwrap_or_else(|| MISSING.to_string())
}

/// [`format_datetime_in`] using the machine's local time zone.
#[must_use]
pub fn format_local_datetime(text: Option<&str>) -> String {
    format_datetime_in(text, &chrono::Local)
}

/// Calendar date of a backend timestamp in the given time zone.
#[must_use]
pub fn local_date_in<Tz: TimeZone>(text: &str, tz: &Tz) -> Option<NaiveDate> {
    parse_timestamp(text).map(|utc| utc.with_timezone(tz).date_naive())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn currency_grouping_and_rounding() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(5.0), "$5.00");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_currency(-42.1), "-$42.10");
        assert_eq!(format_currency(-0.001), "$0.00");
        assert_eq!(format_currency(f64::NAN), "-");
    }

    #[test]
    fn optional_currency_and_percent() {
        assert_eq!(format_optional_currency(None), "-");
        assert_eq!(format_optional_currency(Some(100_000.0)), "$100,000.00");
        assert_eq!(format_percent(1.5), "1.50%");
        assert_eq!(format_percent(f64::INFINITY), "-");
    }

    #[test]
    fn timestamps_in_various_shapes() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).single();
        assert_eq!(parse_timestamp("2025-03-01T12:30:00"), expected);
        assert_eq!(parse_timestamp("2025-03-01T12:30:00.000000"), expected);
        assert_eq!(parse_timestamp("2025-03-01 12:30:00"), expected);
        assert_eq!(parse_timestamp("2025-03-01T14:30:00+02:00"), expected);
        assert!(parse_timestamp("2025-03-01").is_some());
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn datetime_rendering_uses_zone() {
        let utc = FixedOffset::east_opt(0).expect("offset");
        let toronto = FixedOffset::west_opt(5 * 3600).expect("offset");
        assert_eq!(
            format_datetime_in(Some("2025-03-01T12:30:00"), &utc),
            "03/01/2025, 12:30 PM"
        );
        assert_eq!(
            format_datetime_in(Some("2025-03-01T02:05:00"), &toronto),
            "02/28/2025, 09:05 PM"
        );
        assert_eq!(format_datetime_in(None, &utc), "-");
        assert_eq!(format_datetime_in(Some("garbage"), &utc), "-");
    }

    #[test]
    fn local_date_crosses_midnight() {
        let tokyo = FixedOffset::east_opt(9 * 3600).expect("offset");
        assert_eq!(
            local_date_in("2025-03-01T20:00:00", &tokyo),
            NaiveDate::from_ymd_opt(2025, 3, 2)
        );
    }
}
