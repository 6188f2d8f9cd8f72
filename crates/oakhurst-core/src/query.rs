//! # Query Module
//!
//! Server-side filter parameters for the manager's query and report tools.
//!
//! Only criteria that are set are sent; the backend treats absent
//! parameters as "no restriction".

use crate::OakhurstError;
use chrono::NaiveDate;

/// Time zone sent with report requests when none is configured.
pub const DEFAULT_REPORT_TIMEZONE: &str = "UTC";

/// Date format used on the wire.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date as typed by the user.
pub fn parse_date(field: &str, text: &str) -> Result<NaiveDate, OakhurstError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|_| OakhurstError::invalid_input(field, "expected a date as YYYY-MM-DD"))
}

// =============================================================================
// AD-HOC QUERY
// =============================================================================

/// Criteria of the manager's ad-hoc analysis query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFilters {
    pub username: Option<String>,
    pub description_contains: Option<String>,
    pub principal_gt: Option<f64>,
    pub principal_lt: Option<f64>,
    pub ending_balance_gt: Option<f64>,
    pub ending_balance_lt: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl QueryFilters {
    /// Check that ranges are not inverted.
    pub fn validate(&self) -> Result<(), OakhurstError> {
        if let (Some(gt), Some(lt)) = (self.principal_gt, self.principal_lt)
            && gt > lt
        {
            return Err(OakhurstError::invalid_input(
                "principal",
                "lower bound must not exceed upper bound",
            ));
        }
        if let (Some(gt), Some(lt)) = (self.ending_balance_gt, self.ending_balance_lt)
            && gt > lt
        {
            return Err(OakhurstError::invalid_input(
                "ending_balance",
                "lower bound must not exceed upper bound",
            ));
        }
        check_date_range(self.start_date, self.end_date)
    }

    /// Query-string pairs for the set criteria, in a fixed order.
    pub fn to_query_pairs(&self) -> Result<Vec<(&'static str, String)>, OakhurstError> {
        self.validate()?;
        let mut pairs = Vec::new();
        push_text(&mut pairs, "username", self.username.as_deref());
        push_text(
            &mut pairs,
            "description_contains",
            self.description_contains.as_deref(),
        );
        push_number(&mut pairs, "principal_gt", self.principal_gt);
        push_number(&mut pairs, "principal_lt", self.principal_lt);
        push_number(&mut pairs, "ending_balance_gt", self.ending_balance_gt);
        push_number(&mut pairs, "ending_balance_lt", self.ending_balance_lt);
        push_date(&mut pairs, "start_date", self.start_date);
        push_date(&mut pairs, "end_date", self.end_date);
        Ok(pairs)
    }
}

// =============================================================================
// FINANCIAL REPORT
// =============================================================================

/// Criteria of the manager's downloadable financial report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFilters {
    pub username: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// IANA zone name the backend uses to interpret the dates.
    pub timezone: String,
}

impl Default for ReportFilters {
    fn default() -> Self {
        Self {
            username: None,
            start_date: None,
            end_date: None,
            timezone: DEFAULT_REPORT_TIMEZONE.to_string(),
        }
    }
}

impl ReportFilters {
    /// Query-string pairs; `timezone` is always present.
    pub fn to_query_pairs(&self) -> Result<Vec<(&'static str, String)>, OakhurstError> {
        check_date_range(self.start_date, self.end_date)?;
        let mut pairs = Vec::new();
        push_text(&mut pairs, "username", self.username.as_deref());
        push_date(&mut pairs, "start_date", self.start_date);
        push_date(&mut pairs, "end_date", self.end_date);
        let timezone = self.timezone.trim();
        let timezone = if timezone.is_empty() {
            DEFAULT_REPORT_TIMEZONE
        } else {
            timezone
        };
        pairs.push(("timezone", timezone.to_string()));
        Ok(pairs)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn check_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), OakhurstError> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => Err(OakhurstError::invalid_input(
            "date range",
            "start date is after end date",
        )),
        _ => Ok(()),
    }
}

fn push_text(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        pairs.push((key, value.to_string()));
    }
}

fn push_number(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<f64>) {
    if let Some(value) = value {
        pairs.push((key, value.to_string()));
    }
}

fn push_date(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<NaiveDate>) {
    if let Some(value) = value {
        pairs.push((key, value.format(DATE_FORMAT).to_string()));
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn empty_filters_produce_no_pairs() {
        assert!(QueryFilters::default().to_query_pairs().expect("pairs").is_empty());
    }

    #[test]
    fn pairs_follow_field_order_and_skip_blanks() {
        let filters = QueryFilters {
            username: Some("  ".into()),
            description_contains: Some("fund".into()),
            principal_gt: Some(1000.0),
            ending_balance_lt: Some(2500.5),
            start_date: date(2025, 1, 1),
            end_date: date(2025, 1, 31),
            ..QueryFilters::default()
        };
        let pairs = filters.to_query_pairs().expect("pairs");
        assert_eq!(
            pairs,
            vec![
                ("description_contains", "fund".to_string()),
                ("principal_gt", "1000".to_string()),
                ("ending_balance_lt", "2500.5".to_string()),
                ("start_date", "2025-01-01".to_string()),
                ("end_date", "2025-01-31".to_string()),
            ]
        );
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let filters = QueryFilters {
            principal_gt: Some(10.0),
            principal_lt: Some(5.0),
            ..QueryFilters::default()
        };
        assert!(filters.to_query_pairs().is_err());

        let filters = QueryFilters {
            start_date: date(2025, 2, 1),
            end_date: date(2025, 1, 1),
            ..QueryFilters::default()
        };
        assert!(filters.validate().is_err());
    }

    #[test]
    fn equal_bounds_are_accepted() {
        let filters = QueryFilters {
            principal_gt: Some(1000.0),
            principal_lt: Some(1000.0),
            ending_balance_gt: Some(5.0),
            ending_balance_lt: Some(5.0),
            start_date: date(2025, 1, 1),
            end_date: date(2025, 1, 1),
            ..QueryFilters::default()
        };
        let pairs = filters.to_query_pairs().expect("pairs");
        assert_eq!(pairs.len(), 6);
    }

    #[test]
    fn report_always_sends_timezone() {
        let pairs = ReportFilters::default().to_query_pairs().expect("pairs");
        assert_eq!(pairs, vec![("timezone", "UTC".to_string())]);

        let report = ReportFilters {
            username: Some("ana".into()),
            start_date: date(2025, 3, 1),
            end_date: None,
            timezone: "America/Toronto".into(),
        };
        assert_eq!(
            report.to_query_pairs().expect("pairs"),
            vec![
                ("username", "ana".to_string()),
                ("start_date", "2025-03-01".to_string()),
                ("timezone", "America/Toronto".to_string()),
            ]
        );
    }

    #[test]
    fn parse_date_reports_field() {
        assert_eq!(parse_date("start_date", " 2025-03-09 ").ok(), date(2025, 3, 9));
        assert!(parse_date("start_date", "03/09/2025").is_err());
    }
}
