//! # Filter Module
//!
//! Client-side filtering of lists that were already fetched from the backend.
//!
//! - [`SavedFilter`]: the user's own analyses (text or creation date)
//! - [`DashboardFilter`]: the manager's cross-user listing

use crate::format::{local_date_in, parse_timestamp};
use crate::{Analysis, ManagerAnalysis};
use chrono::{NaiveDate, TimeZone};
use std::cmp::Ordering;

// =============================================================================
// SAVED ANALYSES
// =============================================================================

/// Filter mode for the saved-analyses list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SavedFilter {
    /// Show everything.
    #[default]
    All,
    /// Case-insensitive match on description, or substring of the id.
    Text(String),
    /// Analyses whose `created_at` starts with this `YYYY-MM-DD` date.
    Date(NaiveDate),
}

impl SavedFilter {
    /// Whether `analysis` passes the filter.
    #[must_use]
    pub fn matches(&self, analysis: &Analysis) -> bool {
        match self {
            Self::All => true,
            Self::Text(needle) => {
                let needle = needle.to_lowercase();
                analysis.description.to_lowercase().contains(&needle)
                    || analysis
                        .id
                        .is_some_and(|id| id.to_string().contains(&needle))
            }
            Self::Date(date) => {
                let prefix = date.format("%Y-%m-%d").to_string();
                analysis
                    .created_at
                    .as_deref()
                    .is_some_and(|created| created.starts_with(&prefix))
            }
        }
    }

    /// Keep only the analyses that pass the filter, preserving order.
    #[must_use]
    pub fn apply<'a>(&self, analyses: &'a [Analysis]) -> Vec<&'a Analysis> {
        analyses.iter().filter(|a| self.matches(a)).collect()
    }
}

/// Order analyses by creation time, newest first. Analyses without a
/// parsable `created_at` go last, in their original order.
pub fn sort_newest_first(analyses: &mut [Analysis]) {
    analyses.sort_by(|a, b| {
        let a_time = a.created_at.as_deref().and_then(parse_timestamp);
        let b_time = b.created_at.as_deref().and_then(parse_timestamp);
        match (a_time, b_time) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

// =============================================================================
// MANAGER DASHBOARD
// =============================================================================

/// Criteria of the manager dashboard. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardFilter {
    /// Case-insensitive substring of the owner's username.
    pub username: Option<String>,
    /// Principal must be at most this amount.
    pub max_principal: Option<f64>,
    /// Ending balance must be at most this amount; a missing balance counts as 0.
    pub max_ending_balance: Option<f64>,
    /// Creation date, compared in the viewer's time zone.
    pub created_on: Option<NaiveDate>,
}

impl DashboardFilter {
    /// Clear every criterion.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// `true` when no criterion is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether `row` passes every criterion, with dates compared in `tz`.
    #[must_use]
    pub fn matches_in<Tz: TimeZone>(&self, row: &ManagerAnalysis, tz: &Tz) -> bool {
        let username_ok = self.username.as_deref().is_none_or(|needle| {
            row.username()
                .unwrap_or_default()
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });

        let principal_ok = self.max_principal.is_none_or(|max| row.principal <= max);

        let balance_ok = self
            .max_ending_balance
            .is_none_or(|max| row.ending_balance.unwrap_or(0.0) <= max);

        let date_ok = self.created_on.is_none_or(|day| {
            row.created_at
                .as_deref()
                .and_then(|created| local_date_in(created, tz))
                .is_some_and(|created| created == day)
        });

        username_ok && principal_ok && balance_ok && date_ok
    }

    /// Keep only the rows that pass, preserving order.
    #[must_use]
    pub fn apply_in<'a, Tz: TimeZone>(
        &self,
        rows: &'a [ManagerAnalysis],
        tz: &Tz,
    ) -> Vec<&'a ManagerAnalysis> {
        rows.iter().filter(|r| self.matches_in(r, tz)).collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnalysisId, UserRef};
    use chrono::Utc;

    fn analysis(id: u64, description: &str, created_at: Option<&str>) -> Analysis {
        Analysis {
            id: Some(AnalysisId(id)),
            description: description.to_string(),
            principal: 1000.0,
            interest_week: 1.0,
            projection_period: 10,
            tax_rate: 0.0,
            additional_deposit: None,
            deposit_frequency: None,
            regular_withdrawal: None,
            withdrawal_frequency: None,
            created_at: created_at.map(str::to_string),
            updated_at: None,
        }
    }

    fn manager_row(
        id: u64,
        user: Option<&str>,
        principal: f64,
        balance: Option<f64>,
        created_at: &str,
    ) -> ManagerAnalysis {
        ManagerAnalysis {
            id: AnalysisId(id),
            description: format!("analysis {id}"),
            principal,
            created_at: Some(created_at.to_string()),
            user: user.map(|u| UserRef {
                username: u.to_string(),
            }),
            ending_balance: balance,
        }
    }

    #[test]
    fn text_filter_matches_description_or_id() {
        let list = vec![
            analysis(12, "College Fund", None),
            analysis(7, "Retirement", None),
            analysis(120, "House", None),
        ];
        let by_text = SavedFilter::Text("college".into()).apply(&list);
        assert_eq!(by_text.len(), 1);
        assert_eq!(by_text[0].id, Some(AnalysisId(12)));

        let by_id = SavedFilter::Text("12".into()).apply(&list);
        let ids: Vec<_> = by_id.iter().filter_map(|a| a.id).collect();
        assert_eq!(ids, vec![AnalysisId(12), AnalysisId(120)]);
    }

    #[test]
    fn date_filter_uses_created_prefix() {
        let list = vec![
            analysis(1, "a", Some("2025-04-01T10:00:00")),
            analysis(2, "b", Some("2025-04-02T10:00:00")),
            analysis(3, "c", None),
        ];
        let day = NaiveDate::from_ymd_opt(2025, 4, 2).expect("date");
        let hits = SavedFilter::Date(day).apply(&list);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, Some(AnalysisId(2)));
        assert_eq!(SavedFilter::All.apply(&list).len(), 3);
    }

    #[test]
    fn newest_first_puts_undated_last() {
        let mut list = vec![
            analysis(1, "old", Some("2024-01-01T00:00:00")),
            analysis(2, "undated", None),
            analysis(3, "new", Some("2025-01-01T00:00:00")),
        ];
        sort_newest_first(&mut list);
        let ids: Vec<_> = list.iter().filter_map(|a| a.id).map(|id| id.0).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn dashboard_filter_combines_criteria() {
        let rows = vec![
            manager_row(1, Some("Alice"), 5000.0, Some(6000.0), "2025-05-01T09:00:00"),
            manager_row(2, Some("bob"), 20000.0, None, "2025-05-01T09:00:00"),
            manager_row(3, Some("alina"), 1000.0, Some(900.0), "2025-05-02T09:00:00"),
        ];
        let filter = DashboardFilter {
            username: Some("AL".into()),
            max_principal: Some(5000.0),
            ..DashboardFilter::default()
        };
        let ids: Vec<_> = filter.apply_in(&rows, &Utc).iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![1, 3]);

        let by_balance = DashboardFilter {
            max_ending_balance: Some(1000.0),
            ..DashboardFilter::default()
        };
        let ids: Vec<_> = by_balance.apply_in(&rows, &Utc).iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![2, 3]);

        let by_date = DashboardFilter {
            created_on: NaiveDate::from_ymd_opt(2025, 5, 2),
            ..DashboardFilter::default()
        };
        let ids: Vec<_> = by_date.apply_in(&rows, &Utc).iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn ownerless_rows_only_match_without_username_criterion() {
        let rows = vec![manager_row(9, None, 1.0, None, "2025-01-01T00:00:00")];
        assert_eq!(DashboardFilter::default().apply_in(&rows, &Utc).len(), 1);
        let filter = DashboardFilter {
            username: Some("x".into()),
            ..DashboardFilter::default()
        };
        assert!(filter.apply_in(&rows, &Utc).is_empty());
    }

    #[test]
    fn reset_clears_everything() {
        let mut filter = DashboardFilter {
            username: Some("a".into()),
            max_principal: Some(1.0),
            max_ending_balance: Some(2.0),
            created_on: NaiveDate::from_ymd_opt(2025, 1, 1),
        };
        assert!(!filter.is_empty());
        filter.reset();
        assert!(filter.is_empty());
    }
}
