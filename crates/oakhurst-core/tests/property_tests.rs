//! # Property-Based Tests
//!
//! Invariants of paging, formatting, filtering and export that must hold
//! for any input.

#![allow(clippy::float_arithmetic)]

use oakhurst_core::{
    Analysis, AnalysisId, DashboardFilter, ManagerAnalysis, SavedFilter, UserRef, WeeklyRow,
    format_currency, paginate, table_pdf, weekly_csv_formatted,
};
use proptest::collection::vec;
use proptest::prelude::*;

fn analysis(id: u64, description: String) -> Analysis {
    Analysis {
        id: Some(AnalysisId(id)),
        description,
        principal: 100.0,
        interest_week: 1.0,
        projection_period: 4,
        tax_rate: 0.0,
        additional_deposit: None,
        deposit_frequency: None,
        regular_withdrawal: None,
        withdrawal_frequency: None,
        created_at: None,
        updated_at: None,
    }
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Walking every page yields each item exactly once, in order.
    #[test]
    fn pages_cover_every_item_once(items in vec(any::<u16>(), 0..200), per_page in 1usize..30) {
        let first = paginate(&items, 1, per_page).expect("page");
        let mut seen = Vec::new();
        for number in 1..=first.total_pages {
            let page = paginate(&items, number, per_page).expect("page");
            prop_assert!(page.items.len() <= per_page);
            seen.extend_from_slice(page.items);
        }
        prop_assert_eq!(seen, items);
    }

    /// Any requested page number lands on a valid page.
    #[test]
    fn page_number_is_always_clamped(len in 0usize..100, per_page in 1usize..20, page in 0usize..1000) {
        let items: Vec<usize> = (0..len).collect();
        let shown = paginate(&items, page, per_page).expect("page");
        prop_assert!(shown.page >= 1);
        prop_assert!(shown.page <= shown.total_pages);
    }

    /// Currency strings have a `$`, two decimals and well-placed separators.
    #[test]
    fn currency_shape(cents in -10_000_000_000i64..10_000_000_000i64) {
        let value = cents as f64 / 100.0;
        let text = format_currency(value);
        let body = text.strip_prefix('-').unwrap_or(&text);
        prop_assert!(body.starts_with('$'));
        let (whole, fraction) = body[1..].split_once('.').expect("decimal point");
        prop_assert_eq!(fraction.len(), 2);
        for (i, group) in whole.split(',').enumerate() {
            if i == 0 {
                prop_assert!((1..=3).contains(&group.len()));
            } else {
                prop_assert_eq!(group.len(), 3);
            }
        }
        prop_assert_eq!(whole.replace(',', ""), (cents.unsigned_abs() / 100).to_string());
    }

    /// A text filter never returns an analysis whose description and id both
    /// miss the needle.
    #[test]
    fn text_filter_is_sound(descriptions in vec("[a-zA-Z ]{0,12}", 0..20), needle in "[a-z]{1,3}") {
        let list: Vec<Analysis> = descriptions
            .into_iter()
            .enumerate()
            .map(|(i, d)| analysis(i as u64, d))
            .collect();
        let hits = SavedFilter::Text(needle.clone()).apply(&list);
        for hit in &hits {
            prop_assert!(hit.description.to_lowercase().contains(&needle));
        }
        let expected = list
            .iter()
            .filter(|a| a.description.to_lowercase().contains(&needle))
            .count();
        prop_assert_eq!(hits.len(), expected);
    }

    /// Tightening the principal bound never adds rows.
    #[test]
    fn dashboard_filter_is_monotonic(principals in vec(0u32..100_000, 0..30), low in 0u32..100_000, extra in 0u32..100_000) {
        let rows: Vec<ManagerAnalysis> = principals
            .iter()
            .enumerate()
            .map(|(i, p)| ManagerAnalysis {
                id: AnalysisId(i as u64),
                description: String::new(),
                principal: f64::from(*p),
                created_at: None,
                user: Some(UserRef { username: "u".into() }),
                ending_balance: None,
            })
            .collect();
        let tight = DashboardFilter {
            max_principal: Some(f64::from(low)),
            ..DashboardFilter::default()
        };
        let loose = DashboardFilter {
            max_principal: Some(f64::from(low.saturating_add(extra))),
            ..DashboardFilter::default()
        };
        let tight_hits = tight.apply_in(&rows, &chrono::Utc).len();
        let loose_hits = loose.apply_in(&rows, &chrono::Utc).len();
        prop_assert!(tight_hits <= loose_hits);
        prop_assert_eq!(DashboardFilter::default().apply_in(&rows, &chrono::Utc).len(), rows.len());
    }

    /// The formatted CSV has one line per week plus the header.
    #[test]
    fn formatted_csv_line_count(weeks in 0u32..80) {
        let rows: Vec<WeeklyRow> = (1..=weeks)
            .map(|week| WeeklyRow {
                week,
                beginning_balance: 1234.5,
                additional_deposit: 0.0,
                interest: 1.0,
                profit: 1.0,
                withdrawal: 0.0,
                ending_balance: 1235.5,
                tax_deduction: None,
                generated_at: None,
                id: None,
                analysis_id: None,
            })
            .collect();
        let csv = weekly_csv_formatted(&rows).expect("csv");
        prop_assert_eq!(csv.lines().count(), rows.len() + 1);
    }

    /// PDF output is framed correctly for any cell text.
    #[test]
    fn pdf_frame_for_any_text(cells in vec(".{0,40}", 0..60)) {
        let rows: Vec<Vec<String>> = cells.into_iter().map(|c| vec![c]).collect();
        let pdf = table_pdf("Any", &["Cell"], &rows).expect("pdf");
        prop_assert!(pdf.starts_with(b"%PDF-1.4\n"));
        prop_assert!(pdf.ends_with(b"%%EOF\n"));
        prop_assert!(pdf.is_ascii());
    }
}
