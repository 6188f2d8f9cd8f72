//! # Terminal Rendering
//!
//! Aligned text tables for humans and pretty JSON for scripts. All money
//! values go through `oakhurst_core::format`, timestamps are shown in the
//! machine's local time zone.

use oakhurst_core::{
    Analysis, ManagerAnalysis, MISSING, Page, QueryRow, TokenClaims, WEEKLY_HEADERS, WeeklyRow,
    format_currency, format_local_datetime, format_optional_currency, format_percent,
    weekly_cells,
};
use serde::Serialize;

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

// =============================================================================
// TABLE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// A text table with per-column alignment.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<(String, Align)>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[(&str, Align)]) -> Self {
        Self {
            headers: headers
                .iter()
                .map(|(name, align)| ((*name).to_string(), *align))
                .collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; missing cells render as `-`, extra cells are dropped.
    pub fn push(&mut self, mut cells: Vec<String>) {
        cells.resize(self.headers.len(), MISSING.to_string());
        self.rows.push(cells);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render with a dashed rule under the header.
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self
            .headers
            .iter()
            .map(|(name, _)| name.chars().count())
            .collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header_cells: Vec<String> = self.headers.iter().map(|(n, _)| n.clone()).collect();
        let mut out = self.line(&header_cells, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join("  "));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&self.line(row, &widths));
        }
        out
    }

    fn line(&self, cells: &[String], widths: &[usize]) -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .zip(&self.headers)
            .map(|((cell, width), (_, align))| match align {
                Align::Left => format!("{cell:<width$}"),
                Align::Right => format!("{cell:>width$}"),
            })
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    }
}

// =============================================================================
// DOMAIN VIEWS
// =============================================================================

/// Weekly breakdown table.
pub fn weekly_table(rows: &[WeeklyRow]) -> Table {
    let columns: Vec<(&str, Align)> = WEEKLY_HEADERS.iter().map(|h| (*h, Align::Right)).collect();
    let mut table = Table::new(&columns);
    for row in rows {
        table.push(weekly_cells(row));
    }
    table
}

/// Parameter block of one analysis.
pub fn analysis_details(analysis: &Analysis) -> String {
    let id = analysis
        .id
        .map_or_else(|| MISSING.to_string(), |id| id.to_string());
    let fields = [
        ("ID", id),
        ("Description", analysis.description.clone()),
        ("Principal", format_currency(analysis.principal)),
        ("Interest / week", format_percent(analysis.interest_week)),
        ("Projection", format!("{} weeks", analysis.projection_period)),
        ("Tax rate", format_percent(analysis.tax_rate)),
        (
            "Deposit",
            format!(
                "{} every {} week(s)",
                format_currency(analysis.deposit_amount()),
                analysis.deposit_every()
            ),
        ),
        (
            "Withdrawal",
            format!(
                "{} every {} week(s)",
                format_currency(analysis.withdrawal_amount()),
                analysis.withdrawal_every()
            ),
        ),
        ("Created", format_local_datetime(analysis.created_at.as_deref())),
        ("Updated", format_local_datetime(analysis.updated_at.as_deref())),
    ];
    fields
        .iter()
        .map(|(label, value)| format!("{label:<16} {value}\n"))
        .collect()
}

/// The user's saved analyses.
pub fn saved_table(analyses: &[&Analysis]) -> Table {
    let mut table = Table::new(&[
        ("ID", Align::Right),
        ("Description", Align::Left),
        ("Principal", Align::Right),
        ("Weeks", Align::Right),
        ("Created", Align::Left),
    ]);
    for analysis in analyses {
        table.push(vec![
            analysis
                .id
                .map_or_else(|| MISSING.to_string(), |id| id.to_string()),
            analysis.description.clone(),
            format_currency(analysis.principal),
            analysis.projection_period.to_string(),
            format_local_datetime(analysis.created_at.as_deref()),
        ]);
    }
    table
}

/// The manager's cross-user listing.
pub fn manager_table(rows: &[&ManagerAnalysis]) -> Table {
    let mut table = Table::new(&[
        ("ID", Align::Right),
        ("User", Align::Left),
        ("Description", Align::Left),
        ("Principal", Align::Right),
        ("Ending Balance", Align::Right),
        ("Created", Align::Left),
    ]);
    for row in rows {
        table.push(vec![
            row.id.to_string(),
            row.username().unwrap_or(MISSING).to_string(),
            row.description.clone(),
            format_currency(row.principal),
            format_optional_currency(row.ending_balance),
            format_local_datetime(row.created_at.as_deref()),
        ]);
    }
    table
}

/// Ad-hoc query results.
pub fn query_table(rows: &[QueryRow]) -> Table {
    let mut table = Table::new(&[
        ("ID", Align::Right),
        ("User", Align::Left),
        ("Description", Align::Left),
        ("Principal", Align::Right),
        ("Ending Balance", Align::Right),
        ("Generated", Align::Left),
    ]);
    for row in rows {
        table.push(vec![
            row.id.to_string(),
            row.username.clone(),
            row.description.clone(),
            format_currency(row.principal),
            format_currency(row.ending_balance),
            format_local_datetime(row.generated_at.as_deref()),
        ]);
    }
    table
}

/// "Showing 21-40 of 57 (page 2 of 3)".
pub fn page_footer<T>(page: &Page<'_, T>) -> String {
    if page.total_items == 0 {
        return "No entries".to_string();
    }
    format!(
        "Showing {}-{} of {} (page {} of {})",
        page.first_item_number(),
        page.last_item_number(),
        page.total_items,
        page.page,
        page.total_pages
    )
}

/// One-line summary of who is logged in.
pub fn whoami_line(claims: &TokenClaims) -> String {
    let name = claims.display_name().unwrap_or("unknown user");
    let role = if claims.is_manager() { "manager" } else { "user" };
    match claims.email.as_deref() {
        Some(email) => format!("{name} <{email}> ({role})"),
        None => format!("{name} ({role})"),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use oakhurst_core::paginate;

    #[test]
    fn table_aligns_columns() {
        let mut table = Table::new(&[("Name", Align::Left), ("Amount", Align::Right)]);
        table.push(vec!["a".into(), "$1.00".into()]);
        table.push(vec!["longer".into(), "$1,000.00".into()]);
        assert_eq!(
            table.render(),
            "Name       Amount\n------  ---------\na           $1.00\nlonger  $1,000.00\n"
        );
    }

    #[test]
    fn short_rows_are_padded() {
        let mut table = Table::new(&[("A", Align::Left), ("B", Align::Left)]);
        table.push(vec!["x".into()]);
        assert!(table.render().ends_with("x  -\n"));
        assert!(!table.is_empty());
    }

    #[test]
    fn footer_reports_range() {
        let items: Vec<u8> = (0..57).collect();
        let page = paginate(&items, 2, 20).expect("page");
        assert_eq!(page_footer(&page), "Showing 21-40 of 57 (page 2 of 3)");
        let none: Vec<u8> = Vec::new();
        assert_eq!(page_footer(&paginate(&none, 1, 20).expect("page")), "No entries");
    }

    #[test]
    fn whoami_shows_role() {
        let claims = TokenClaims {
            username: Some("dana".into()),
            is_manager: Some(1),
            ..TokenClaims::default()
        };
        assert_eq!(whoami_line(&claims), "dana (manager)");
    }
}
