//! # Export Module
//!
//! Report documents built from data the backend already returned:
//! - raw weekly breakdown CSV (numbers as sent by the backend)
//! - formatted weekly breakdown CSV (currency strings)
//! - manager listings as CSV
//! - weekly breakdown as a paginated PDF table

mod pdf;

pub use pdf::{PAGE_HEIGHT, PAGE_WIDTH, table_pdf};

use crate::format::{MISSING, format_currency, format_optional_currency};
use crate::{AnalysisId, ManagerAnalysis, OakhurstError, QueryRow, WeeklyRow};
use serde::Serialize;

/// Column headers of the formatted weekly CSV.
pub const WEEKLY_CSV_HEADERS: [&str; 7] = [
    "Week",
    "Begin",
    "Deposit",
    "Interest",
    "Profit",
    "Withdrawal",
    "Ending",
];

/// Column headers of the weekly PDF table and terminal tables.
pub const WEEKLY_HEADERS: [&str; 7] = [
    "Week",
    "Beginning",
    "Deposit",
    "Interest",
    "Profit",
    "Withdrawal",
    "Ending",
];

/// Title of the saved-analysis PDF report.
pub const WEEKLY_REPORT_TITLE: &str = "Saved Analysis Report";

/// File name of the manager's financial report download.
pub const FINANCIAL_REPORT_FILE: &str = "financial_report.csv";

/// Export document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
        }
    }
}

/// Default download name for an analysis' weekly breakdown.
#[must_use]
pub fn default_file_name(id: AnalysisId, format: ExportFormat) -> String {
    format!("analysis_{id}_results.{}", format.extension())
}

// =============================================================================
// CSV
// =============================================================================

/// Raw CSV record of one week; field names become the header.
#[derive(Serialize)]
struct RawWeek {
    week: u32,
    beginning_balance: f64,
    additional_deposit: f64,
    interest: f64,
    profit: f64,
    withdrawal: f64,
    tax_deduction: Option<f64>,
    ending_balance: f64,
}

impl From<&WeeklyRow> for RawWeek {
    fn from(row: &WeeklyRow) -> Self {
        Self {
            week: row.week,
            beginning_balance: row.beginning_balance,
            additional_deposit: row.additional_deposit,
            interest: row.interest,
            profit: row.profit,
            withdrawal: row.withdrawal,
            tax_deduction: row.tax_deduction,
            ending_balance: row.ending_balance,
        }
    }
}

/// Weekly breakdown as CSV with unformatted numbers.
///
/// A missing tax deduction is an empty field.
pub fn weekly_csv(rows: &[WeeklyRow]) -> Result<String, OakhurstError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if rows.is_empty() {
        writer.write_record([
            "week",
            "beginning_balance",
            "additional_deposit",
            "interest",
            "profit",
            "withdrawal",
            "tax_deduction",
            "ending_balance",
        ])
        .map_err(csv_error)?;
    }
    for row in rows {
        writer.serialize(RawWeek::from(row)).map_err(csv_error)?;
    }
    finish(writer)
}

/// Cells of one formatted weekly row, in [`WEEKLY_HEADERS`] column order.
#[must_use]
pub fn weekly_cells(row: &WeeklyRow) -> Vec<String> {
    vec![
        row.week.to_string(),
        format_currency(row.beginning_balance),
        format_currency(row.additional_deposit),
        format_currency(row.interest),
        format_currency(row.profit),
        format_currency(row.withdrawal),
        format_currency(row.ending_balance),
    ]
}

/// Weekly breakdown as CSV with currency-formatted amounts.
pub fn weekly_csv_formatted(rows: &[WeeklyRow]) -> Result<String, OakhurstError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(WEEKLY_CSV_HEADERS).map_err(csv_error)?;
    for row in rows {
        writer.write_record(weekly_cells(row)).map_err(csv_error)?;
    }
    finish(writer)
}

/// Manager dashboard rows as CSV.
pub fn analyses_csv(rows: &[&ManagerAnalysis]) -> Result<String, OakhurstError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "ID",
            "User",
            "Description",
            "Principal",
            "Ending Balance",
            "Created",
        ])
        .map_err(csv_error)?;
    for row in rows {
        writer
            .write_record([
                row.id.to_string(),
                row.username().unwrap_or(MISSING).to_string(),
                row.description.clone(),
                format_currency(row.principal),
                format_optional_currency(row.ending_balance),
                row.created_at.clone().unwrap_or_else(|| MISSING.to_string()),
            ])
            .map_err(csv_error)?;
    }
    finish(writer)
}

/// Ad-hoc query results as CSV.
pub fn query_rows_csv(rows: &[QueryRow]) -> Result<String, OakhurstError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "ID",
            "User",
            "Description",
            "Principal",
            "Ending Balance",
            "Generated At",
        ])
        .map_err(csv_error)?;
    for row in rows {
        writer
            .write_record([
                row.id.to_string(),
                row.username.clone(),
                row.description.clone(),
                format_currency(row.principal),
                format_currency(row.ending_balance),
                row.generated_at
                    .clone()
                    .unwrap_or_else(|| MISSING.to_string()),
            ])
            .map_err(csv_error)?;
    }
    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, OakhurstError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| OakhurstError::Export(format!("CSV flush failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| OakhurstError::Export(format!("CSV is not UTF-8: {e}")))
}

fn csv_error(e: csv::Error) -> OakhurstError {
    OakhurstError::Export(format!("CSV write failed: {e}"))
}

// =============================================================================
// PDF
// =============================================================================

/// Weekly breakdown as a PDF table.
pub fn weekly_pdf(title: &str, rows: &[WeeklyRow]) -> Result<Vec<u8>, OakhurstError> {
    let cells: Vec<Vec<String>> = rows.iter().map(weekly_cells).collect();
    table_pdf(title, &WEEKLY_HEADERS, &cells)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserRef;

    fn week(n: u32, begin: f64, end: f64) -> WeeklyRow {
        WeeklyRow {
            week: n,
            beginning_balance: begin,
            additional_deposit: 0.0,
            interest: 10.0,
            profit: 10.0,
            withdrawal: 0.0,
            ending_balance: end,
            tax_deduction: None,
            generated_at: None,
            id: None,
            analysis_id: None,
        }
    }

    #[test]
    fn raw_csv_has_snake_case_header() {
        let mut second = week(2, 1010.0, 1020.0);
        second.tax_deduction = Some(1.5);
        let csv = weekly_csv(&[week(1, 1000.0, 1010.0), second]).expect("csv");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "week,beginning_balance,additional_deposit,interest,profit,withdrawal,tax_deduction,ending_balance"
        );
        assert_eq!(lines[1], "1,1000.0,0.0,10.0,10.0,0.0,,1010.0");
        assert_eq!(lines[2], "2,1010.0,0.0,10.0,10.0,0.0,1.5,1020.0");
    }

    #[test]
    fn raw_csv_of_nothing_is_header_only() {
        let csv = weekly_csv(&[]).expect("csv");
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("week,"));
    }

    #[test]
    fn formatted_csv_quotes_grouped_amounts() {
        let csv = weekly_csv_formatted(&[week(1, 1500.0, 1510.0)]).expect("csv");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Week,Begin,Deposit,Interest,Profit,Withdrawal,Ending");
        assert_eq!(
            lines[1],
            r#"1,"$1,500.00",$0.00,$10.00,$10.00,$0.00,"$1,510.00""#
        );
    }

    #[test]
    fn manager_csv_marks_missing_values() {
        let row = ManagerAnalysis {
            id: AnalysisId(4),
            description: "Plan, revised".into(),
            principal: 250.0,
            created_at: None,
            user: Some(UserRef {
                username: "kim".into(),
            }),
            ending_balance: None,
        };
        let csv = analyses_csv(&[&row]).expect("csv");
        assert_eq!(
            csv.lines().nth(1),
            Some(r#"4,kim,"Plan, revised",$250.00,-,-"#)
        );
    }

    #[test]
    fn query_csv_rows() {
        let rows = vec![QueryRow {
            id: 3,
            username: "lee".into(),
            description: "d".into(),
            principal: 10.0,
            ending_balance: 12.5,
            generated_at: Some("2025-01-01T00:00:00".into()),
        }];
        let csv = query_rows_csv(&rows).expect("csv");
        assert_eq!(
            csv.lines().nth(1),
            Some("3,lee,d,$10.00,$12.50,2025-01-01T00:00:00")
        );
    }

    #[test]
    fn default_names() {
        assert_eq!(
            default_file_name(AnalysisId(8), ExportFormat::Csv),
            "analysis_8_results.csv"
        );
        assert_eq!(
            default_file_name(AnalysisId(8), ExportFormat::Pdf),
            "analysis_8_results.pdf"
        );
    }

    #[test]
    fn weekly_pdf_contains_title_and_cells() {
        let pdf = weekly_pdf(WEEKLY_REPORT_TITLE, &[week(1, 1500.0, 1510.0)]).expect("pdf");
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.contains("(Saved Analysis Report) Tj"));
        assert!(text.contains("($1,500.00) Tj"));
    }
}
