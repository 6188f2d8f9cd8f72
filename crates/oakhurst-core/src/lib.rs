//! # oakhurst-core
//!
//! The logic of the Oakhurst analysis client.
//!
//! The projection engine lives in the backend service. This crate only
//! shapes what goes to it and what comes back:
//! - wire records for analyses, weekly rows and manager listings
//! - parameter entry and field edits with validation
//! - JWT payload inspection for display names and the manager role
//! - client-side filters, paging and display formatting
//! - CSV and PDF report documents
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies (pure Rust)
//! - Never computes balances; money values are compared and formatted only

// =============================================================================
// MODULES
// =============================================================================

pub mod export;
pub mod filter;
pub mod form;
pub mod format;
pub mod paginate;
pub mod query;
pub mod token;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Analysis, AnalysisId, AnalysisParams, AnalysisUpdate, CreatedAnalysis, Credentials,
    EndingBalance, ManagerAnalysis, MessageResponse, OakhurstError, QueryRow, Registration,
    TokenResponse, UserRef, WeeklyRow,
};

// =============================================================================
// RE-EXPORTS: Client-side Logic
// =============================================================================

pub use filter::{DashboardFilter, SavedFilter, sort_newest_first};
pub use form::{AnalysisForm, DEFAULT_DESCRIPTION, EDITABLE_FIELDS, MAX_PROJECTION_WEEKS};
pub use format::{
    MISSING, format_currency, format_datetime_in, format_local_datetime,
    format_optional_currency, format_percent, local_date_in, parse_timestamp,
};
pub use paginate::{Page, paginate};
pub use query::{DEFAULT_REPORT_TIMEZONE, QueryFilters, ReportFilters, parse_date};
pub use token::{TokenClaims, decode_claims};

// =============================================================================
// RE-EXPORTS: Export
// =============================================================================

pub use export::{
    ExportFormat, FINANCIAL_REPORT_FILE, WEEKLY_CSV_HEADERS, WEEKLY_HEADERS, WEEKLY_REPORT_TITLE,
    analyses_csv, default_file_name, query_rows_csv, table_pdf, weekly_cells, weekly_csv,
    weekly_csv_formatted, weekly_pdf,
};
