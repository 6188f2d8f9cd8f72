//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! In `--json` mode list commands print every matching entry; paging only
//! applies to the text tables.

use crate::cli::{CreateArgs, QueryArgs};
use crate::client::AnalysisClient;
use crate::config::Config;
use crate::error::AppError;
use crate::session::SessionStore;
use crate::view::{self, print_json};
use oakhurst_core::{
    AnalysisForm, AnalysisId, AnalysisUpdate, Credentials, DashboardFilter, ExportFormat,
    FINANCIAL_REPORT_FILE, OakhurstError, QueryFilters, Registration, ReportFilters, SavedFilter,
    WEEKLY_REPORT_TITLE, WeeklyRow, analyses_csv, default_file_name, paginate, parse_date,
    query_rows_csv, sort_newest_first, weekly_csv, weekly_csv_formatted, weekly_pdf,
};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

// =============================================================================
// CONTEXT
// =============================================================================

/// Everything a command needs: settings, token storage and a client that
/// carries the stored token.
pub struct Context {
    pub config: Config,
    pub session: SessionStore,
    pub client: AnalysisClient,
    pub json: bool,
}

impl Context {
    /// Resolve configuration and load the stored session.
    pub fn open(
        home: Option<&Path>,
        backend_url: Option<&str>,
        json: bool,
    ) -> Result<Self, AppError> {
        Self::from_config(Config::load(home, backend_url)?, json)
    }

    pub fn from_config(config: Config, json: bool) -> Result<Self, AppError> {
        let session = SessionStore::new(&config.home);
        let token = session.load()?;
        let client = AnalysisClient::new(&config.backend_url, config.timeout)?.with_token(token);
        tracing::debug!(
            backend = %config.backend_url,
            home = %config.home.display(),
            "context ready"
        );
        Ok(Self {
            config,
            session,
            client,
            json,
        })
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn password_or_stdin(password: Option<String>) -> Result<String, AppError> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| AppError::io(Path::new("<stdin>"), &e))?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(OakhurstError::invalid_input("password", "must not be empty").into());
    }
    Ok(password)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn optional_date(
    field: &str,
    value: Option<String>,
) -> Result<Option<chrono::NaiveDate>, AppError> {
    Ok(non_blank(value)
        .map(|text| parse_date(field, &text))
        .transpose()?)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    std::fs::write(path, bytes).map_err(|e| AppError::io(path, &e))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "file written");
    Ok(())
}

fn written_summary(path: &Path, rows: usize) -> Value {
    json!({ "path": path.display().to_string(), "rows": rows })
}

fn report_written(ctx: &Context, path: &Path, rows: usize) {
    if ctx.json {
        print_json(&written_summary(path, rows));
    } else {
        println!("Wrote {rows} rows to {}", path.display());
    }
}

/// Write an export that accompanies a listing. In JSON mode nothing is
/// printed here; the summary is merged into the listing instead.
fn write_export(
    ctx: &Context,
    path: &Path,
    bytes: &[u8],
    rows: usize,
) -> Result<Value, AppError> {
    write_file(path, bytes)?;
    if !ctx.json {
        println!("Wrote {rows} rows to {}", path.display());
    }
    Ok(written_summary(path, rows))
}

/// Single JSON document for a listing and an optional export summary.
///
/// Objects gain a `written` key; anything else is wrapped as
/// `{"written": ..., "rows": ...}`.
pub fn with_written(listing: Value, written: Option<Value>) -> Value {
    match (listing, written) {
        (listing, None) => listing,
        (Value::Object(mut fields), Some(written)) => {
            fields.insert("written".to_string(), written);
            Value::Object(fields)
        }
        (rows, Some(written)) => json!({ "written": written, "rows": rows }),
    }
}

/// Export kind implied by a file name: `.pdf` is PDF, anything else CSV.
pub fn format_for_path(path: &Path) -> ExportFormat {
    if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    {
        ExportFormat::Pdf
    } else {
        ExportFormat::Csv
    }
}

/// Build a weekly breakdown document.
pub fn weekly_document(
    rows: &[WeeklyRow],
    format: ExportFormat,
    raw: bool,
) -> Result<Vec<u8>, AppError> {
    Ok(match format {
        ExportFormat::Csv if raw => weekly_csv(rows)?.into_bytes(),
        ExportFormat::Csv => weekly_csv_formatted(rows)?.into_bytes(),
        ExportFormat::Pdf => weekly_pdf(WEEKLY_REPORT_TITLE, rows)?,
    })
}

fn print_weekly_page(rows: &[WeeklyRow], page: usize, per_page: usize) -> Result<(), AppError> {
    if rows.is_empty() {
        println!("No weekly results.");
        return Ok(());
    }
    let shown = paginate(rows, page, per_page)?;
    print!("{}", view::weekly_table(shown.items).render());
    println!("{}", view::page_footer(&shown));
    Ok(())
}

// =============================================================================
// ACCOUNT COMMANDS
// =============================================================================

/// Create an account.
pub async fn cmd_register(
    ctx: &Context,
    username: String,
    email: String,
    password: Option<String>,
) -> Result<(), AppError> {
    let registration = Registration {
        username: username.trim().to_string(),
        email: email.trim().to_string(),
        password: password_or_stdin(password)?,
    };
    let message = ctx.client.register(&registration).await?;
    if ctx.json {
        print_json(&json!({ "message": message }));
    } else {
        println!("{message}");
        println!("You can now log in with `oakhurst login --email {}`", registration.email);
    }
    Ok(())
}

/// Log in and store the token.
pub async fn cmd_login(
    ctx: &Context,
    email: String,
    password: Option<String>,
) -> Result<(), AppError> {
    let credentials = Credentials {
        email: email.trim().to_string(),
        password: password_or_stdin(password)?,
    };
    let token = ctx.client.login(&credentials).await?;
    ctx.session.save(&token)?;

    let claims = oakhurst_core::decode_claims(&token).unwrap_or_default();
    let name = claims
        .display_name()
        .unwrap_or(credentials.email.as_str())
        .to_string();
    tracing::info!(user = %name, manager = claims.is_manager(), "logged in");
    if ctx.json {
        print_json(&json!({
            "logged_in": true,
            "username": name,
            "is_manager": claims.is_manager(),
        }));
    } else {
        println!("Welcome, {name}!");
        if claims.is_manager() {
            println!("Manager tools are available under `oakhurst manager`.");
        }
    }
    Ok(())
}

/// Forget the token.
pub fn cmd_logout(ctx: &Context) -> Result<(), AppError> {
    let was_logged_in = ctx.session.clear()?;
    if ctx.json {
        print_json(&json!({ "logged_out": was_logged_in }));
    } else if was_logged_in {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

/// Show the logged-in user.
pub fn cmd_whoami(ctx: &Context) -> Result<(), AppError> {
    let claims = ctx.client.claims()?;
    let expired = claims.is_expired(chrono::Utc::now().timestamp());
    if ctx.json {
        print_json(&json!({
            "username": claims.display_name(),
            "email": claims.email,
            "user_id": claims.user_id,
            "is_manager": claims.is_manager(),
            "expired": expired,
        }));
    } else {
        println!("{}", view::whoami_line(&claims));
        if expired {
            println!("The session has expired; log in again.");
        }
    }
    Ok(())
}

// =============================================================================
// ANALYSIS COMMANDS
// =============================================================================

/// Text form filled from command-line flags.
pub fn form_from_args(args: &CreateArgs) -> AnalysisForm {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    AnalysisForm {
        description: text(&args.description),
        principal: text(&args.principal),
        interest_week: text(&args.interest),
        projection_period: text(&args.weeks),
        tax_rate: text(&args.tax_rate),
        additional_deposit: text(&args.deposit),
        deposit_frequency: text(&args.deposit_every),
        regular_withdrawal: text(&args.withdrawal),
        withdrawal_frequency: text(&args.withdrawal_every),
    }
}

/// Submit a new analysis.
pub async fn cmd_create(ctx: &Context, args: &CreateArgs) -> Result<(), AppError> {
    let params = form_from_args(args).parse()?;
    let created = ctx.client.create_analysis(&params).await?;
    tracing::info!(id = %created.id, "analysis created");
    if ctx.json {
        print_json(&created);
    } else {
        println!(
            "{}",
            created
                .message
                .as_deref()
                .unwrap_or("Analysis created successfully")
        );
        println!(
            "Analysis {} \"{}\". View it with `oakhurst results {}`",
            created.id, params.description, created.id
        );
    }
    Ok(())
}

/// Show parameters and computed weekly rows.
pub async fn cmd_results(ctx: &Context, id: AnalysisId, page: usize) -> Result<(), AppError> {
    let analysis = ctx.client.get_analysis(id).await?;
    let rows = ctx.client.staging_results(id).await?;
    if ctx.json {
        print_json(&json!({ "analysis": analysis, "results": rows }));
        return Ok(());
    }
    print!("{}", view::analysis_details(&analysis));
    println!();
    print_weekly_page(&rows, page, ctx.config.page_size)
}

/// Edit parameters, then show the recomputed analysis.
pub async fn cmd_update(
    ctx: &Context,
    id: AnalysisId,
    assignments: &[String],
    preview: bool,
) -> Result<(), AppError> {
    let update = AnalysisUpdate::from_assignments(assignments)?;
    if update.is_empty() {
        return Err(OakhurstError::invalid_input("update", "no fields to change").into());
    }

    if preview {
        let current = ctx.client.get_analysis(id).await?;
        let edited = update.apply_to(&current);
        if ctx.json {
            print_json(&edited);
        } else {
            println!("Preview (not sent):");
            print!("{}", view::analysis_details(&edited));
        }
        return Ok(());
    }

    let analysis = ctx.client.update_analysis(id, &update).await?;
    let rows = ctx.client.staging_results(id).await?;
    tracing::info!(%id, "analysis updated");
    if ctx.json {
        print_json(&json!({ "analysis": analysis, "results": rows }));
        return Ok(());
    }
    println!("Analysis {id} updated.");
    print!("{}", view::analysis_details(&analysis));
    println!();
    print_weekly_page(&rows, 1, ctx.config.page_size)
}

/// Move computed rows to the saved set.
pub async fn cmd_save(ctx: &Context, id: AnalysisId) -> Result<(), AppError> {
    let message = ctx.client.move_to_permanent(id).await?;
    if ctx.json {
        print_json(&json!({ "id": id, "message": message }));
    } else {
        println!("{message}");
    }
    Ok(())
}

/// List saved analyses.
pub async fn cmd_saved(
    ctx: &Context,
    text: Option<String>,
    date: Option<String>,
    page: usize,
) -> Result<(), AppError> {
    let filter = match (non_blank(text), optional_date("date", date)?) {
        (Some(text), _) => SavedFilter::Text(text),
        (None, Some(day)) => SavedFilter::Date(day),
        (None, None) => SavedFilter::All,
    };

    let mut analyses = ctx.client.saved_analyses().await?;
    sort_newest_first(&mut analyses);
    let hits = filter.apply(&analyses);

    if ctx.json {
        print_json(&hits);
        return Ok(());
    }
    if hits.is_empty() {
        println!("No saved analyses found.");
        return Ok(());
    }
    let shown = paginate(&hits, page, ctx.config.page_size)?;
    print!("{}", view::saved_table(shown.items).render());
    println!("{}", view::page_footer(&shown));
    Ok(())
}

/// Show a saved analysis: its parameters and saved weekly rows.
pub async fn cmd_search(ctx: &Context, id: AnalysisId, page: usize) -> Result<(), AppError> {
    let analysis = ctx.client.get_analysis(id).await?;
    let rows = ctx.client.permanent_results(id).await?;
    if ctx.json {
        print_json(&json!({ "analysis": analysis, "results": rows }));
        return Ok(());
    }
    print!("{}", view::analysis_details(&analysis));
    println!();
    println!("Saved results");
    print_weekly_page(&rows, page, ctx.config.page_size)
}

/// Write saved weekly rows to a file.
pub async fn cmd_export(
    ctx: &Context,
    id: AnalysisId,
    format: ExportFormat,
    output: Option<PathBuf>,
    raw: bool,
) -> Result<(), AppError> {
    if raw && format == ExportFormat::Pdf {
        tracing::warn!("--raw only applies to CSV exports");
    }
    let rows = ctx.client.permanent_results(id).await?;
    let bytes = weekly_document(&rows, format, raw)?;
    let path = output.unwrap_or_else(|| PathBuf::from(default_file_name(id, format)));
    write_file(&path, &bytes)?;
    report_written(ctx, &path, rows.len());
    Ok(())
}

// =============================================================================
// MANAGER COMMANDS
// =============================================================================

/// Cross-user listing with client-side filters.
pub async fn cmd_dashboard(
    ctx: &Context,
    user: Option<String>,
    max_principal: Option<f64>,
    max_balance: Option<f64>,
    date: Option<String>,
    page: usize,
    export: Option<PathBuf>,
) -> Result<(), AppError> {
    let filter = DashboardFilter {
        username: non_blank(user),
        max_principal,
        max_ending_balance: max_balance,
        created_on: optional_date("date", date)?,
    };

    let rows = ctx.client.all_analyses_with_balances().await?;
    let hits = filter.apply_in(&rows, &chrono::Local);
    tracing::debug!(total = rows.len(), shown = hits.len(), "dashboard filtered");

    let written = export
        .map(|path| -> Result<Value, AppError> {
            write_export(ctx, &path, analyses_csv(&hits)?.as_bytes(), hits.len())
        })
        .transpose()?;

    if ctx.json {
        print_json(&with_written(json!(hits), written));
        return Ok(());
    }
    if hits.is_empty() {
        println!("No analyses match the current filters.");
        return Ok(());
    }
    let shown = paginate(&hits, page, ctx.config.page_size)?;
    print!("{}", view::manager_table(shown.items).render());
    println!("{}", view::page_footer(&shown));
    Ok(())
}

/// One analysis with its saved weekly rows.
pub async fn cmd_detail(
    ctx: &Context,
    id: AnalysisId,
    page: usize,
    export: Option<PathBuf>,
) -> Result<(), AppError> {
    ctx.client.require_manager()?;
    let analysis = ctx.client.get_analysis(id).await?;
    let rows = ctx.client.permanent_results(id).await?;

    let written = export
        .map(|path| -> Result<Value, AppError> {
            let bytes = weekly_document(&rows, format_for_path(&path), false)?;
            write_export(ctx, &path, &bytes, rows.len())
        })
        .transpose()?;

    if ctx.json {
        let listing = json!({ "analysis": analysis, "results": rows });
        print_json(&with_written(listing, written));
        return Ok(());
    }
    print!("{}", view::analysis_details(&analysis));
    println!();
    print_weekly_page(&rows, page, ctx.config.page_size)
}

/// Query criteria from command-line flags.
pub fn query_filters(args: &QueryArgs) -> Result<QueryFilters, AppError> {
    let filters = QueryFilters {
        username: non_blank(args.user.clone()),
        description_contains: non_blank(args.description.clone()),
        principal_gt: args.principal_gt,
        principal_lt: args.principal_lt,
        ending_balance_gt: args.balance_gt,
        ending_balance_lt: args.balance_lt,
        start_date: optional_date("start", args.start.clone())?,
        end_date: optional_date("end", args.end.clone())?,
    };
    filters.validate()?;
    Ok(filters)
}

/// Backend-side filtered query.
pub async fn cmd_query(
    ctx: &Context,
    args: &QueryArgs,
    export: Option<PathBuf>,
) -> Result<(), AppError> {
    let filters = query_filters(args)?;
    let rows = ctx.client.query_analyses(&filters).await?;

    let written = export
        .map(|path| -> Result<Value, AppError> {
            write_export(ctx, &path, query_rows_csv(&rows)?.as_bytes(), rows.len())
        })
        .transpose()?;

    if ctx.json {
        print_json(&with_written(json!(rows), written));
        return Ok(());
    }
    if rows.is_empty() {
        println!("No results match the query.");
        return Ok(());
    }
    print!("{}", view::query_table(&rows).render());
    println!("{} result(s)", rows.len());
    Ok(())
}

/// Download the financial report.
pub async fn cmd_report(
    ctx: &Context,
    user: Option<String>,
    start: Option<String>,
    end: Option<String>,
    timezone: Option<String>,
    output: Option<PathBuf>,
) -> Result<(), AppError> {
    let filters = ReportFilters {
        username: non_blank(user),
        start_date: optional_date("start", start)?,
        end_date: optional_date("end", end)?,
        timezone: non_blank(timezone).unwrap_or_else(|| ctx.config.timezone.clone()),
    };
    let bytes = ctx.client.financial_report(&filters).await?;
    let path = output.unwrap_or_else(|| PathBuf::from(FINANCIAL_REPORT_FILE));
    write_file(&path, &bytes)?;

    // Data lines, excluding the header.
    let rows = bytes
        .split(|b| *b == b'\n')
        .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
        .count()
        .saturating_sub(1);
    report_written(ctx, &path, rows);
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
