//! # Oakhurst CLI Module
//!
//! One subcommand per screen of the analysis application.
//!
//! ## Available Commands
//!
//! - `register` / `login` / `logout` / `whoami` - account and session
//! - `create` - submit a new analysis
//! - `results` - parameters and freshly computed weekly breakdown
//! - `update` - edit parameters and recompute
//! - `save` - move computed results to the saved set
//! - `saved` - list saved analyses
//! - `search` - saved weekly breakdown of one analysis
//! - `export` - saved weekly breakdown as CSV or PDF
//! - `manager` - dashboard, detail, query and report tools (manager role)

mod commands;

use clap::{Args, Parser, Subcommand, ValueEnum};
use oakhurst_core::{AnalysisId, ExportFormat};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Oakhurst Development - Analysis App
///
/// Command-line front end for the deposit, interest and withdrawal
/// projection service.
#[derive(Parser, Debug)]
#[command(name = "oakhurst")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json: bool,

    /// Application home directory (config and session token)
    #[arg(long, global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Backend base URL, overriding config and environment
    #[arg(long, global = true, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        /// Password; read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Log in and store the access token
    Login {
        #[arg(long)]
        email: String,

        /// Password; read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the stored access token
    Logout,

    /// Show who is logged in
    Whoami,

    /// Submit a new analysis
    Create(CreateArgs),

    /// Show an analysis and its computed (unsaved) weekly breakdown
    Results {
        id: AnalysisId,

        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Edit parameters of an analysis, e.g. `principal=2500 tax_rate=15`
    Update {
        id: AnalysisId,

        /// `field=value` pairs
        #[arg(required = true, value_name = "FIELD=VALUE")]
        assignments: Vec<String>,

        /// Show the edited parameters without sending them
        #[arg(long)]
        preview: bool,
    },

    /// Save computed results of an analysis
    Save { id: AnalysisId },

    /// List saved analyses, newest first
    Saved {
        /// Match description or id
        #[arg(long, conflicts_with = "date")]
        text: Option<String>,

        /// Creation date, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,

        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Show the saved weekly breakdown of an analysis
    Search {
        id: AnalysisId,

        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Export the saved weekly breakdown of an analysis
    Export {
        id: AnalysisId,

        #[arg(short = 't', long, value_enum, default_value = "csv")]
        format: ExportKind,

        /// Output file path (default: analysis_<id>_results.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Unformatted numbers instead of currency strings (CSV only)
        #[arg(long)]
        raw: bool,
    },

    /// Manager tools
    Manager {
        #[command(subcommand)]
        command: ManagerCommands,
    },
}

/// Manager-only commands.
#[derive(Subcommand, Debug)]
pub enum ManagerCommands {
    /// All users' analyses with ending balances
    Dashboard {
        /// Username contains (case-insensitive)
        #[arg(long)]
        user: Option<String>,

        /// Principal at most
        #[arg(long)]
        max_principal: Option<f64>,

        /// Ending balance at most
        #[arg(long)]
        max_balance: Option<f64>,

        /// Created on, YYYY-MM-DD in local time
        #[arg(long)]
        date: Option<String>,

        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Write the filtered listing as CSV
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,
    },

    /// One analysis with its saved weekly breakdown
    Detail {
        id: AnalysisId,

        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Write the breakdown to a file (.pdf for PDF, otherwise CSV)
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,
    },

    /// Filtered query across all saved results
    Query {
        #[command(flatten)]
        filters: QueryArgs,

        /// Write the results as CSV
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,
    },

    /// Download the financial report CSV
    Report {
        #[arg(long)]
        user: Option<String>,

        /// YYYY-MM-DD
        #[arg(long)]
        start: Option<String>,

        /// YYYY-MM-DD
        #[arg(long)]
        end: Option<String>,

        /// IANA time zone for the date range (default from config)
        #[arg(long)]
        timezone: Option<String>,

        /// Output file path (default: financial_report.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Fields of the "create analysis" form. Blank fields use defaults.
#[derive(Args, Debug, Default)]
pub struct CreateArgs {
    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub principal: Option<String>,

    /// Interest per week, percent
    #[arg(long)]
    pub interest: Option<String>,

    /// Projection period in weeks
    #[arg(long)]
    pub weeks: Option<String>,

    /// Tax rate, percent
    #[arg(long)]
    pub tax_rate: Option<String>,

    /// Additional deposit amount
    #[arg(long)]
    pub deposit: Option<String>,

    /// Deposit every N weeks
    #[arg(long)]
    pub deposit_every: Option<String>,

    /// Regular withdrawal amount
    #[arg(long)]
    pub withdrawal: Option<String>,

    /// Withdraw every N weeks
    #[arg(long)]
    pub withdrawal_every: Option<String>,
}

/// Criteria of the manager query.
#[derive(Args, Debug, Default)]
pub struct QueryArgs {
    #[arg(long)]
    pub user: Option<String>,

    /// Description contains
    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub principal_gt: Option<f64>,

    #[arg(long)]
    pub principal_lt: Option<f64>,

    #[arg(long)]
    pub balance_gt: Option<f64>,

    #[arg(long)]
    pub balance_lt: Option<f64>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub start: Option<String>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub end: Option<String>,
}

/// Document kind accepted by `export`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Csv,
    Pdf,
}

impl From<ExportKind> for ExportFormat {
    fn from(kind: ExportKind) -> Self {
        match kind {
            ExportKind::Csv => Self::Csv,
            ExportKind::Pdf => Self::Pdf,
        }
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), crate::AppError> {
    let ctx = Context::open(cli.home.as_deref(), cli.backend_url.as_deref(), cli.json)?;

    match cli.command {
        Commands::Register {
            username,
            email,
            password,
        } => cmd_register(&ctx, username, email, password).await,
        Commands::Login { email, password } => cmd_login(&ctx, email, password).await,
        Commands::Logout => cmd_logout(&ctx),
        Commands::Whoami => cmd_whoami(&ctx),
        Commands::Create(args) => cmd_create(&ctx, &args).await,
        Commands::Results { id, page } => cmd_results(&ctx, id, page).await,
        Commands::Update {
            id,
            assignments,
            preview,
        } => cmd_update(&ctx, id, &assignments, preview).await,
        Commands::Save { id } => cmd_save(&ctx, id).await,
        Commands::Saved { text, date, page } => cmd_saved(&ctx, text, date, page).await,
        Commands::Search { id, page } => cmd_search(&ctx, id, page).await,
        Commands::Export {
            id,
            format,
            output,
            raw,
        } => cmd_export(&ctx, id, format.into(), output, raw).await,
        Commands::Manager { command } => match command {
            ManagerCommands::Dashboard {
                user,
                max_principal,
                max_balance,
                date,
                page,
                export,
            } => {
                cmd_dashboard(&ctx, user, max_principal, max_balance, date, page, export).await
            }
            ManagerCommands::Detail { id, page, export } => {
                cmd_detail(&ctx, id, page, export).await
            }
            ManagerCommands::Query { filters, export } => cmd_query(&ctx, &filters, export).await,
            ManagerCommands::Report {
                user,
                start,
                end,
                timezone,
                output,
            } => cmd_report(&ctx, user, start, end, timezone, output).await,
        },
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_globals_after_subcommand() {
        let cli = Cli::try_parse_from([
            "oakhurst",
            "export",
            "12",
            "--format",
            "pdf",
            "--json",
            "--backend-url",
            "http://api.test",
        ])
        .expect("parse");
        assert!(cli.json);
        assert_eq!(cli.backend_url.as_deref(), Some("http://api.test"));
        match cli.command {
            Commands::Export { id, format, .. } => {
                assert_eq!(id, AnalysisId(12));
                assert_eq!(format, ExportKind::Pdf);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn saved_filters_are_exclusive() {
        assert!(
            Cli::try_parse_from(["oakhurst", "saved", "--text", "a", "--date", "2025-01-01"])
                .is_err()
        );
    }

    #[test]
    fn update_needs_assignments() {
        assert!(Cli::try_parse_from(["oakhurst", "update", "3"]).is_err());
        let cli = Cli::try_parse_from(["oakhurst", "update", "3", "principal=10", "tax_rate=5"])
            .expect("parse");
        match cli.command {
            Commands::Update { assignments, .. } => assert_eq!(assignments.len(), 2),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn manager_query_flags() {
        let cli = Cli::try_parse_from([
            "oakhurst",
            "manager",
            "query",
            "--principal-gt",
            "1000",
            "--start",
            "2025-01-01",
        ])
        .expect("parse");
        match cli.command {
            Commands::Manager {
                command: ManagerCommands::Query { filters, export },
            } => {
                assert_eq!(filters.principal_gt, Some(1000.0));
                assert_eq!(filters.start.as_deref(), Some("2025-01-01"));
                assert!(export.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
