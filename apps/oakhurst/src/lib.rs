//! # oakhurst
//!
//! Command-line front end of the Oakhurst analysis application.
//!
//! - `client`: typed HTTP client for the backend REST API
//! - `session`: access token storage in the application home
//! - `config`: `config.toml`, environment and flag resolution
//! - `cli`: clap commands
//! - `view`: text tables and JSON output

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod view;

pub use client::{AnalysisClient, ClientError};
pub use config::Config;
pub use error::AppError;
pub use session::SessionStore;
