//! # Configuration
//!
//! Resolution order, later wins:
//! 1. built-in defaults
//! 2. `<home>/config.toml`
//! 3. `OAKHURST_BACKEND_URL`
//! 4. command-line flags
//!
//! The home directory is `--home`, else `OAKHURST_HOME`, else `~/.oakhurst`.

use crate::error::AppError;
use oakhurst_core::DEFAULT_REPORT_TIMEZONE;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const HOME_ENV: &str = "OAKHURST_HOME";
pub const BACKEND_URL_ENV: &str = "OAKHURST_BACKEND_URL";
pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    backend_url: Option<String>,
    timezone: Option<String>,
    timeout_secs: Option<u64>,
    page_size: Option<usize>,
}

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Application home: holds `config.toml` and the session token.
    pub home: PathBuf,
    /// Backend base URL without a trailing slash.
    pub backend_url: String,
    /// IANA zone name sent with financial report requests. Defaults to the
    /// machine's zone.
    pub timezone: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Rows per page in terminal tables.
    pub page_size: usize,
}

impl Config {
    /// Load settings from the environment, the home directory and flags.
    pub fn load(
        home_override: Option<&Path>,
        backend_override: Option<&str>,
    ) -> Result<Self, AppError> {
        let home = resolve_home(home_override, std::env::var_os(HOME_ENV))?;
        Self::load_from(home, std::env::var(BACKEND_URL_ENV).ok(), backend_override)
    }

    /// Load settings for a known home directory.
    pub fn load_from(
        home: PathBuf,
        env_backend: Option<String>,
        flag_backend: Option<&str>,
    ) -> Result<Self, AppError> {
        let file = read_file_config(&home.join(CONFIG_FILE))?;

        let backend_url = flag_backend
            .map(str::to_string)
            .or_else(|| env_backend.filter(|v| !v.trim().is_empty()))
            .or(file.backend_url)
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let backend_url = normalize_url(&backend_url)?;

        let timezone = file
            .timezone
            .filter(|tz| !tz.trim().is_empty())
            .unwrap_or_else(system_timezone);

        let timeout_secs = file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(AppError::Config("timeout_secs must be at least 1".into()));
        }
        let page_size = file.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(AppError::Config("page_size must be at least 1".into()));
        }

        Ok(Self {
            home,
            backend_url,
            timezone,
            timeout: Duration::from_secs(timeout_secs),
            page_size,
        })
    }
}

/// Pick the home directory: override, then `env_home`, then `~/.oakhurst`.
/// Relative paths are made absolute against the working directory.
pub fn resolve_home(
    home_override: Option<&Path>,
    env_home: Option<OsString>,
) -> Result<PathBuf, AppError> {
    let candidate = match home_override {
        Some(path) => path.to_path_buf(),
        None => match env_home.filter(|v| !v.is_empty()) {
            Some(path) => PathBuf::from(path),
            None => home::home_dir()
                .map(|dir| dir.join(".oakhurst"))
                .ok_or_else(|| AppError::Config("could not resolve a home directory".into()))?,
        },
    };
    if candidate.is_absolute() {
        return Ok(candidate);
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(&candidate))
        .map_err(|e| AppError::io(&candidate, &e))
}

/// IANA name of the machine's time zone, `UTC` when it cannot be read.
pub fn system_timezone() -> String {
    match iana_time_zone::get_timezone() {
        Ok(zone) if !zone.trim().is_empty() => zone,
        Ok(_) => DEFAULT_REPORT_TIMEZONE.to_string(),
        Err(e) => {
            tracing::debug!("system time zone unavailable: {e}");
            DEFAULT_REPORT_TIMEZONE.to_string()
        }
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, AppError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(FileConfig::default()),
        Err(e) => return Err(AppError::io(path, &e)),
    };
    toml::from_str(&text).map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
}

fn normalize_url(url: &str) -> Result<String, AppError> {
    let url = url.trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(AppError::Config(format!(
            "backend URL must start with http:// or https://, got '{url}'"
        )));
    }
    Ok(url.to_string())
}

// =============================================================================
// TESTS
// =============================================================================
