//! # Session Store
//!
//! The access token lives in `<home>/token`, one line, readable only by the
//! owner where the platform allows it.

use crate::error::AppError;
use std::fs;
use std::path::{Path, PathBuf};

pub const TOKEN_FILE: &str = "token";

/// File-backed storage for the access token.
#[derive(Debug, Clone)]
pub struct SessionStore {
    home: PathBuf,
}

impl SessionStore {
    pub fn new(home: &Path) -> Self {
        Self {
            home: home.to_path_buf(),
        }
    }

    pub fn token_path(&self) -> PathBuf {
        self.home.join(TOKEN_FILE)
    }

    /// Stored token, or `None` when nobody is logged in.
    pub fn load(&self) -> Result<Option<String>, AppError> {
        let path = self.token_path();
        match fs::read_to_string(&path) {
            Ok(text) => {
                let token = text.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::io(&path, &e)),
        }
    }

    /// Replace the stored token.
    pub fn save(&self, token: &str) -> Result<(), AppError> {
        fs::create_dir_all(&self.home).map_err(|e| AppError::io(&self.home, &e))?;
        set_private_permissions_best_effort(&self.home, 0o700);
        let path = self.token_path();
        fs::write(&path, format!("{}\n", token.trim())).map_err(|e| AppError::io(&path, &e))?;
        set_private_permissions_best_effort(&path, 0o600);
        Ok(())
    }

    /// Forget the token. Returns whether one was stored.
    pub fn clear(&self) -> Result<bool, AppError> {
        let path = self.token_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::io(&path, &e)),
        }
    }
}

#[cfg(unix)]
fn set_private_permissions_best_effort(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;

    let _ = fs::set_permissions(path, fs::Permissions::from_mode(mode));
}

#[cfg(not(unix))]
fn set_private_permissions_best_effort(_path: &Path, _mode: u32) {}
