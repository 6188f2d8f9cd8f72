//! # Core Type Definitions
//!
//! Wire records exchanged with the analysis backend:
//! - Analysis parameters and stored analyses (`AnalysisParams`, `Analysis`)
//! - Weekly breakdown rows (`WeeklyRow`)
//! - Partial edits (`AnalysisUpdate`)
//! - Manager views (`ManagerAnalysis`, `EndingBalance`, `QueryRow`)
//! - Authentication payloads (`Credentials`, `Registration`, `TokenResponse`)
//! - Error types (`OakhurstError`)
//!
//! The backend computes every number in these records. The client only
//! compares and formats them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of an analysis as assigned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisId(pub u64);

impl std::fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AnalysisId {
    type Err = OakhurstError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| OakhurstError::invalid_input("id", "must be a positive whole number"))
    }
}

// =============================================================================
// ANALYSIS PARAMETERS
// =============================================================================

/// The parameters a user submits to create an analysis.
///
/// Percentages are expressed in percent (`1.5` means 1.5 %), periods and
/// frequencies in weeks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    pub description: String,
    pub principal: f64,
    pub interest_week: f64,
    pub projection_period: u32,
    pub tax_rate: f64,
    pub additional_deposit: f64,
    pub deposit_frequency: u32,
    pub regular_withdrawal: f64,
    pub withdrawal_frequency: u32,
}

/// A stored analysis as returned by the backend.
///
/// Depending on the endpoint the backend omits the id, the timestamps, or
/// the optional schedule fields, so all of those are optional here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AnalysisId>,
    pub description: String,
    pub principal: f64,
    pub interest_week: f64,
    pub projection_period: u32,
    #[serde(default)]
    pub tax_rate: f64,
    #[serde(default)]
    pub additional_deposit: Option<f64>,
    #[serde(default)]
    pub deposit_frequency: Option<u32>,
    #[serde(default)]
    pub regular_withdrawal: Option<f64>,
    #[serde(default)]
    pub withdrawal_frequency: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Analysis {
    /// Deposit amount, `0` when the backend did not store one.
    #[must_use]
    pub fn deposit_amount(&self) -> f64 {
        self.additional_deposit.unwrap_or(0.0)
    }

    /// Withdrawal amount, `0` when the backend did not store one.
    #[must_use]
    pub fn withdrawal_amount(&self) -> f64 {
        self.regular_withdrawal.unwrap_or(0.0)
    }

    /// Deposit frequency in weeks, `1` when absent.
    #[must_use]
    pub fn deposit_every(&self) -> u32 {
        self.deposit_frequency.unwrap_or(1)
    }

    /// Withdrawal frequency in weeks, `1` when absent.
    #[must_use]
    pub fn withdrawal_every(&self) -> u32 {
        self.withdrawal_frequency.unwrap_or(1)
    }

    /// The full parameter set carried by this analysis.
    #[must_use]
    pub fn params(&self) -> AnalysisParams {
        AnalysisParams {
            description: self.description.clone(),
            principal: self.principal,
            interest_week: self.interest_week,
            projection_period: self.projection_period,
            tax_rate: self.tax_rate,
            additional_deposit: self.deposit_amount(),
            deposit_frequency: self.deposit_every(),
            regular_withdrawal: self.withdrawal_amount(),
            withdrawal_frequency: self.withdrawal_every(),
        }
    }
}

impl From<AnalysisParams> for Analysis {
    fn from(params: AnalysisParams) -> Self {
        Self {
            id: None,
            description: params.description,
            principal: params.principal,
            interest_week: params.interest_week,
            projection_period: params.projection_period,
            tax_rate: params.tax_rate,
            additional_deposit: Some(params.additional_deposit),
            deposit_frequency: Some(params.deposit_frequency),
            regular_withdrawal: Some(params.regular_withdrawal),
            withdrawal_frequency: Some(params.withdrawal_frequency),
            created_at: None,
            updated_at: None,
        }
    }
}

/// A partial edit of an analysis. Fields left as `None` keep their stored
/// value when the edit is applied with `apply_to`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_week: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection_period: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_deposit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_frequency: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular_withdrawal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdrawal_frequency: Option<u32>,
}

// =============================================================================
// WEEKLY BREAKDOWN
// =============================================================================

/// One week of a projection, as computed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRow {
    pub week: u32,
    pub beginning_balance: f64,
    pub additional_deposit: f64,
    pub interest: f64,
    pub profit: f64,
    pub withdrawal: f64,
    pub ending_balance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_deduction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_id: Option<AnalysisId>,
}

// =============================================================================
// MANAGER VIEWS
// =============================================================================

/// Owner reference embedded in manager listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub username: String,
}

/// An analysis in the manager's cross-user listing.
///
/// `ending_balance` is not part of the listing payload; the client fills it
/// from the ending-balance endpoint and leaves it empty when that fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerAnalysis {
    pub id: AnalysisId,
    pub description: String,
    pub principal: f64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub ending_balance: Option<f64>,
}

impl ManagerAnalysis {
    /// Owner's username, if the backend attached one.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }
}

/// Latest saved ending balance of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndingBalance {
    pub analysis_id: AnalysisId,
    pub ending_balance: f64,
}

/// A row of the manager's ad-hoc query result (one saved weekly row joined
/// with its analysis and owner).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRow {
    pub id: u64,
    pub username: String,
    pub description: String,
    pub principal: f64,
    pub ending_balance: f64,
    #[serde(default)]
    pub generated_at: Option<String>,
}

// =============================================================================
// AUTHENTICATION PAYLOADS
// =============================================================================

/// Login request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Response to a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedAnalysis {
    pub id: AnalysisId,
    #[serde(default)]
    pub message: Option<String>,
}

/// Generic acknowledgement body. The backend reports some failures with a
/// 200 status and an `error` field, and validation failures with `detail`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl MessageResponse {
    /// Human readable `detail`, which the backend sends either as a string
    /// or as a list of validation issues.
    #[must_use]
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|item| {
                        item.get("msg")
                            .and_then(|m| m.as_str())
                            .map(str::to_string)
                            .unwrap_or_else(|| item.to_string())
                    })
                    .collect();
                Some(parts.join("; "))
            }
            other => Some(other.to_string()),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by the client-side logic.
///
/// - No silent failures
/// - Use `Result<T, OakhurstError>` for fallible operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OakhurstError {
    /// A user supplied value could not be accepted.
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// The stored access token cannot be decoded.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Building an export document failed.
    #[error("Export error: {0}")]
    Export(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

impl OakhurstError {
    /// Shorthand for [`OakhurstError::InvalidInput`].
    pub fn invalid_input(field: &str, reason: &str) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
