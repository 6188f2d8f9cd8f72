//! # Oakhurst HTTP Client
//!
//! Typed wrapper around the analysis backend's REST API.
//!
//! Every call is a single request: no retries, no caching. The access token
//! is attached as a Bearer header when present. Role checks made here are a
//! convenience for the user; the backend enforces them again.

use oakhurst_core::{
    Analysis, AnalysisId, AnalysisParams, AnalysisUpdate, CreatedAnalysis, Credentials,
    EndingBalance, ManagerAnalysis, MessageResponse, OakhurstError, QueryFilters, QueryRow,
    Registration, ReportFilters, TokenClaims, TokenResponse, WeeklyRow, decode_claims,
};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Errors from the HTTP client layer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Cannot reach the backend.
    #[error("Cannot connect to the analysis backend at {0}")]
    ConnectionFailed(String),
    /// 401, or a local token that is expired or unreadable.
    #[error("Unauthorized: please log in again")]
    Unauthorized,
    /// 403.
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// 404.
    #[error("Not found: {0}")]
    NotFound(String),
    /// Any other refusal, including 200 responses that carry an `error`.
    #[error("Request rejected ({status}): {detail}")]
    Rejected { status: u16, detail: String },
    /// 5xx.
    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),
    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    ParseError(String),
    /// No access token stored.
    #[error("Not logged in: run `oakhurst login` first")]
    NotLoggedIn,
    /// The stored token lacks the manager role.
    #[error("This action is only available to managers")]
    NotManager,
    /// Request parameters failed local validation; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] OakhurstError),
}

/// HTTP client for the analysis backend.
#[derive(Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl AnalysisClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::ConnectionFailed(format!("{base_url}: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Attach (or clear) the access token sent with each request.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Claims of the attached token.
    pub fn claims(&self) -> Result<TokenClaims, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::NotLoggedIn)?;
        decode_claims(token).map_err(|e| {
            warn!("stored token is unreadable: {e}");
            ClientError::Unauthorized
        })
    }

    fn require_login(&self) -> Result<TokenClaims, ClientError> {
        let claims = self.claims()?;
        if claims.is_expired(chrono::Utc::now().timestamp()) {
            return Err(ClientError::Unauthorized);
        }
        Ok(claims)
    }

    /// Fail with `NotManager` unless the token carries the manager role.
    pub fn require_manager(&self) -> Result<(), ClientError> {
        if self.require_login()?.is_manager() {
            Ok(())
        } else {
            Err(ClientError::NotManager)
        }
    }

    // =========================================================================
    // TRANSPORT
    // =========================================================================

    /// Build a request with optional Bearer auth.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        debug!(%method, path, "backend request");
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method, &url);
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Send a request and handle connection errors and error statuses.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let resp = req.send().await.map_err(|e| {
            warn!("backend unreachable: {e}");
            ClientError::ConnectionFailed(self.base_url.clone())
        })?;

        let status = resp.status();
        let path = resp.url().path().to_string();
        debug!(status = status.as_u16(), path = %path, "backend response");
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let detail = error_detail(status, &body);
        warn!(status = status.as_u16(), path = %path, detail = %detail, "backend refused request");
        Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(detail),
            StatusCode::NOT_FOUND => ClientError::NotFound(detail),
            s if s.is_server_error() => ClientError::ServerError(s.as_u16(), detail),
            s => ClientError::Rejected {
                status: s.as_u16(),
                detail,
            },
        })
    }

    /// Send a request and parse the JSON body.
    async fn fetch<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        self.send(req)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))
    }

    // =========================================================================
    // AUTHENTICATION
    // =========================================================================

    /// POST /register → confirmation message.
    pub async fn register(&self, registration: &Registration) -> Result<String, ClientError> {
        let req = self.request(Method::POST, "/register").json(registration);
        let resp: MessageResponse = self.fetch(req).await?;
        Ok(resp
            .message
            .unwrap_or_else(|| "User registered successfully".to_string()))
    }

    /// POST /login → access token.
    pub async fn login(&self, credentials: &Credentials) -> Result<String, ClientError> {
        let req = self.request(Method::POST, "/login").json(credentials);
        let resp: TokenResponse = self.fetch(req).await?;
        resp.access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClientError::ParseError("login response has no access_token".into()))
    }

    // =========================================================================
    // ANALYSES
    // =========================================================================

    /// POST /analysis/ → id of the new analysis.
    pub async fn create_analysis(
        &self,
        params: &AnalysisParams,
    ) -> Result<CreatedAnalysis, ClientError> {
        self.require_login()?;
        let req = self.request(Method::POST, "/analysis/").json(params);
        self.fetch(req).await
    }

    /// GET /analysis/{id}
    pub async fn get_analysis(&self, id: AnalysisId) -> Result<Analysis, ClientError> {
        self.require_login()?;
        let mut analysis: Analysis = self
            .fetch(self.request(Method::GET, &format!("/analysis/{id}")))
            .await?;
        analysis.id.get_or_insert(id);
        Ok(analysis)
    }

    /// GET /results/{id} → weekly rows not yet saved.
    pub async fn staging_results(&self, id: AnalysisId) -> Result<Vec<WeeklyRow>, ClientError> {
        self.require_login()?;
        self.fetch(self.request(Method::GET, &format!("/results/{id}")))
            .await
    }

    /// POST /update-analysis/{id}, then re-read the analysis.
    ///
    /// The backend expects the whole parameter set, so the edit is applied
    /// to the stored analysis and every field is sent.
    pub async fn update_analysis(
        &self,
        id: AnalysisId,
        update: &AnalysisUpdate,
    ) -> Result<Analysis, ClientError> {
        let current = self.get_analysis(id).await?;
        let params = update.apply_to(&current).params();
        debug!(%id, "sending edited parameters");
        let req = self
            .request(Method::POST, &format!("/update-analysis/{id}"))
            .json(&params);
        let resp: MessageResponse = self.fetch(req).await?;
        if let Some(error) = resp.error {
            return Err(ClientError::Rejected {
                status: StatusCode::OK.as_u16(),
                detail: error,
            });
        }
        self.get_analysis(id).await
    }

    /// POST /move-to-permanent/{id} → confirmation message.
    pub async fn move_to_permanent(&self, id: AnalysisId) -> Result<String, ClientError> {
        self.require_login()?;
        let req = self.request(Method::POST, &format!("/move-to-permanent/{id}"));
        let resp: MessageResponse = self.fetch(req).await?;
        if let Some(error) = resp.error {
            return Err(ClientError::Rejected {
                status: StatusCode::OK.as_u16(),
                detail: error,
            });
        }
        Ok(resp
            .message
            .unwrap_or_else(|| "Results saved".to_string()))
    }

    /// GET /saved-analysis
    pub async fn saved_analyses(&self) -> Result<Vec<Analysis>, ClientError> {
        self.require_login()?;
        self.fetch(self.request(Method::GET, "/saved-analysis"))
            .await
    }

    /// GET /permanent-results/{id} → saved weekly rows.
    pub async fn permanent_results(&self, id: AnalysisId) -> Result<Vec<WeeklyRow>, ClientError> {
        self.require_login()?;
        self.fetch(self.request(Method::GET, &format!("/permanent-results/{id}")))
            .await
    }

    // =========================================================================
    // MANAGER
    // =========================================================================

    /// GET /manager/all-analyses (balances left empty).
    pub async fn all_analyses(&self) -> Result<Vec<ManagerAnalysis>, ClientError> {
        self.require_manager()?;
        self.fetch(self.request(Method::GET, "/manager/all-analyses"))
            .await
    }

    /// GET /manager/ending-balance/{id}
    pub async fn ending_balance(&self, id: AnalysisId) -> Result<f64, ClientError> {
        self.require_manager()?;
        let resp: EndingBalance = self
            .fetch(self.request(Method::GET, &format!("/manager/ending-balance/{id}")))
            .await?;
        Ok(resp.ending_balance)
    }

    /// All analyses with their ending balances filled in.
    ///
    /// Balances are fetched concurrently. An analysis whose balance lookup
    /// fails keeps `ending_balance: None`.
    pub async fn all_analyses_with_balances(&self) -> Result<Vec<ManagerAnalysis>, ClientError> {
        let mut analyses = self.all_analyses().await?;

        let mut lookups = JoinSet::new();
        for (index, analysis) in analyses.iter().enumerate() {
            let client = self.clone();
            let id = analysis.id;
            lookups.spawn(async move { (index, id, client.ending_balance(id).await) });
        }

        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok((index, _, Ok(balance))) => {
                    if let Some(analysis) = analyses.get_mut(index) {
                        analysis.ending_balance = Some(balance);
                    }
                }
                Ok((_, id, Err(e))) => debug!(%id, "no ending balance: {e}"),
                Err(e) => warn!("ending balance lookup aborted: {e}"),
            }
        }
        Ok(analyses)
    }

    /// GET /queries/analyses with the set criteria.
    pub async fn query_analyses(
        &self,
        filters: &QueryFilters,
    ) -> Result<Vec<QueryRow>, ClientError> {
        self.require_manager()?;
        let pairs = filters.to_query_pairs()?;
        let req = self.request(Method::GET, "/queries/analyses").query(&pairs);
        self.fetch(req).await
    }

    /// GET /manager/reports/financial → CSV document bytes.
    pub async fn financial_report(&self, filters: &ReportFilters) -> Result<Vec<u8>, ClientError> {
        self.require_manager()?;
        let pairs = filters.to_query_pairs()?;
        let req = self
            .request(Method::GET, "/manager/reports/financial")
            .query(&pairs);
        let resp = self.send(req).await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Text of a backend error body: `detail`, `error` or `message`, else the
/// raw body, else the status reason.
fn error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<MessageResponse>(body)
        && let Some(text) = parsed.detail_text().or(parsed.error).or(parsed.message)
    {
        return text;
    }
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}

// =============================================================================
// TESTS
// =============================================================================
