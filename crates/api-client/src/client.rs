use std::time::Duration;

use anyhow::{Result, bail};

use playtime_api::*;

/// Typed HTTP client for the session-storage API.
///
/// High-level methods use the stored auth token; the `*_with_auth` variants
/// take the token per call for callers that own their own token state (the
/// session tracker gates every call on the token it holds at that moment).
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl ApiClient {
    /// Create a new client with the given base URL and timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create from an existing `reqwest::Client` (e.g. shared in tests).
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
        }
    }

    pub fn set_auth(&mut self, token: String) {
        self.auth_token = Some(token);
    }

    pub fn clear_auth(&mut self) {
        self.auth_token = None;
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn token_or_bail(&self) -> Result<&str> {
        self.auth_token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("auth token not set"))
    }

    // ── Auth ──────────────────────────────────────────────────────────────

    pub async fn login(&self, req: &LoginRequest) -> Result<LoginResponse> {
        let resp = self
            .client
            .post(self.url("/auth/login"))
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    // ── Sessions ──────────────────────────────────────────────────────────

    pub async fn start_session(&self, req: &StartSessionRequest) -> Result<StartSessionResponse> {
        let token = self.token_or_bail()?;
        self.start_session_with_auth(token, req).await
    }

    pub async fn start_session_with_auth(
        &self,
        token: &str,
        req: &StartSessionRequest,
    ) -> Result<StartSessionResponse> {
        let resp = self
            .client
            .post(self.url("/games/start"))
            .bearer_auth(token)
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn end_session(&self, req: &EndSessionRequest) -> Result<SessionRecord> {
        let token = self.token_or_bail()?;
        self.end_session_with_auth(token, req).await
    }

    pub async fn end_session_with_auth(
        &self,
        token: &str,
        req: &EndSessionRequest,
    ) -> Result<SessionRecord> {
        let resp = self
            .client
            .post(self.url("/games/end"))
            .bearer_auth(token)
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    /// Most recent sessions first, capped by the server (100).
    pub async fn history(&self) -> Result<Vec<SessionRecord>> {
        let token = self.token_or_bail()?;
        let resp = self
            .client
            .get(self.url("/games/history"))
            .bearer_auth(token)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn stats(&self) -> Result<Vec<GameStatsEntry>> {
        let token = self.token_or_bail()?;
        let resp = self
            .client
            .get(self.url("/games/stats"))
            .bearer_auth(token)
            .send()
            .await?;
        parse_response(resp).await
    }
}

/// Parse an HTTP response: return the deserialized body on 2xx,
/// or an error containing the status and the server's error message.
async fn parse_response<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        bail!("{status}: {message}");
    }
    Ok(resp.json().await?)
}
