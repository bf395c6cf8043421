//! REST API client for the Sleeper platform
//!
//! Every request goes through the shared [`FetchGate`]. Failures never
//! escape the public endpoints: transport errors, timeouts, non-2xx
//! statuses and undecodable bodies all come back as `None`, which callers
//! treat as "this source contributes nothing" rather than as an error.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use super::messages::*;
use crate::common::errors::{Result, ScanError};
use crate::common::gate::FetchGate;
use crate::config::types::{ScanSettings, SleeperConfig};

/// Read-only REST client for the Sleeper API
#[derive(Debug, Clone)]
pub struct SleeperRestClient {
    /// HTTP client
    client: Client,
    /// Base URL for the API
    base_url: Url,
    /// Sport path segment
    sport: String,
    /// Admission gate shared by every request
    gate: Arc<FetchGate>,
    /// Timeout for the player directory download
    players_timeout: Duration,
}

impl SleeperRestClient {
    /// Create a new client with default timeouts and its own gate
    pub fn new(base_url: &str, sport: &str) -> Result<Self> {
        Self::with_timeout(base_url, sport, Duration::from_secs(20))
    }

    /// Create a new client with a custom per-request timeout
    pub fn with_timeout(base_url: &str, sport: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScanError::Internal(e.to_string()))?;

        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ScanError::Configuration(format!("Invalid base URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ScanError::Configuration(format!(
                "Base URL cannot carry paths: {}",
                base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            sport: sport.to_string(),
            gate: Arc::new(FetchGate::default()),
            players_timeout: Duration::from_secs(60),
        })
    }

    /// Build a client from configuration
    pub fn from_config(sleeper: &SleeperConfig, settings: &ScanSettings) -> Result<Self> {
        Ok(Self::with_timeout(
            &sleeper.base_url,
            &sleeper.sport,
            Duration::from_secs(settings.request_timeout_seconds),
        )?
        .with_gate(FetchGate::shared(settings.max_concurrency))
        .with_players_timeout(Duration::from_secs(settings.players_timeout_seconds)))
    }

    /// Share an existing gate
    pub fn with_gate(mut self, gate: Arc<FetchGate>) -> Self {
        self.gate = gate;
        self
    }

    /// Set the timeout for the player directory download
    pub fn with_players_timeout(mut self, timeout: Duration) -> Self {
        self.players_timeout = timeout;
        self
    }

    pub fn gate(&self) -> &Arc<FetchGate> {
        &self.gate
    }

    pub fn sport(&self) -> &str {
        &self.sport
    }

    // ========================================================================
    // Endpoints
    // ========================================================================

    /// Resolve a username; `None` covers both unknown users and failed requests
    #[instrument(skip(self))]
    pub async fn get_user(&self, username: &str) -> Option<SleeperUser> {
        self.fetch_json::<Option<SleeperUser>>(&["user", username], None)
            .await
            .flatten()
    }

    /// Current season and week
    #[instrument(skip(self))]
    pub async fn get_state(&self) -> Option<SportState> {
        let sport = self.sport.clone();
        self.fetch_json(&["state", &sport], None).await
    }

    /// Leagues a user plays in for a season
    #[instrument(skip(self))]
    pub async fn get_user_leagues(&self, user_id: &str, season: &str) -> Option<Vec<LeagueInfo>> {
        let sport = self.sport.clone();
        self.fetch_json(&["user", user_id, "leagues", &sport, season], None)
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_league(&self, league_id: &str) -> Option<LeagueInfo> {
        self.fetch_json(&["league", league_id], None).await
    }

    #[instrument(skip(self))]
    pub async fn get_rosters(&self, league_id: &str) -> Option<Vec<RosterResponse>> {
        self.fetch_json(&["league", league_id, "rosters"], None).await
    }

    #[instrument(skip(self))]
    pub async fn get_league_users(&self, league_id: &str) -> Option<Vec<LeagueUser>> {
        self.fetch_json(&["league", league_id, "users"], None).await
    }

    #[instrument(skip(self))]
    pub async fn get_drafts(&self, league_id: &str) -> Option<Vec<DraftSummary>> {
        self.fetch_json(&["league", league_id, "drafts"], None).await
    }

    #[instrument(skip(self))]
    pub async fn get_draft(&self, draft_id: &str) -> Option<DraftDetail> {
        self.fetch_json(&["draft", draft_id], None).await
    }

    /// Transactions of one league for one week
    #[instrument(skip(self))]
    pub async fn get_transactions(
        &self,
        league_id: &str,
        week: u32,
    ) -> Option<Vec<TransactionResponse>> {
        let week = week.to_string();
        self.fetch_json(&["league", league_id, "transactions", &week], None)
            .await
    }

    /// Full player directory, keyed by player id
    #[instrument(skip(self))]
    pub async fn get_players(&self) -> Option<HashMap<String, PlayerRecord>> {
        let sport = self.sport.clone();
        self.fetch_json(&["players", &sport], Some(self.players_timeout))
            .await
    }

    // ========================================================================
    // Helper Methods
    // ========================================================================

    /// Gate, fetch and decode; any failure degrades to `None`
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        timeout: Option<Duration>,
    ) -> Option<T> {
        let url = match self.endpoint(segments) {
            Ok(url) => url,
            Err(e) => {
                warn!("Could not build request URL: {}", e);
                return None;
            }
        };

        match self.gate.run(self.try_fetch::<T>(&url, timeout)).await {
            Ok(value) => Some(value),
            Err(ScanError::UnexpectedStatus { url, status }) => {
                debug!("{} returned status {}", url, status);
                None
            }
            Err(e) => {
                warn!("Request to {} failed: {}", url, e);
                None
            }
        }
    }

    async fn try_fetch<T: DeserializeOwned>(
        &self,
        url: &Url,
        timeout: Option<Duration>,
    ) -> Result<T> {
        debug!("Fetching {}", url);

        let mut request = self.client.get(url.clone());
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(ScanError::UnexpectedStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Append escaped path segments to the base URL
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ScanError::Internal("Base URL cannot carry paths".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
