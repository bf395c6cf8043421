//! Configuration types

use serde::{Deserialize, Serialize};

use crate::common::gate::DEFAULT_MAX_CONCURRENCY;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Sleeper platform configuration
    #[serde(default)]
    pub sleeper: SleeperConfig,
    /// Scan settings
    #[serde(default)]
    pub settings: ScanSettings,
}

/// Sleeper platform configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleeperConfig {
    /// Base URL for the read-only REST API
    #[serde(default = "default_sleeper_base_url")]
    pub base_url: String,
    /// Sport segment used in league and player paths
    #[serde(default = "default_sport")]
    pub sport: String,
}

impl Default for SleeperConfig {
    fn default() -> Self {
        Self {
            base_url: default_sleeper_base_url(),
            sport: default_sport(),
        }
    }
}

fn default_sleeper_base_url() -> String {
    "https://api.sleeper.app/v1".to_string()
}

fn default_sport() -> String {
    "nfl".to_string()
}

/// Bounds for the lookback window, in days
pub const MIN_LOOKBACK_DAYS: u32 = 1;
pub const MAX_LOOKBACK_DAYS: u32 = 30;

/// Settings that shape a scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Maximum number of requests in flight across the whole scan
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Timeout for the (large) player directory download, in seconds
    #[serde(default = "default_players_timeout")]
    pub players_timeout_seconds: u64,
    /// How far back trades are considered, in days
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// Season whose draft picks are indexed; next season when unset
    #[serde(default)]
    pub pick_season: Option<String>,
    /// Rounds 1..=N of the tracked season are indexed
    #[serde(default = "default_pick_rounds")]
    pub pick_rounds: u8,
    /// Tag draft-pick movements against the pick indices
    #[serde(default)]
    pub correlate_picks: bool,
    /// Download the player directory to label players by name
    #[serde(default = "default_true")]
    pub resolve_player_names: bool,
}

impl ScanSettings {
    /// Lookback clamped to the supported window
    pub fn clamp_lookback(days: u32) -> u32 {
        days.clamp(MIN_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS)
    }

    /// Tracked pick season for a given current season
    pub fn tracked_pick_season(&self, current_season: &str) -> String {
        if let Some(season) = &self.pick_season {
            return season.clone();
        }
        match current_season.trim().parse::<u32>() {
            Ok(year) => (year + 1).to_string(),
            Err(_) => current_season.to_string(),
        }
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            max_concurrency: default_max_concurrency(),
            request_timeout_seconds: default_request_timeout(),
            players_timeout_seconds: default_players_timeout(),
            lookback_days: default_lookback_days(),
            pick_season: None,
            pick_rounds: default_pick_rounds(),
            correlate_picks: false,
            resolve_player_names: true,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

fn default_request_timeout() -> u64 {
    20
}

fn default_players_timeout() -> u64 {
    60
}

fn default_lookback_days() -> u32 {
    14
}

fn default_pick_rounds() -> u8 {
    4
}

fn default_true() -> bool {
    true
}
