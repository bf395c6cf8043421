//! Sleeper API response types

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::common::types::RosterId;

/// `GET /user/{username}`; the API answers `null` for unknown users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleeperUser {
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// `GET /state/{sport}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SportState {
    pub season: String,
    #[serde(default = "default_week")]
    pub week: u32,
    #[serde(default)]
    pub season_type: Option<String>,
}

fn default_week() -> u32 {
    1
}

/// Entry of `GET /user/{user_id}/leagues/{sport}/{season}`, also `GET /league/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueInfo {
    pub league_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
}

/// Entry of `GET /league/{id}/rosters`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterResponse {
    pub roster_id: RosterId,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub players: Vec<String>,
}

/// Entry of `GET /league/{id}/users`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueUser {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Entry of `GET /league/{id}/drafts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSummary {
    pub draft_id: String,
    #[serde(default)]
    pub season: Option<String>,
}

/// `GET /draft/{draft_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftDetail {
    pub draft_id: String,
    /// Manager id to 1-based draft slot
    #[serde(default, deserialize_with = "null_as_default")]
    pub draft_order: HashMap<String, u32>,
}

/// Draft pick changing hands inside a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPickTransfer {
    pub season: String,
    pub round: u8,
    /// Roster the pick originally belonged to
    pub roster_id: RosterId,
    #[serde(default)]
    pub previous_owner_id: Option<RosterId>,
    #[serde(default)]
    pub owner_id: Option<RosterId>,
}

/// Waiver budget changing hands inside a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaiverBudgetTransfer {
    pub sender: RosterId,
    pub receiver: RosterId,
    pub amount: u32,
}

/// Entry of `GET /league/{id}/transactions/{week}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResponse {
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub status: Option<String>,
    /// Epoch milliseconds of the last status change
    #[serde(default)]
    pub status_updated: i64,
    /// Player id to receiving roster
    #[serde(default, deserialize_with = "null_as_default")]
    pub adds: BTreeMap<String, RosterId>,
    /// Player id to losing roster
    #[serde(default, deserialize_with = "null_as_default")]
    pub drops: BTreeMap<String, RosterId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub draft_picks: Vec<DraftPickTransfer>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub waiver_budget: Vec<WaiverBudgetTransfer>,
}

impl TransactionResponse {
    pub fn is_trade(&self) -> bool {
        self.kind == "trade"
    }
}

/// Value of the `GET /players/{sport}` map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
}

impl PlayerRecord {
    /// Best available display name
    pub fn display_name(&self) -> Option<String> {
        if let Some(full) = self.full_name.as_deref().filter(|n| !n.is_empty()) {
            return Some(full.to_string());
        }
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            _ => None,
        }
    }
}

/// The API sends `null` for empty maps and lists
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
