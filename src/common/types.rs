//! Domain types shared by the scanner, the sinks and the report writer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Opaque platform user id
pub type UserId = String;
/// Opaque platform league id
pub type LeagueId = String;
/// Roster number inside a single league
pub type RosterId = u32;

/// Display format for trade timestamps
pub const TIME_FORMAT: &str = "%m/%d %H:%M";

/// A resolved platform user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub display_name: String,
}

/// Ownership key for a future draft pick.
///
/// The draft slot stands in for the pick's identity because the platform
/// does not number future picks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PickKey {
    pub season: String,
    pub round: u8,
    pub slot: u32,
}

impl PickKey {
    pub fn new(season: impl Into<String>, round: u8, slot: u32) -> Self {
        Self {
            season: season.into(),
            round,
            slot,
        }
    }
}

/// Anything that can change hands in a trade
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Asset {
    Player {
        player_id: String,
    },
    DraftPick {
        season: String,
        round: u8,
        /// Draft slot of the roster the pick originally belonged to, if known
        slot: Option<u32>,
    },
    WaiverBudget {
        amount: u32,
    },
}

impl Asset {
    pub fn player(player_id: impl Into<String>) -> Self {
        Asset::Player {
            player_id: player_id.into(),
        }
    }

    /// Default label used when no richer name is available
    pub fn default_label(&self, tracked_season: &str) -> String {
        match self {
            Asset::Player { player_id } => player_id.clone(),
            Asset::DraftPick {
                season,
                round,
                slot: Some(slot),
            } if season == tracked_season => format!("{} {}.{:02}", season, round, slot),
            Asset::DraftPick { season, round, .. } => format!("{} Rd {}", season, round),
            Asset::WaiverBudget { amount } => format!("${} FAAB", amount),
        }
    }
}

/// Direction of an opportunity signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    /// A leaguemate is acquiring something the user owns in a shared league
    Sell,
    /// A leaguemate is shedding something they co-own with the user
    Buy,
}

impl std::fmt::Display for TagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagKind::Sell => write!(f, "Sell Opportunity"),
            TagKind::Buy => write!(f, "Buy Opportunity"),
        }
    }
}

/// A tagged signal with the shared leagues that justify it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityTag {
    pub kind: TagKind,
    /// Names of the shared leagues, ordered by league id
    pub leagues: Vec<String>,
}

impl std::fmt::Display for OpportunityTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.kind, self.leagues.join(", "))
    }
}

/// One asset moving to or from a manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMove {
    pub asset: Asset,
    /// Human-readable asset label
    pub label: String,
    #[serde(default)]
    pub tag: Option<OpportunityTag>,
}

impl AssetMove {
    pub fn untagged(asset: Asset, label: impl Into<String>) -> Self {
        Self {
            asset,
            label: label.into(),
            tag: None,
        }
    }

    pub fn is_tagged(&self) -> bool {
        self.tag.is_some()
    }
}

/// Everything one manager received and gave up in a trade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerMoves {
    pub manager_id: UserId,
    pub manager_name: String,
    pub adds: Vec<AssetMove>,
    pub drops: Vec<AssetMove>,
}

impl ManagerMoves {
    pub fn new(manager_id: impl Into<String>, manager_name: impl Into<String>) -> Self {
        Self {
            manager_id: manager_id.into(),
            manager_name: manager_name.into(),
            adds: Vec::new(),
            drops: Vec::new(),
        }
    }

    pub fn tag_count(&self) -> usize {
        self.adds
            .iter()
            .chain(self.drops.iter())
            .filter(|m| m.is_tagged())
            .count()
    }
}

/// A leaguemate trade carrying at least one opportunity tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorTrade {
    pub league_id: LeagueId,
    pub league_name: String,
    #[serde(default)]
    pub transaction_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// `timestamp` rendered with [`TIME_FORMAT`]
    pub time: String,
    pub managers: Vec<ManagerMoves>,
}

impl MirrorTrade {
    pub fn tag_count(&self) -> usize {
        self.managers.iter().map(ManagerMoves::tag_count).sum()
    }

    pub fn manager(&self, manager_id: &str) -> Option<&ManagerMoves> {
        self.managers.iter().find(|m| m.manager_id == manager_id)
    }
}

/// Newest-first copy of a result list
pub fn sorted_for_display(trades: &[MirrorTrade]) -> Vec<MirrorTrade> {
    let mut sorted = trades.to_vec();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted
}

/// Scan phase, used for progress labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    Connecting,
    MappingOwnership,
    DiscoveringLeagues,
    FetchingTrades,
    Analyzing,
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanPhase::Connecting => write!(f, "Step 1/4: Initializing connection"),
            ScanPhase::MappingOwnership => write!(f, "Step 1/4: Mapping your roster ownership"),
            ScanPhase::DiscoveringLeagues => {
                write!(f, "Step 2/4: Identifying leaguemate activity")
            }
            ScanPhase::FetchingTrades => write!(f, "Step 3/4: Fetching trades"),
            ScanPhase::Analyzing => write!(f, "Step 4/4: Analyzing"),
        }
    }
}

/// Scalar progress update in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanProgress {
    pub phase: ScanPhase,
    pub fraction: f64,
    pub label: String,
}

impl ScanProgress {
    pub fn new(phase: ScanPhase, fraction: f64) -> Self {
        Self {
            phase,
            fraction: fraction.clamp(0.0, 1.0),
            label: phase.to_string(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// Running counters surfaced while a scan is in flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScanMetric {
    Leaguemates(usize),
    LeaguesScanned(usize),
    MirrorsFound(usize),
    Elapsed(Duration),
}

/// Terminal counters for a finished scan
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScanSummary {
    pub leaguemates: usize,
    pub leagues_scanned: usize,
    pub opportunities: usize,
    pub elapsed: Duration,
}

/// Everything a scan reports to its sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Previously shown results should be discarded
    Cleared,
    Progress(ScanProgress),
    Metric(ScanMetric),
    MirrorTrade(MirrorTrade),
    Finished(ScanSummary),
}
