//! LeaguemateMirror Library
//!
//! Scans the trades of everyone you share a Sleeper league with and flags
//! the ones that mirror your own holdings: a leaguemate buying a player you
//! own in a shared league (sell signal), or selling one you both hold
//! (buy signal).

pub mod common;
pub mod config;
pub mod report;
pub mod scanner;
pub mod sleeper;

// Re-export commonly used types
pub use common::errors::{Result, ScanError};
pub use common::gate::FetchGate;
pub use common::traits::{NullSink, ScanSink};
pub use common::types::{
    Asset, AssetMove, Identity, ManagerMoves, MirrorTrade, OpportunityTag, PickKey, ScanEvent,
    ScanMetric, ScanPhase, ScanProgress, ScanSummary, TagKind,
};
pub use config::types::AppConfig;
pub use scanner::MirrorScanner;
pub use sleeper::SleeperRestClient;
