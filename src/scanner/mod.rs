//! Mirror trade scanner
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    I/O (gated, concurrent)                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  username ─► identity + season                              │
//! │  own leagues ─► rosters + LeagueContextCache                │
//! │  leaguemates ─► discovered leagues                          │
//! │  (league, week) ─► transaction batches                      │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    CPU (in-memory, no yields)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  IndexBuilder ─► OwnershipIndices + LeaguemateSet           │
//! │  Correlator: trade ─► MirrorTrade | nothing                 │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ScanSink (streamed as found)                               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`LeagueContextCache`]: league metadata, resolved once per session
//! - [`IndexBuilder`]: player and pick ownership for the user and leaguemates
//! - [`discover_leagues`]: every league any leaguemate plays in
//! - [`fetch_batches`]: recent transactions per (league, week)
//! - [`Correlator`]: sell/buy tagging for a single trade
//! - [`MirrorScanner`]: runs the phases and owns the session state

mod cache;
mod correlation;
mod discovery;
mod engine;
mod ownership;
mod players;
mod transactions;

pub use cache::{LeagueContext, LeagueContextCache};
pub use correlation::Correlator;
pub use discovery::{discover_leagues, union_leagues, DiscoveredLeagues};
pub use engine::MirrorScanner;
pub use ownership::{
    Holdings, IndexBuilder, LeaguemateSet, OwnedLeague, OwnershipIndex, OwnershipIndices,
    PickIndex, PlayerIndex,
};
pub use players::PlayerDirectory;
pub use transactions::{
    fetch_batches, is_candidate, lookback_cutoff_ms, weeks_to_scan, TransactionBatch,
};
