//! Scan orchestration
//!
//! Phases run strictly in order: identity and season, ownership mapping
//! over the user's leagues, league discovery through leaguemates,
//! transaction retrieval, then correlation. Fetches inside a phase run
//! concurrently under the shared gate; correlation itself never yields.

use chrono::Utc;
use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use super::cache::{LeagueContext, LeagueContextCache};
use super::correlation::Correlator;
use super::discovery::discover_leagues;
use super::ownership::{IndexBuilder, OwnedLeague, OwnershipIndices};
use super::players::PlayerDirectory;
use super::transactions::{fetch_batches, lookback_cutoff_ms, weeks_to_scan};
use crate::common::errors::{Result, ScanError};
use crate::common::gate::FetchGate;
use crate::common::traits::ScanSink;
use crate::common::types::{
    Identity, LeagueId, MirrorTrade, ScanEvent, ScanMetric, ScanPhase, ScanProgress, ScanSummary,
};
use crate::config::types::{AppConfig, ScanSettings};
use crate::sleeper::messages::{LeagueInfo, RosterResponse};
use crate::sleeper::SleeperRestClient;

/// Progress fractions at each phase boundary
const PROGRESS_MAPPING: f64 = 0.1;
const PROGRESS_DISCOVERY: f64 = 0.2;
const PROGRESS_FETCHING: f64 = 0.3;

/// Owns the session: client, gate, context cache, player names and results
#[derive(Debug)]
pub struct MirrorScanner {
    client: SleeperRestClient,
    settings: ScanSettings,
    cache: LeagueContextCache,
    players: OnceCell<Arc<PlayerDirectory>>,
    results: Vec<MirrorTrade>,
}

/// User-side state produced by the mapping phase
struct OwnershipMap {
    indices: OwnershipIndices,
    league_names: HashMap<LeagueId, String>,
}

impl MirrorScanner {
    /// Create a scanner from configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = SleeperRestClient::from_config(&config.sleeper, &config.settings)?;
        Ok(Self::with_client(client, config.settings.clone()))
    }

    /// Create a scanner around an existing client
    pub fn with_client(client: SleeperRestClient, settings: ScanSettings) -> Self {
        Self {
            client,
            settings,
            cache: LeagueContextCache::new(),
            players: OnceCell::new(),
            results: Vec::new(),
        }
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    pub fn client(&self) -> &SleeperRestClient {
        &self.client
    }

    pub fn gate(&self) -> &Arc<FetchGate> {
        self.client.gate()
    }

    pub fn cache(&self) -> &LeagueContextCache {
        &self.cache
    }

    /// Mirror trades found in this session
    pub fn results(&self) -> &[MirrorTrade] {
        &self.results
    }

    pub fn clear_results(&mut self) {
        self.results.clear();
    }

    /// Run a full scan for `username`, streaming into `sink`
    ///
    /// Only identity or season resolution failures end the scan with an
    /// error; every other failed fetch just shrinks what gets scanned.
    #[instrument(skip(self, sink))]
    pub async fn scan<S>(
        &mut self,
        username: &str,
        lookback_days: u32,
        sink: &mut S,
    ) -> Result<ScanSummary>
    where
        S: ScanSink + ?Sized,
    {
        let started = Instant::now();
        let lookback_days = ScanSettings::clamp_lookback(lookback_days);

        self.results.clear();
        sink.handle_event(ScanEvent::Cleared).await;
        progress(sink, ScanPhase::Connecting, 0.0).await;

        let user = self
            .client
            .get_user(username)
            .await
            .ok_or_else(|| ScanError::UserNotFound(username.to_string()))?;
        let identity = Identity {
            display_name: user.display_name.clone().unwrap_or_else(|| username.to_string()),
            user_id: user.user_id,
        };
        let state = self
            .client
            .get_state()
            .await
            .ok_or(ScanError::StateUnavailable)?;
        info!(
            "Scanning as {} ({}), season {} week {}",
            identity.display_name, identity.user_id, state.season, state.week
        );

        let pick_season = self.settings.tracked_pick_season(&state.season);
        let (players, own_leagues) = tokio::join!(
            self.player_directory(),
            self.client.get_user_leagues(&identity.user_id, &state.season),
        );
        let own_leagues = own_leagues.unwrap_or_else(|| {
            warn!("League list for {} unavailable", identity.user_id);
            Vec::new()
        });

        progress(sink, ScanPhase::MappingOwnership, PROGRESS_MAPPING).await;
        let ownership = self
            .map_ownership(&identity, &own_leagues, &pick_season)
            .await;
        let leaguemates = ownership.indices.shared_leagues.len();
        info!(
            "Indexed {} own leagues, {} leaguemates",
            own_leagues.len(),
            leaguemates
        );
        sink.handle_event(ScanEvent::Metric(ScanMetric::Leaguemates(leaguemates)))
            .await;

        progress(sink, ScanPhase::DiscoveringLeagues, PROGRESS_DISCOVERY).await;
        let discovered = discover_leagues(
            &self.client,
            ownership.indices.shared_leagues.keys(),
            &state.season,
        )
        .await;
        let leagues_scanned = discovered.len();
        sink.handle_event(ScanEvent::Metric(ScanMetric::LeaguesScanned(
            leagues_scanned,
        )))
        .await;

        let fetching = ScanProgress::new(ScanPhase::FetchingTrades, PROGRESS_FETCHING).with_label(
            format!("{} from {} leagues", ScanPhase::FetchingTrades, leagues_scanned),
        );
        sink.handle_event(ScanEvent::Progress(fetching)).await;
        let cutoff_ms = lookback_cutoff_ms(Utc::now(), lookback_days);
        let batches = fetch_batches(
            &self.client,
            &discovered.leagues,
            &weeks_to_scan(state.week),
        )
        .await;

        let correlator = Correlator {
            indices: &ownership.indices,
            league_names: &ownership.league_names,
            players: &players,
            pick_season: &pick_season,
            correlate_picks: self.settings.correlate_picks,
        };

        let total = batches.len();
        for (i, batch) in batches.iter().enumerate() {
            let fraction = PROGRESS_FETCHING + (1.0 - PROGRESS_FETCHING) * (i + 1) as f64 / total as f64;
            let analyzing = ScanProgress::new(ScanPhase::Analyzing, fraction)
                .with_label(format!("{} League {}/{}", ScanPhase::Analyzing, i + 1, total));
            sink.handle_event(ScanEvent::Progress(analyzing)).await;

            let mut candidates = batch.candidates(cutoff_ms).peekable();
            if candidates.peek().is_none() {
                continue;
            }
            let Some(ctx) = self.cache.get_context(&self.client, &batch.league_id).await else {
                debug!("Skipping trades in unresolved league {}", batch.league_id);
                continue;
            };
            for txn in candidates {
                if let Some(mirror) = correlator.correlate(&ctx, txn) {
                    info!(
                        "Mirror trade in {} with {} tags",
                        mirror.league_name,
                        mirror.tag_count()
                    );
                    self.results.push(mirror.clone());
                    sink.handle_event(ScanEvent::MirrorTrade(mirror)).await;
                    sink.handle_event(ScanEvent::Metric(ScanMetric::MirrorsFound(
                        self.results.len(),
                    )))
                    .await;
                }
            }
        }
        if total == 0 {
            progress(sink, ScanPhase::Analyzing, 1.0).await;
        }

        let summary = ScanSummary {
            leaguemates,
            leagues_scanned,
            opportunities: self.results.len(),
            elapsed: started.elapsed(),
        };
        sink.handle_event(ScanEvent::Metric(ScanMetric::Elapsed(summary.elapsed)))
            .await;
        sink.handle_event(ScanEvent::Finished(summary)).await;
        info!(
            "Scan finished: {} mirror trades across {} leagues in {:.1}s",
            summary.opportunities,
            summary.leagues_scanned,
            summary.elapsed.as_secs_f64()
        );
        Ok(summary)
    }

    /// Rosters and contexts for the user's own leagues, indexed
    async fn map_ownership(
        &self,
        identity: &Identity,
        own_leagues: &[LeagueInfo],
        pick_season: &str,
    ) -> OwnershipMap {
        let rosters = join_all(
            own_leagues
                .iter()
                .map(|league| self.client.get_rosters(&league.league_id)),
        )
        .await;
        let contexts = join_all(own_leagues.iter().zip(&rosters).map(
            |(league, rosters)| async move {
                let rosters = rosters.as_deref()?;
                self.cache
                    .get_context_with_rosters(&self.client, &league.league_id, rosters)
                    .await
            },
        ))
        .await;

        let resolved: Vec<(&LeagueInfo, Vec<RosterResponse>, Arc<LeagueContext>)> = own_leagues
            .iter()
            .zip(rosters)
            .zip(contexts)
            .filter_map(|((league, rosters), ctx)| match (rosters, ctx) {
                (Some(rosters), Some(ctx)) => Some((league, rosters, ctx)),
                _ => {
                    warn!("Skipping league {}: incomplete data", league.league_id);
                    None
                }
            })
            .collect();

        let builder = IndexBuilder::new(
            identity.user_id.clone(),
            pick_season,
            self.settings.pick_rounds,
        );
        let indices = builder.build(resolved.iter().map(|(league, rosters, ctx)| OwnedLeague {
            league_id: &league.league_id,
            rosters,
            roster_slots: &ctx.roster_slots,
        }));
        let league_names = resolved
            .iter()
            .map(|(league, _, ctx)| (league.league_id.clone(), ctx.name.clone()))
            .collect();

        OwnershipMap {
            indices,
            league_names,
        }
    }

    /// Player names, downloaded once per session
    async fn player_directory(&self) -> Arc<PlayerDirectory> {
        if !self.settings.resolve_player_names {
            return Arc::new(PlayerDirectory::empty());
        }
        self.players
            .get_or_init(|| async {
                match self.client.get_players().await {
                    Some(records) => Arc::new(PlayerDirectory::from_records(records)),
                    None => {
                        warn!("Player directory unavailable, labelling players by id");
                        Arc::new(PlayerDirectory::empty())
                    }
                }
            })
            .await
            .clone()
    }
}

async fn progress<S: ScanSink + ?Sized>(sink: &mut S, phase: ScanPhase, fraction: f64) {
    sink.handle_event(ScanEvent::Progress(ScanProgress::new(phase, fraction)))
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scanner_from_default_config() {
        let scanner = MirrorScanner::new(&AppConfig::default()).unwrap();
        assert_eq!(scanner.gate().capacity(), 50);
        assert!(scanner.results().is_empty());
    }
}
