//! Expands the scan universe to every league any leaguemate plays in

use futures_util::future::join_all;
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::common::types::{LeagueId, UserId};
use crate::sleeper::messages::LeagueInfo;
use crate::sleeper::SleeperRestClient;

/// Result of league discovery
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredLeagues {
    /// Deduplicated league ids across all leaguemates
    pub leagues: BTreeSet<LeagueId>,
    /// Leaguemates whose league list could not be fetched
    pub unreachable: usize,
}

impl DiscoveredLeagues {
    pub fn len(&self) -> usize {
        self.leagues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leagues.is_empty()
    }
}

/// Fetch every leaguemate's leagues for `season` and union them
pub async fn discover_leagues<'a, I>(
    client: &SleeperRestClient,
    leaguemates: I,
    season: &str,
) -> DiscoveredLeagues
where
    I: IntoIterator<Item = &'a UserId>,
{
    let requests = leaguemates
        .into_iter()
        .map(|mate| client.get_user_leagues(mate, season));
    let responses = join_all(requests).await;

    let discovered = union_leagues(responses);
    info!(
        "Discovered {} leagues ({} leaguemates unreachable)",
        discovered.len(),
        discovered.unreachable
    );
    discovered
}

/// Union league lists; `None` entries count as unreachable
pub fn union_leagues<I>(responses: I) -> DiscoveredLeagues
where
    I: IntoIterator<Item = Option<Vec<LeagueInfo>>>,
{
    let mut discovered = DiscoveredLeagues::default();
    for response in responses {
        match response {
            Some(leagues) => discovered
                .leagues
                .extend(leagues.into_iter().map(|l| l.league_id)),
            None => {
                debug!("Leaguemate league list unavailable");
                discovered.unreachable += 1;
            }
        }
    }
    discovered
}
