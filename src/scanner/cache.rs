//! Session-scoped league context cache

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};

use crate::common::types::{LeagueId, RosterId, UserId};
use crate::sleeper::messages::{DraftDetail, LeagueInfo, LeagueUser, RosterResponse};
use crate::sleeper::SleeperRestClient;

/// Resolved, immutable metadata for one league
#[derive(Debug, Clone, PartialEq)]
pub struct LeagueContext {
    pub league_id: LeagueId,
    pub name: String,
    pub season: Option<String>,
    /// Roster to owning manager
    pub roster_managers: HashMap<RosterId, UserId>,
    /// Manager to display name
    pub manager_names: HashMap<UserId, String>,
    /// Roster to 1-based draft slot, only for managers in the draft order
    pub roster_slots: HashMap<RosterId, u32>,
}

impl LeagueContext {
    /// Derive a context from raw league data
    pub fn resolve(
        info: &LeagueInfo,
        rosters: &[RosterResponse],
        users: &[LeagueUser],
        draft: Option<&DraftDetail>,
    ) -> Self {
        let roster_managers: HashMap<RosterId, UserId> = rosters
            .iter()
            .filter_map(|r| r.owner_id.clone().map(|owner| (r.roster_id, owner)))
            .collect();

        let manager_names = users
            .iter()
            .map(|u| {
                let name = u.display_name.clone().unwrap_or_else(|| u.user_id.clone());
                (u.user_id.clone(), name)
            })
            .collect();

        let roster_slots = match draft {
            Some(draft) => roster_managers
                .iter()
                .filter_map(|(roster, manager)| {
                    draft.draft_order.get(manager).map(|slot| (*roster, *slot))
                })
                .collect(),
            None => HashMap::new(),
        };

        Self {
            league_id: info.league_id.clone(),
            name: info.name.clone().unwrap_or_else(|| info.league_id.clone()),
            season: info.season.clone(),
            roster_managers,
            manager_names,
            roster_slots,
        }
    }

    pub fn manager_of(&self, roster_id: RosterId) -> Option<&UserId> {
        self.roster_managers.get(&roster_id)
    }

    /// Display name, falling back to the raw id
    pub fn manager_name(&self, user_id: &str) -> String {
        self.manager_names
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| user_id.to_string())
    }

    pub fn slot_of(&self, roster_id: RosterId) -> Option<u32> {
        self.roster_slots.get(&roster_id).copied()
    }
}

/// Memoizes league contexts for the lifetime of a session
///
/// A context is resolved at most once per league id: concurrent callers for
/// the same league wait on the same resolution. Failed resolutions are not
/// stored, so a later call may try again.
#[derive(Debug, Default)]
pub struct LeagueContextCache {
    entries: Mutex<HashMap<LeagueId, Arc<OnceCell<Arc<LeagueContext>>>>>,
    resolutions: AtomicUsize,
}

impl LeagueContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached context, resolving it through `client` on a miss
    pub async fn get_context(
        &self,
        client: &SleeperRestClient,
        league_id: &str,
    ) -> Option<Arc<LeagueContext>> {
        self.get_or_resolve(client, league_id, None).await
    }

    /// Like [`get_context`](Self::get_context), but a miss reuses rosters the
    /// caller already holds instead of fetching them again
    pub async fn get_context_with_rosters(
        &self,
        client: &SleeperRestClient,
        league_id: &str,
        rosters: &[RosterResponse],
    ) -> Option<Arc<LeagueContext>> {
        self.get_or_resolve(client, league_id, Some(rosters)).await
    }

    async fn get_or_resolve(
        &self,
        client: &SleeperRestClient,
        league_id: &str,
        known_rosters: Option<&[RosterResponse]>,
    ) -> Option<Arc<LeagueContext>> {
        let cell = {
            let mut entries = self.entries.lock().await;
            entries
                .entry(league_id.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        cell.get_or_try_init(|| async {
            self.resolutions.fetch_add(1, Ordering::SeqCst);
            match resolve_context(client, league_id, known_rosters).await {
                Some(ctx) => Ok(Arc::new(ctx)),
                None => Err(()),
            }
        })
        .await
        .ok()
        .cloned()
    }

    /// Cached context without fetching
    pub async fn peek(&self, league_id: &str) -> Option<Arc<LeagueContext>> {
        let entries = self.entries.lock().await;
        entries.get(league_id).and_then(|cell| cell.get().cloned())
    }

    /// Number of successfully resolved leagues
    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.values().filter(|cell| cell.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of resolution attempts issued so far, successful or not
    pub fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::SeqCst)
    }
}

async fn resolve_context(
    client: &SleeperRestClient,
    league_id: &str,
    known_rosters: Option<&[RosterResponse]>,
) -> Option<LeagueContext> {
    let rosters = async {
        match known_rosters {
            Some(rosters) => Some(Cow::Borrowed(rosters)),
            None => client.get_rosters(league_id).await.map(Cow::Owned),
        }
    };
    let (info, rosters, users, drafts) = tokio::join!(
        client.get_league(league_id),
        rosters,
        client.get_league_users(league_id),
        client.get_drafts(league_id),
    );

    let (info, rosters) = match (info, rosters) {
        (Some(info), Some(rosters)) => (info, rosters),
        _ => {
            warn!("League {} could not be resolved", league_id);
            return None;
        }
    };

    let draft = match drafts.as_ref().and_then(|d| d.first()) {
        Some(latest) => client.get_draft(&latest.draft_id).await,
        None => None,
    };

    let ctx = LeagueContext::resolve(
        &info,
        &rosters,
        users.as_deref().unwrap_or_default(),
        draft.as_ref(),
    );
    debug!(
        "Resolved league {} ({}): {} rosters, {} slotted",
        league_id,
        ctx.name,
        ctx.roster_managers.len(),
        ctx.roster_slots.len()
    );
    Some(ctx)
}
