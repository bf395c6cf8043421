//! Ownership indices for the scanning user and each leaguemate

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::common::types::{LeagueId, PickKey, RosterId, UserId};
use crate::sleeper::messages::RosterResponse;

/// Asset key to the leagues where one manager holds it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipIndex<K: Ord> {
    entries: BTreeMap<K, BTreeSet<LeagueId>>,
}

impl<K: Ord> Default for OwnershipIndex<K> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: Ord> OwnershipIndex<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: K, league_id: &str) {
        self.entries
            .entry(key)
            .or_default()
            .insert(league_id.to_string());
    }

    pub fn leagues(&self, key: &K) -> Option<&BTreeSet<LeagueId>> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Leagues holding `key` that are also in `scope`, in league id order
    pub fn overlap(&self, key: &K, scope: &BTreeSet<LeagueId>) -> Vec<LeagueId> {
        self.leagues(key)
            .map(|owned| owned.intersection(scope).cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub type PlayerIndex = OwnershipIndex<String>;
pub type PickIndex = OwnershipIndex<PickKey>;

/// Leaguemate to the leagues they share with the scanning user
pub type LeaguemateSet = BTreeMap<UserId, BTreeSet<LeagueId>>;

/// Player and pick indices for one manager
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Holdings {
    pub players: PlayerIndex,
    pub picks: PickIndex,
}

/// Everything the correlation step reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnershipIndices {
    /// The scanning user's holdings across all of their leagues
    pub user: Holdings,
    /// Each leaguemate's holdings, restricted to shared leagues
    pub leaguemates: BTreeMap<UserId, Holdings>,
    pub shared_leagues: LeaguemateSet,
}

impl OwnershipIndices {
    pub fn is_leaguemate(&self, user_id: &str) -> bool {
        self.shared_leagues.contains_key(user_id)
    }

    pub fn shared_with(&self, user_id: &str) -> Option<&BTreeSet<LeagueId>> {
        self.shared_leagues.get(user_id)
    }

    pub fn holdings_of(&self, user_id: &str) -> Option<&Holdings> {
        self.leaguemates.get(user_id)
    }
}

/// One of the scanning user's leagues, ready for indexing
#[derive(Debug, Clone, Copy)]
pub struct OwnedLeague<'a> {
    pub league_id: &'a str,
    pub rosters: &'a [RosterResponse],
    pub roster_slots: &'a HashMap<RosterId, u32>,
}

/// Builds [`OwnershipIndices`] from the scanning user's leagues
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    user_id: UserId,
    pick_season: String,
    pick_rounds: u8,
}

impl IndexBuilder {
    pub fn new(user_id: impl Into<String>, pick_season: impl Into<String>, pick_rounds: u8) -> Self {
        Self {
            user_id: user_id.into(),
            pick_season: pick_season.into(),
            pick_rounds,
        }
    }

    pub fn build<'a, I>(&self, leagues: I) -> OwnershipIndices
    where
        I: IntoIterator<Item = OwnedLeague<'a>>,
    {
        let mut indices = OwnershipIndices::default();

        for league in leagues {
            for roster in league.rosters {
                let Some(owner) = roster.owner_id.as_deref() else {
                    continue;
                };
                let slot = league.roster_slots.get(&roster.roster_id).copied();

                let holdings = if owner == self.user_id {
                    &mut indices.user
                } else {
                    indices
                        .shared_leagues
                        .entry(owner.to_string())
                        .or_default()
                        .insert(league.league_id.to_string());
                    indices.leaguemates.entry(owner.to_string()).or_default()
                };
                self.index_roster(holdings, league.league_id, roster, slot);
            }
        }

        indices
    }

    fn index_roster(
        &self,
        holdings: &mut Holdings,
        league_id: &str,
        roster: &RosterResponse,
        slot: Option<u32>,
    ) {
        for player in &roster.players {
            holdings.players.insert(player.clone(), league_id);
        }
        if let Some(slot) = slot {
            for round in 1..=self.pick_rounds {
                holdings
                    .picks
                    .insert(PickKey::new(self.pick_season.clone(), round, slot), league_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(id: RosterId, owner: &str, players: &[&str]) -> RosterResponse {
        RosterResponse {
            roster_id: id,
            owner_id: Some(owner.to_string()),
            players: players.iter().map(|p| p.to_string()).collect(),
        }
    }

    struct Fixture {
        l1: Vec<RosterResponse>,
        l2: Vec<RosterResponse>,
        slots1: HashMap<RosterId, u32>,
        slots2: HashMap<RosterId, u32>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                l1: vec![roster(1, "me", &["p1", "p2"]), roster(2, "mate", &["p3"])],
                l2: vec![
                    roster(1, "other", &["p1"]),
                    roster(2, "me", &["p4"]),
                    roster(3, "mate", &["p1"]),
                ],
                slots1: HashMap::from([(1, 5), (2, 9)]),
                slots2: HashMap::new(),
            }
        }

        fn leagues(&self) -> Vec<OwnedLeague<'_>> {
            vec![
                OwnedLeague {
                    league_id: "L1",
                    rosters: &self.l1,
                    roster_slots: &self.slots1,
                },
                OwnedLeague {
                    league_id: "L2",
                    rosters: &self.l2,
                    roster_slots: &self.slots2,
                },
            ]
        }
    }

    #[test]
    fn test_user_and_leaguemate_indices() {
        let fixture = Fixture::new();
        let indices = IndexBuilder::new("me", "2026", 4).build(fixture.leagues());

        let p1 = indices.user.players.leagues(&"p1".to_string()).unwrap();
        assert_eq!(p1.iter().collect::<Vec<_>>(), vec!["L1"]);
        assert!(indices.user.players.contains(&"p4".to_string()));
        assert!(!indices.user.players.contains(&"p3".to_string()));

        assert_eq!(indices.user.picks.len(), 4);
        assert!(indices.user.picks.contains(&PickKey::new("2026", 4, 5)));
        assert!(!indices.user.picks.contains(&PickKey::new("2026", 5, 5)));

        let mate_shared = indices.shared_with("mate").unwrap();
        assert_eq!(mate_shared.len(), 2);
        let mate = indices.holdings_of("mate").unwrap();
        assert!(mate.players.contains(&"p3".to_string()));
        assert!(mate.picks.contains(&PickKey::new("2026", 1, 9)));

        assert_eq!(
            indices.shared_with("other").unwrap().iter().collect::<Vec<_>>(),
            vec!["L2"]
        );
        assert!(!indices.is_leaguemate("me"));
    }

    #[test]
    fn test_ownerless_rosters_are_ignored() {
        let rosters = vec![RosterResponse {
            roster_id: 1,
            owner_id: None,
            players: vec!["p9".into()],
        }];
        let slots = HashMap::new();
        let indices = IndexBuilder::new("me", "2026", 4).build([OwnedLeague {
            league_id: "L1",
            rosters: &rosters,
            roster_slots: &slots,
        }]);
        assert!(indices.shared_leagues.is_empty());
        assert!(indices.user.players.is_empty());
    }

    #[test]
    fn test_build_is_deterministic() {
        let fixture = Fixture::new();
        let builder = IndexBuilder::new("me", "2026", 4);
        let first = builder.build(fixture.leagues());
        let mut reversed = fixture.leagues();
        reversed.reverse();
        let second = builder.build(reversed);
        assert_eq!(first, second);
        assert_eq!(first, builder.build(fixture.leagues()));
    }

    #[test]
    fn test_overlap_is_scoped() {
        let mut index = PlayerIndex::new();
        index.insert("p1".to_string(), "L1");
        index.insert("p1".to_string(), "L3");
        let scope: BTreeSet<LeagueId> = ["L3".to_string(), "L4".to_string()].into();
        assert_eq!(index.overlap(&"p1".to_string(), &scope), vec!["L3".to_string()]);
        assert!(index.overlap(&"p2".to_string(), &scope).is_empty());
    }
}
