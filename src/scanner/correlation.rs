//! Turns a single trade into a tagged mirror trade, or nothing
//!
//! A player added by leaguemate M is a sell signal when the scanning user
//! owns that player in a league shared with M. A player dropped by M is a
//! buy signal when M also holds that player in a league shared with the
//! user. Pick and FAAB movements are always recorded; picks are only tagged
//! when pick correlation is switched on.

use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};

use crate::common::types::{
    Asset, AssetMove, LeagueId, ManagerMoves, MirrorTrade, OpportunityTag, PickKey, RosterId,
    TagKind, UserId, TIME_FORMAT,
};
use crate::scanner::cache::LeagueContext;
use crate::scanner::ownership::{OwnershipIndex, OwnershipIndices};
use crate::scanner::players::PlayerDirectory;
use crate::sleeper::messages::TransactionResponse;

/// Read-only view over everything a correlation needs
#[derive(Debug, Clone, Copy)]
pub struct Correlator<'a> {
    pub indices: &'a OwnershipIndices,
    /// Names of the scanning user's leagues, used for justifications
    pub league_names: &'a HashMap<LeagueId, String>,
    pub players: &'a PlayerDirectory,
    pub pick_season: &'a str,
    pub correlate_picks: bool,
}

impl<'a> Correlator<'a> {
    /// Analyze one trade from the league described by `ctx`
    pub fn correlate(&self, ctx: &LeagueContext, txn: &TransactionResponse) -> Option<MirrorTrade> {
        let mut moves = MoveTable::collect(ctx, txn);
        if moves.is_empty() {
            return None;
        }

        for (player_id, roster) in &txn.adds {
            let Some(manager) = ctx.manager_of(*roster) else {
                continue;
            };
            let tag = self.sell_tag(&self.indices.user.players, player_id, manager);
            moves.record_add(
                manager,
                AssetMove {
                    asset: Asset::player(player_id.clone()),
                    label: self.players.label(player_id),
                    tag,
                },
            );
        }

        for (player_id, roster) in &txn.drops {
            let Some(manager) = ctx.manager_of(*roster) else {
                continue;
            };
            let tag = self
                .indices
                .holdings_of(manager)
                .and_then(|h| self.buy_tag(&h.players, player_id, manager));
            moves.record_drop(
                manager,
                AssetMove {
                    asset: Asset::player(player_id.clone()),
                    label: self.players.label(player_id),
                    tag,
                },
            );
        }

        for pick in &txn.draft_picks {
            let slot = ctx.slot_of(pick.roster_id);
            let asset = Asset::DraftPick {
                season: pick.season.clone(),
                round: pick.round,
                slot,
            };
            let label = asset.default_label(self.pick_season);
            let key = match slot {
                Some(slot) if self.correlate_picks && pick.season == self.pick_season => {
                    Some(PickKey::new(pick.season.clone(), pick.round, slot))
                }
                _ => None,
            };

            if let Some(receiver) = pick.owner_id.and_then(|r| ctx.manager_of(r)) {
                let tag = key
                    .as_ref()
                    .and_then(|k| self.sell_tag(&self.indices.user.picks, k, receiver));
                moves.record_add(
                    receiver,
                    AssetMove {
                        asset: asset.clone(),
                        label: label.clone(),
                        tag,
                    },
                );
            }
            if let Some(giver) = pick.previous_owner_id.and_then(|r| ctx.manager_of(r)) {
                let tag = key.as_ref().and_then(|k| {
                    self.indices
                        .holdings_of(giver)
                        .and_then(|h| self.buy_tag(&h.picks, k, giver))
                });
                moves.record_drop(giver, AssetMove { asset, label, tag });
            }
        }

        for budget in &txn.waiver_budget {
            let asset = Asset::WaiverBudget {
                amount: budget.amount,
            };
            let label = asset.default_label(self.pick_season);
            if let Some(receiver) = ctx.manager_of(budget.receiver) {
                moves.record_add(receiver, AssetMove::untagged(asset.clone(), label.clone()));
            }
            if let Some(sender) = ctx.manager_of(budget.sender) {
                moves.record_drop(sender, AssetMove::untagged(asset, label));
            }
        }

        if !moves.has_tag() {
            return None;
        }

        let timestamp = DateTime::<Utc>::from_timestamp_millis(txn.status_updated)
            .unwrap_or_default();
        Some(MirrorTrade {
            league_id: ctx.league_id.clone(),
            league_name: ctx.name.clone(),
            transaction_id: txn.transaction_id.clone(),
            timestamp,
            time: timestamp.format(TIME_FORMAT).to_string(),
            managers: moves.into_managers(),
        })
    }

    /// `manager` is acquiring something the user holds in a shared league
    fn sell_tag<K: Ord>(
        &self,
        user_index: &OwnershipIndex<K>,
        key: &K,
        manager: &str,
    ) -> Option<OpportunityTag> {
        let shared = self.indices.shared_with(manager)?;
        self.tag(TagKind::Sell, user_index, key, shared)
    }

    /// `manager` is shedding something they co-own with the user
    fn buy_tag<K: Ord>(
        &self,
        manager_index: &OwnershipIndex<K>,
        key: &K,
        manager: &str,
    ) -> Option<OpportunityTag> {
        let shared = self.indices.shared_with(manager)?;
        self.tag(TagKind::Buy, manager_index, key, shared)
    }

    fn tag<K: Ord>(
        &self,
        kind: TagKind,
        index: &OwnershipIndex<K>,
        key: &K,
        shared: &BTreeSet<LeagueId>,
    ) -> Option<OpportunityTag> {
        let overlap = index.overlap(key, shared);
        if overlap.is_empty() {
            return None;
        }
        let leagues = overlap
            .into_iter()
            .map(|id| self.league_names.get(&id).cloned().unwrap_or(id))
            .collect();
        Some(OpportunityTag { kind, leagues })
    }
}

/// Per-manager movement records, in roster order
struct MoveTable {
    managers: Vec<ManagerMoves>,
}

impl MoveTable {
    /// One empty record per resolvable manager referenced by the trade
    fn collect(ctx: &LeagueContext, txn: &TransactionResponse) -> Self {
        let mut rosters: BTreeSet<RosterId> = BTreeSet::new();
        rosters.extend(txn.adds.values().copied());
        rosters.extend(txn.drops.values().copied());
        for pick in &txn.draft_picks {
            rosters.extend(pick.owner_id);
            rosters.extend(pick.previous_owner_id);
        }
        for budget in &txn.waiver_budget {
            rosters.insert(budget.sender);
            rosters.insert(budget.receiver);
        }

        let mut managers: Vec<ManagerMoves> = Vec::new();
        for roster in rosters {
            let Some(manager) = ctx.manager_of(roster) else {
                continue;
            };
            if managers.iter().all(|m| &m.manager_id != manager) {
                managers.push(ManagerMoves::new(manager.clone(), ctx.manager_name(manager)));
            }
        }
        Self { managers }
    }

    fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }

    fn entry(&mut self, manager: &UserId) -> Option<&mut ManagerMoves> {
        self.managers.iter_mut().find(|m| &m.manager_id == manager)
    }

    fn record_add(&mut self, manager: &UserId, item: AssetMove) {
        if let Some(entry) = self.entry(manager) {
            entry.adds.push(item);
        }
    }

    fn record_drop(&mut self, manager: &UserId, item: AssetMove) {
        if let Some(entry) = self.entry(manager) {
            entry.drops.push(item);
        }
    }

    fn has_tag(&self) -> bool {
        self.managers.iter().any(|m| m.tag_count() > 0)
    }

    fn into_managers(self) -> Vec<ManagerMoves> {
        self.managers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::ownership::Holdings;
    use crate::sleeper::messages::{DraftPickTransfer, WaiverBudgetTransfer};
    use std::collections::BTreeMap;

    const TS: i64 = 1_759_752_000_000; // 2025-10-06 12:00 UTC

    fn set(ids: &[&str]) -> BTreeSet<LeagueId> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    /// User "me" owns p1 in L1 and L3; mate "m" shares L1 and L2 and holds p2 in L2
    fn indices() -> OwnershipIndices {
        let mut user = Holdings::default();
        user.players.insert("p1".into(), "L1");
        user.players.insert("p1".into(), "L3");
        user.picks.insert(PickKey::new("2026", 1, 3), "L1");

        let mut mate = Holdings::default();
        mate.players.insert("p2".into(), "L2");
        mate.picks.insert(PickKey::new("2026", 2, 7), "L2");

        OwnershipIndices {
            user,
            leaguemates: BTreeMap::from([("m".to_string(), mate)]),
            shared_leagues: BTreeMap::from([
                ("m".to_string(), set(&["L1", "L2"])),
                ("n".to_string(), set(&["L3"])),
            ]),
        }
    }

    fn names() -> HashMap<LeagueId, String> {
        HashMap::from([
            ("L1".to_string(), "League One".to_string()),
            ("L2".to_string(), "League Two".to_string()),
            ("L3".to_string(), "League Three".to_string()),
        ])
    }

    /// Remote league X: roster 1 = m, roster 2 = z, roster 3 = n, roster 4 = y
    fn remote() -> LeagueContext {
        LeagueContext {
            league_id: "X".into(),
            name: "Remote League".into(),
            season: Some("2025".into()),
            roster_managers: HashMap::from([
                (1, "m".to_string()),
                (2, "z".to_string()),
                (3, "n".to_string()),
                (4, "y".to_string()),
            ]),
            manager_names: HashMap::from([
                ("m".to_string(), "Mate".to_string()),
                ("z".to_string(), "Zed".to_string()),
            ]),
            roster_slots: HashMap::from([(2, 3), (1, 7)]),
        }
    }

    fn trade() -> TransactionResponse {
        TransactionResponse {
            transaction_id: Some("t1".into()),
            kind: "trade".into(),
            status: Some("complete".into()),
            status_updated: TS,
            adds: BTreeMap::new(),
            drops: BTreeMap::new(),
            draft_picks: vec![],
            waiver_budget: vec![],
        }
    }

    fn run(txn: &TransactionResponse, correlate_picks: bool) -> Option<MirrorTrade> {
        let indices = indices();
        let names = names();
        let players: PlayerDirectory =
            [("p1".to_string(), "Player One".to_string())].into_iter().collect();
        Correlator {
            indices: &indices,
            league_names: &names,
            players: &players,
            pick_season: "2026",
            correlate_picks,
        }
        .correlate(&remote(), txn)
    }

    #[test]
    fn test_sell_tag_uses_shared_leagues_only() {
        let mut txn = trade();
        txn.adds.insert("p1".into(), 1);
        txn.drops.insert("p1".into(), 2);

        let mirror = run(&txn, false).expect("sell signal");
        let mate = mirror.manager("m").unwrap();
        assert_eq!(mate.adds.len(), 1);
        assert_eq!(mate.adds[0].label, "Player One");
        let tag = mate.adds[0].tag.as_ref().unwrap();
        assert_eq!(tag.kind, TagKind::Sell);
        // L3 is the user's but not shared with m
        assert_eq!(tag.leagues, vec!["League One".to_string()]);

        let zed = mirror.manager("z").unwrap();
        assert_eq!(zed.drops.len(), 1);
        assert!(zed.drops[0].tag.is_none());
        assert_eq!(mirror.time, "10/06 12:00");
        assert_eq!(mirror.league_name, "Remote League");
    }

    #[test]
    fn test_buy_tag_from_leaguemate_index() {
        let mut txn = trade();
        txn.drops.insert("p2".into(), 1);
        txn.adds.insert("p2".into(), 2);

        let mirror = run(&txn, false).expect("buy signal");
        let tag = mirror.manager("m").unwrap().drops[0].tag.clone().unwrap();
        assert_eq!(tag.kind, TagKind::Buy);
        assert_eq!(tag.leagues, vec!["League Two".to_string()]);
        assert_eq!(mirror.tag_count(), 1);
    }

    #[test]
    fn test_non_leaguemate_acquirer_is_not_tagged() {
        let mut txn = trade();
        txn.adds.insert("p1".into(), 2);
        txn.drops.insert("p1".into(), 4);
        assert!(run(&txn, false).is_none());
    }

    #[test]
    fn test_three_team_trade_without_overlap_is_skipped() {
        let mut txn = trade();
        txn.adds.insert("a".into(), 1);
        txn.adds.insert("b".into(), 2);
        txn.adds.insert("c".into(), 4);
        txn.drops.insert("a".into(), 2);
        txn.drops.insert("b".into(), 4);
        txn.drops.insert("c".into(), 1);
        assert!(run(&txn, false).is_none());
    }

    #[test]
    fn test_pick_and_faab_only_parties_get_records() {
        let mut txn = trade();
        txn.adds.insert("p1".into(), 1);
        txn.drops.insert("p1".into(), 2);
        txn.draft_picks.push(DraftPickTransfer {
            season: "2026".into(),
            round: 1,
            roster_id: 2,
            previous_owner_id: Some(2),
            owner_id: Some(4),
        });
        txn.waiver_budget.push(WaiverBudgetTransfer {
            sender: 4,
            receiver: 3,
            amount: 12,
        });

        let mirror = run(&txn, false).unwrap();
        let ids: Vec<_> = mirror.managers.iter().map(|m| m.manager_id.as_str()).collect();
        assert_eq!(ids, vec!["m", "z", "n", "y"]);

        let y = mirror.manager("y").unwrap();
        assert_eq!(y.adds[0].label, "2026 1.03");
        assert!(y.adds[0].tag.is_none());
        assert_eq!(y.drops[0].label, "$12 FAAB");
        let n = mirror.manager("n").unwrap();
        assert_eq!(n.manager_name, "n");
        assert_eq!(n.adds[0].label, "$12 FAAB");
    }

    #[test]
    fn test_pick_only_trade_is_untagged_by_default() {
        let mut txn = trade();
        txn.draft_picks.push(DraftPickTransfer {
            season: "2026".into(),
            round: 1,
            roster_id: 2,
            previous_owner_id: Some(2),
            owner_id: Some(1),
        });
        assert!(run(&txn, false).is_none());
    }

    #[test]
    fn test_pick_correlation_when_enabled() {
        let mut txn = trade();
        // m receives z's 2026 1st (slot 3), which the user holds in L1
        txn.draft_picks.push(DraftPickTransfer {
            season: "2026".into(),
            round: 1,
            roster_id: 2,
            previous_owner_id: Some(2),
            owner_id: Some(1),
        });
        // m gives away their own 2026 2nd (slot 7), which they hold in L2
        txn.draft_picks.push(DraftPickTransfer {
            season: "2026".into(),
            round: 2,
            roster_id: 1,
            previous_owner_id: Some(1),
            owner_id: Some(2),
        });

        let mirror = run(&txn, true).expect("pick signals");
        let mate = mirror.manager("m").unwrap();
        assert_eq!(mate.adds[0].tag.as_ref().unwrap().kind, TagKind::Sell);
        assert_eq!(mate.drops[0].label, "2026 2.07");
        assert_eq!(mate.drops[0].tag.as_ref().unwrap().kind, TagKind::Buy);
        assert_eq!(mirror.tag_count(), 2);
    }

    #[test]
    fn test_unresolvable_rosters_are_dropped() {
        let mut txn = trade();
        txn.adds.insert("p1".into(), 99);
        txn.drops.insert("p1".into(), 98);
        assert!(run(&txn, false).is_none());
    }
}
