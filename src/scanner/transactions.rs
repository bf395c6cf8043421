//! Recent trade retrieval across discovered leagues

use chrono::{DateTime, Duration, Utc};
use futures_util::future::join_all;
use std::collections::BTreeSet;
use tracing::info;

use crate::common::types::LeagueId;
use crate::sleeper::messages::TransactionResponse;
use crate::sleeper::SleeperRestClient;

/// Weeks to scan: the current one and the one before it
pub fn weeks_to_scan(current_week: u32) -> Vec<u32> {
    if current_week > 1 {
        vec![current_week, current_week - 1]
    } else {
        vec![1]
    }
}

/// Oldest `status_updated` (epoch ms) still inside the lookback window
pub fn lookback_cutoff_ms(now: DateTime<Utc>, lookback_days: u32) -> i64 {
    (now - Duration::days(i64::from(lookback_days))).timestamp_millis()
}

/// Transactions of one league for one week
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBatch {
    pub league_id: LeagueId,
    pub week: u32,
    /// `None` when the league could not be reached
    pub transactions: Option<Vec<TransactionResponse>>,
}

impl TransactionBatch {
    /// Trades inside the window
    pub fn candidates(&self, cutoff_ms: i64) -> impl Iterator<Item = &TransactionResponse> {
        self.transactions
            .iter()
            .flatten()
            .filter(move |txn| is_candidate(txn, cutoff_ms))
    }

    pub fn is_missing(&self) -> bool {
        self.transactions.is_none()
    }
}

pub fn is_candidate(txn: &TransactionResponse, cutoff_ms: i64) -> bool {
    txn.is_trade() && txn.status_updated >= cutoff_ms
}

/// One request per (league, week); results keep request order
pub async fn fetch_batches(
    client: &SleeperRestClient,
    leagues: &BTreeSet<LeagueId>,
    weeks: &[u32],
) -> Vec<TransactionBatch> {
    let plan: Vec<(&LeagueId, u32)> = leagues
        .iter()
        .flat_map(|league| weeks.iter().map(move |week| (league, *week)))
        .collect();

    let responses = join_all(
        plan.iter()
            .map(|(league, week)| client.get_transactions(league, *week)),
    )
    .await;

    let batches: Vec<TransactionBatch> = plan
        .into_iter()
        .zip(responses)
        .map(|((league, week), transactions)| TransactionBatch {
            league_id: league.clone(),
            week,
            transactions,
        })
        .collect();

    let missing = batches.iter().filter(|b| b.is_missing()).count();
    info!(
        "Fetched {} transaction batches ({} unavailable)",
        batches.len(),
        missing
    );
    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn txn(kind: &str, status_updated: i64) -> TransactionResponse {
        TransactionResponse {
            transaction_id: None,
            kind: kind.into(),
            status: Some("complete".into()),
            status_updated,
            adds: Default::default(),
            drops: Default::default(),
            draft_picks: vec![],
            waiver_budget: vec![],
        }
    }

    #[test]
    fn test_weeks_to_scan() {
        assert_eq!(weeks_to_scan(7), vec![7, 6]);
        assert_eq!(weeks_to_scan(1), vec![1]);
        assert_eq!(weeks_to_scan(0), vec![1]);
    }

    #[test]
    fn test_cutoff() {
        let now = Utc.with_ymd_and_hms(2025, 10, 15, 0, 0, 0).unwrap();
        let cutoff = lookback_cutoff_ms(now, 14);
        let expected = Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap();
        assert_eq!(cutoff, expected.timestamp_millis());
    }

    #[test]
    fn test_candidates_filter_type_and_age() {
        let batch = TransactionBatch {
            league_id: "L1".into(),
            week: 3,
            transactions: Some(vec![
                txn("trade", 2_000),
                txn("waiver", 3_000),
                txn("trade", 500),
                txn("free_agent", 4_000),
            ]),
        };
        let kept: Vec<_> = batch.candidates(1_000).collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].status_updated, 2_000);
    }

    #[test]
    fn test_missing_batch_has_no_candidates() {
        let batch = TransactionBatch {
            league_id: "L1".into(),
            week: 3,
            transactions: None,
        };
        assert!(batch.is_missing());
        assert_eq!(batch.candidates(0).count(), 0);
    }
}
