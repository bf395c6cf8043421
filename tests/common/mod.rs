//! Common test utilities and fixtures
//!
//! The fixture world: "alice" (u_me) plays in L1 "Home League" with "Mate"
//! (u_mate). Mate also plays in L2 "Away League" against "Xavier" (u_x).
//! Alice owns p1 in L1; Xavier owns p1 in L2.

#![allow(dead_code)]

use leaguemate_mirror::sleeper::SleeperRestClient;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Fake Sleeper API
pub struct SleeperMock {
    pub server: MockServer,
}

impl SleeperMock {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Client pointed at the mock with a short timeout
    pub fn client(&self, timeout: Duration) -> SleeperRestClient {
        SleeperRestClient::with_timeout(&self.server.uri(), "nfl", timeout)
            .expect("Failed to create REST client")
    }

    pub async fn get(&self, route: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn get_expect(&self, route: &str, body: Value, times: u64) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    pub async fn get_delayed(&self, route: &str, body: Value, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(body)
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Number of requests the mock has seen for `route`
    pub async fn hits(&self, route: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == route)
            .count()
    }

    pub async fn status(&self, route: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }
}

/// Epoch ms `days` days ago
pub fn days_ago_ms(days: i64) -> i64 {
    (chrono::Utc::now() - chrono::Duration::days(days)).timestamp_millis()
}

/// Everything except league info, L2 rosters and L2 week-5 transactions
pub async fn mount_world(mock: &SleeperMock) {
    mock.get(
        "/user/alice",
        json!({"user_id": "u_me", "username": "alice", "display_name": "Alice"}),
    )
    .await;
    mock.get(
        "/state/nfl",
        json!({"season": "2025", "week": 5, "season_type": "regular"}),
    )
    .await;
    mock.get(
        "/user/u_me/leagues/nfl/2025",
        json!([{"league_id": "L1", "name": "Home League", "season": "2025"}]),
    )
    .await;
    mock.get(
        "/user/u_mate/leagues/nfl/2025",
        json!([
            {"league_id": "L1", "name": "Home League", "season": "2025"},
            {"league_id": "L2", "name": "Away League", "season": "2025"}
        ]),
    )
    .await;
    mock.get(
        "/players/nfl",
        json!({"p1": {"full_name": "Player One", "position": "WR", "team": "CIN"}}),
    )
    .await;

    mock.get(
        "/league/L1/rosters",
        json!([
            {"roster_id": 1, "owner_id": "u_me", "players": ["p1", "p2"]},
            {"roster_id": 2, "owner_id": "u_mate", "players": ["p9"]}
        ]),
    )
    .await;
    mock.get(
        "/league/L1/users",
        json!([
            {"user_id": "u_me", "display_name": "Alice"},
            {"user_id": "u_mate", "display_name": "Mate"}
        ]),
    )
    .await;
    mock.get("/league/L1/drafts", json!([{"draft_id": "D1", "season": "2026"}]))
        .await;
    mock.get(
        "/draft/D1",
        json!({"draft_id": "D1", "draft_order": {"u_me": 1, "u_mate": 2}}),
    )
    .await;

    mock.get(
        "/league/L2/users",
        json!([
            {"user_id": "u_mate", "display_name": "Mate"},
            {"user_id": "u_x", "display_name": "Xavier"}
        ]),
    )
    .await;

    mock.get("/league/L1/transactions/5", json!([])).await;
    mock.get("/league/L1/transactions/4", json!([])).await;
    mock.get("/league/L2/transactions/4", json!([])).await;
}

pub fn league_one() -> Value {
    json!({"league_id": "L1", "name": "Home League", "season": "2025"})
}

pub fn league_two() -> Value {
    json!({"league_id": "L2", "name": "Away League", "season": "2025"})
}

/// Mate on roster 1, Xavier (holding p1) on roster 2
pub fn away_rosters() -> Value {
    json!([
        {"roster_id": 1, "owner_id": "u_mate", "players": ["p9"]},
        {"roster_id": 2, "owner_id": "u_x", "players": ["p1"]}
    ])
}

/// League info for L1 and L2
pub async fn mount_league_info(mock: &SleeperMock) {
    mock.get("/league/L1", league_one()).await;
    mock.get("/league/L2", league_two()).await;
}

/// Mate trades for p1 in L2, plus noise that must be filtered out
pub fn mirror_trade_batch() -> Value {
    json!([
        {
            "transaction_id": "t-mirror",
            "type": "trade",
            "status": "complete",
            "status_updated": days_ago_ms(1),
            "adds": {"p1": 1},
            "drops": {"p1": 2},
            "draft_picks": [],
            "waiver_budget": []
        },
        {
            "transaction_id": "t-old",
            "type": "trade",
            "status": "complete",
            "status_updated": days_ago_ms(20),
            "adds": {"p1": 1},
            "drops": {"p1": 2},
            "draft_picks": [],
            "waiver_budget": []
        },
        {
            "transaction_id": "t-waiver",
            "type": "waiver",
            "status": "complete",
            "status_updated": days_ago_ms(1),
            "adds": {"p1": 1},
            "drops": null
        }
    ])
}
