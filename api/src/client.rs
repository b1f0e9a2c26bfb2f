use crate::lineup::{SquadPlayer, TeamLineup};
use crate::wire::{
    ApiEnvelope, CheerMeterWire, GeneralInfoWire, GoalScorerWire, LiveFixtureWire, PlayerWire,
    PotmVote, ResultWire, ScoreWire, StatisticsWire, StatusUpdate, SubstitutionWire, TeamStatsWire,
    TeamWire, TimelineEventWire,
};
use crate::{
    CheerMeter, GeneralInfo, GoalScorer, LiveFixture, MatchResult, MatchStatistics, MatchStatus,
    NewGoal, NewSubstitution, NewTimelineEvent, Substitution, TeamRef, TeamSide, TeamStats,
    TimelineEvent, TimelineKind,
};
use chrono::Utc;
use log::debug;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:4000/api";

/// Client for the sports-management REST API.
#[derive(Debug, Clone)]
pub struct MatchdayApi {
    client: Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl Default for MatchdayApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(u16, String),
    Parsing(serde_json::Error, String),
    NotFound(String),
    /// The API answered `success: false`; carries its message.
    Rejected(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(status, url) => write!(f, "API error for {url}: HTTP {status}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Rejected(msg) => write!(f, "{msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl MatchdayApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent("matchday/0.1 (terminal live fixture client)")
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token: None,
            timeout: Duration::from_secs(10),
        }
    }

    /// Attach a bearer token to every request. Empty tokens are ignored.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.trim().is_empty()).then_some(token);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the full live-fixture snapshot.
    pub async fn fetch_live_fixture(&self, fixture_id: &str) -> ApiResult<LiveFixture> {
        let url = self.fixture_url(fixture_id, "");
        let raw: Option<LiveFixtureWire> = self.send(self.client.get(&url), &url).await?;
        raw.map(|w| map_live_fixture(w, fixture_id))
            .ok_or_else(|| ApiError::NotFound(format!("live fixture {fixture_id}")))
    }

    /// Fetch the players registered to a team, for the lineup builder pool.
    pub async fn fetch_team_players(&self, team_id: &str) -> ApiResult<Vec<SquadPlayer>> {
        let url = format!("{}/teams/{team_id}/players", self.base_url);
        let raw: Option<Vec<PlayerWire>> = self.send(self.client.get(&url), &url).await?;
        Ok(raw.unwrap_or_default().into_iter().map(map_player).collect())
    }

    pub async fn update_status(&self, fixture_id: &str, status: MatchStatus) -> ApiResult<Option<LiveFixture>> {
        let url = self.fixture_url(fixture_id, "/status");
        let body = StatusUpdate { status: status.as_str() };
        self.mutate(fixture_id, self.client.patch(&url).json(&body), &url).await
    }

    pub async fn update_score(&self, fixture_id: &str, home: u16, away: u16) -> ApiResult<Option<LiveFixture>> {
        let url = self.fixture_url(fixture_id, "/score");
        let body = ScoreWire { home_score: home, away_score: away };
        self.mutate(fixture_id, self.client.patch(&url).json(&body), &url).await
    }

    pub async fn add_goal_scorer(&self, fixture_id: &str, goal: &NewGoal) -> ApiResult<Option<LiveFixture>> {
        let url = self.fixture_url(fixture_id, "/goal-scorers");
        self.mutate(fixture_id, self.client.post(&url).json(goal), &url).await
    }

    pub async fn add_timeline_event(
        &self,
        fixture_id: &str,
        event: &NewTimelineEvent,
    ) -> ApiResult<Option<LiveFixture>> {
        let url = self.fixture_url(fixture_id, "/timeline");
        self.mutate(fixture_id, self.client.post(&url).json(event), &url).await
    }

    pub async fn add_substitution(
        &self,
        fixture_id: &str,
        substitution: &NewSubstitution,
    ) -> ApiResult<Option<LiveFixture>> {
        let url = self.fixture_url(fixture_id, "/substitutions");
        self.mutate(fixture_id, self.client.post(&url).json(substitution), &url).await
    }

    pub async fn delete_goal(&self, fixture_id: &str, goal_id: &str) -> ApiResult<Option<LiveFixture>> {
        let url = self.fixture_url(fixture_id, &format!("/goal-scorers/{goal_id}"));
        self.mutate(fixture_id, self.client.delete(&url), &url).await
    }

    pub async fn delete_timeline_event(&self, fixture_id: &str, event_id: &str) -> ApiResult<Option<LiveFixture>> {
        let url = self.fixture_url(fixture_id, &format!("/timeline/{event_id}"));
        self.mutate(fixture_id, self.client.delete(&url), &url).await
    }

    pub async fn delete_substitution(
        &self,
        fixture_id: &str,
        substitution_id: &str,
    ) -> ApiResult<Option<LiveFixture>> {
        let url = self.fixture_url(fixture_id, &format!("/substitutions/{substitution_id}"));
        self.mutate(fixture_id, self.client.delete(&url), &url).await
    }

    pub async fn set_team_lineup(&self, fixture_id: &str, lineup: &TeamLineup) -> ApiResult<Option<LiveFixture>> {
        let url = self.fixture_url(fixture_id, "/lineup");
        self.mutate(fixture_id, self.client.put(&url).json(lineup), &url).await
    }

    /// Cast a player-of-the-match vote. Returns the API's confirmation message.
    pub async fn vote_player_of_match(&self, fixture_id: &str, player_id: &str) -> ApiResult<Option<String>> {
        let url = self.fixture_url(fixture_id, "/potm-votes");
        let body = PotmVote { player_id };
        let envelope = self
            .envelope::<serde_json::Value>(self.client.post(&url).json(&body), &url)
            .await?;
        Ok(envelope.message)
    }

    fn fixture_url(&self, fixture_id: &str, suffix: &str) -> String {
        format!("{}/live-fixtures/{fixture_id}{suffix}", self.base_url)
    }

    /// Mutations answer with the authoritative snapshot when they have one.
    async fn mutate(
        &self,
        fixture_id: &str,
        request: RequestBuilder,
        url: &str,
    ) -> ApiResult<Option<LiveFixture>> {
        let raw: Option<LiveFixtureWire> = self.send(request, url).await?;
        Ok(raw.map(|w| map_live_fixture(w, fixture_id)))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> ApiResult<Option<T>> {
        Ok(self.envelope(request, url).await?.data)
    }

    async fn envelope<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> ApiResult<ApiEnvelope<T>> {
        let mut request = request.timeout(self.timeout);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;
        debug!("{url} answered HTTP {}", status.as_u16());

        // Error statuses usually still carry an envelope with a message.
        let envelope: ApiEnvelope<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(ApiError::Parsing(e, url.to_owned())),
            Err(_) if status.as_u16() == 404 => return Err(ApiError::NotFound(url.to_owned())),
            Err(_) => return Err(ApiError::Api(status.as_u16(), url.to_owned())),
        };

        if !envelope.success {
            return Err(ApiError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| format!("request to {url} was rejected")),
            ));
        }
        Ok(envelope)
    }
}

// ---------------------------------------------------------------------------
// Mapping: backend wire types → clean domain types
// ---------------------------------------------------------------------------

fn map_live_fixture(raw: LiveFixtureWire, fixture_id: &str) -> LiveFixture {
    LiveFixture {
        id: raw.id.unwrap_or_else(|| fixture_id.to_owned()),
        home: raw.home_team.map(map_team).unwrap_or_default(),
        away: raw.away_team.map(map_team).unwrap_or_default(),
        status: raw.status.as_deref().map(MatchStatus::parse),
        current_minute: raw.current_minute,
        injury_time: raw.injury_time,
        result: raw.result.map(map_result),
        statistics: raw.statistics.map(map_statistics),
        cheer_meter: raw.cheer_meter.map(map_cheer_meter),
        timeline: map_timeline(raw.timeline.unwrap_or_default()),
        goal_scorers: map_goal_scorers(raw.goal_scorers.unwrap_or_default()),
        substitutions: map_substitutions(raw.substitutions.unwrap_or_default()),
        general_info: raw.general_info.map(map_general_info).unwrap_or_default(),
        live_watchers: raw.live_watchers,
    }
}

fn map_team(t: TeamWire) -> TeamRef {
    let name = t.name.unwrap_or_default();
    TeamRef {
        id: t.id.unwrap_or_default(),
        short_name: t.short_name.unwrap_or_else(|| short_name_from(&name)),
        name,
    }
}

/// "Faculty of Engineering" -> "FOE"; single words keep their first three letters.
fn short_name_from(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    if words.len() > 1 {
        words
            .iter()
            .filter_map(|w| w.chars().next())
            .take(4)
            .collect::<String>()
            .to_uppercase()
    } else {
        name.chars().take(3).collect::<String>().to_uppercase()
    }
}

fn map_result(r: ResultWire) -> MatchResult {
    MatchResult {
        home_score: r.home_score.unwrap_or_default(),
        away_score: r.away_score.unwrap_or_default(),
        halftime_home_score: r.halftime_home_score,
        halftime_away_score: r.halftime_away_score,
    }
}

pub(crate) fn map_statistics(s: StatisticsWire) -> MatchStatistics {
    MatchStatistics {
        home: s.home.map(map_team_stats).unwrap_or_default(),
        away: s.away.map(map_team_stats).unwrap_or_default(),
    }
}

fn map_team_stats(s: TeamStatsWire) -> TeamStats {
    TeamStats {
        possession_time: s.possession_time.unwrap_or_default(),
        shots: s.shots.unwrap_or_default(),
        shots_on_target: s.shots_on_target.unwrap_or_default(),
        corners: s.corners.unwrap_or_default(),
        fouls: s.fouls.unwrap_or_default(),
        yellow_cards: s.yellow_cards.unwrap_or_default(),
        red_cards: s.red_cards.unwrap_or_default(),
        offsides: s.offsides.unwrap_or_default(),
        saves: s.saves.unwrap_or_default(),
    }
}

pub(crate) fn map_cheer_meter(c: CheerMeterWire) -> CheerMeter {
    CheerMeter {
        home: c.home.unwrap_or_default(),
        away: c.away.unwrap_or_default(),
    }
}

pub(crate) fn map_general_info(g: GeneralInfoWire) -> GeneralInfo {
    let kickoff_time = g
        .kickoff_time
        .as_deref()
        .and_then(|d| chrono::DateTime::parse_from_rfc3339(d).ok())
        .map(|dt| dt.with_timezone(&Utc));

    GeneralInfo {
        referee: g.referee.filter(|s| !s.trim().is_empty()),
        kickoff_time,
        weather: g.weather.filter(|s| !s.trim().is_empty()),
        venue: g.venue.filter(|s| !s.trim().is_empty()),
    }
}

pub(crate) fn map_timeline(events: Vec<TimelineEventWire>) -> Vec<TimelineEvent> {
    let mut timeline: Vec<TimelineEvent> = events
        .into_iter()
        .map(|e| TimelineEvent {
            id: e.id.unwrap_or_default(),
            minute: e.minute.unwrap_or_default(),
            kind: e.kind.as_deref().map(TimelineKind::parse).unwrap_or_default(),
            team: e.team.as_deref().and_then(TeamSide::parse),
            player_name: e.player_name,
            description: e.description.unwrap_or_default(),
        })
        .collect();
    timeline.sort_by_key(|e| e.minute);
    timeline
}

pub(crate) fn map_goal_scorers(goals: Vec<GoalScorerWire>) -> Vec<GoalScorer> {
    let mut scorers: Vec<GoalScorer> = goals
        .into_iter()
        .map(|g| GoalScorer {
            id: g.id.unwrap_or_default(),
            player_id: g.player_id.unwrap_or_default(),
            player_name: g.player_name.unwrap_or_else(|| "Unknown".into()),
            team: g.team.as_deref().and_then(TeamSide::parse).unwrap_or_default(),
            minute: g.minute.unwrap_or_default(),
            own_goal: g.is_own_goal.unwrap_or(false),
            penalty: g.is_penalty.unwrap_or(false),
        })
        .collect();
    scorers.sort_by_key(|g| g.minute);
    scorers
}

pub(crate) fn map_substitutions(subs: Vec<SubstitutionWire>) -> Vec<Substitution> {
    let mut substitutions: Vec<Substitution> = subs
        .into_iter()
        .map(|s| Substitution {
            id: s.id.unwrap_or_default(),
            team: s.team.as_deref().and_then(TeamSide::parse).unwrap_or_default(),
            player_out_id: s.player_out_id.unwrap_or_default(),
            player_out_name: s.player_out_name.unwrap_or_default(),
            player_in_id: s.player_in_id.unwrap_or_default(),
            player_in_name: s.player_in_name.unwrap_or_default(),
            minute: s.minute.unwrap_or_default(),
        })
        .collect();
    substitutions.sort_by_key(|s| s.minute);
    substitutions
}

fn map_player(p: PlayerWire) -> SquadPlayer {
    SquadPlayer {
        id: p.id.unwrap_or_default(),
        name: p.name.unwrap_or_default(),
        position_code: p.position.unwrap_or_default().to_ascii_uppercase(),
        jersey_number: p.jersey_number.unwrap_or_default(),
        is_captain: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineup::Roster;
    use mockito::Matcher;

    const SNAPSHOT: &str = r#"{
        "success": true,
        "data": {
            "_id": "fx-1",
            "homeTeam": { "_id": "t-eng", "name": "Faculty of Engineering" },
            "awayTeam": { "_id": "t-law", "name": "Law", "shortName": "LAW" },
            "status": "second_half",
            "currentMinute": 63,
            "injuryTime": 0,
            "result": { "homeScore": 2, "awayScore": 1, "halftimeHomeScore": 1, "halftimeAwayScore": 1 },
            "statistics": {
                "home": { "possessionTime": 1800, "shots": 9, "shotsOnTarget": 4, "corners": 3 },
                "away": { "possessionTime": 1200, "shots": 5 }
            },
            "cheerMeter": { "home": 120, "away": 80 },
            "timeline": [
                { "_id": "e2", "minute": 40, "type": "yellow_card", "team": "away", "description": "Late tackle" },
                { "_id": "e1", "minute": 12, "type": "goal", "team": "home", "playerName": "Okafor" }
            ],
            "goalScorers": [
                { "_id": "g1", "playerId": "p9", "playerName": "Okafor", "team": "home", "minute": 12 }
            ],
            "generalInfo": { "referee": "A. Mensah", "kickoffTime": "2026-10-19T15:00:00Z", "weather": "" },
            "liveWatchers": 42
        }
    }"#;

    #[tokio::test]
    async fn fetch_live_fixture_maps_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/live-fixtures/fx-1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SNAPSHOT)
            .create_async()
            .await;

        let api = MatchdayApi::new(server.url());
        let fixture = api.fetch_live_fixture("fx-1").await.unwrap();
        mock.assert_async().await;

        assert_eq!(fixture.id, "fx-1");
        assert_eq!(fixture.home.short_name, "FOE");
        assert_eq!(fixture.away.short_name, "LAW");
        assert_eq!(fixture.status, Some(MatchStatus::SecondHalf));
        assert_eq!(fixture.current_minute, Some(63));
        assert_eq!(fixture.result.map(|r| (r.home_score, r.away_score)), Some((2, 1)));
        let stats = fixture.statistics.unwrap();
        assert_eq!(stats.home.possession_time, 1800);
        assert_eq!(stats.away.shots_on_target, 0);
        assert_eq!(fixture.timeline.first().map(|e| e.kind), Some(TimelineKind::Goal));
        assert_eq!(fixture.goal_scorers[0].team, TeamSide::Home);
        assert_eq!(fixture.general_info.referee.as_deref(), Some("A. Mensah"));
        assert!(fixture.general_info.weather.is_none(), "blank weather should be dropped");
        assert!(fixture.general_info.kickoff_time.is_some());
        assert_eq!(fixture.live_watchers, Some(42));
    }

    #[tokio::test]
    async fn unsuccessful_envelope_becomes_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/live-fixtures/fx-1")
            .with_status(200)
            .with_body(r#"{ "success": false, "message": "Live fixture not started" }"#)
            .create_async()
            .await;

        let err = MatchdayApi::new(server.url())
            .fetch_live_fixture("fx-1")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref m) if m == "Live fixture not started"));
        assert_eq!(err.to_string(), "Live fixture not started");
    }

    #[tokio::test]
    async fn error_status_without_envelope_maps_by_code() {
        let mut server = mockito::Server::new_async().await;
        let _missing = server
            .mock("GET", "/live-fixtures/gone")
            .with_status(404)
            .with_body("Not Found")
            .create_async()
            .await;
        let _broken = server
            .mock("GET", "/live-fixtures/boom")
            .with_status(502)
            .with_body("<html>bad gateway</html>")
            .create_async()
            .await;

        let api = MatchdayApi::new(server.url());
        assert!(matches!(api.fetch_live_fixture("gone").await, Err(ApiError::NotFound(_))));
        assert!(matches!(api.fetch_live_fixture("boom").await, Err(ApiError::Api(502, _))));
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/live-fixtures/fx-1")
            .with_status(200)
            .with_body("{ not json")
            .create_async()
            .await;

        let err = MatchdayApi::new(server.url())
            .fetch_live_fixture("fx-1")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Parsing(..)));
    }

    #[tokio::test]
    async fn update_score_sends_body_and_returns_new_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/live-fixtures/fx-1/score")
            .match_header("authorization", "Bearer s3cret")
            .match_body(Matcher::Json(serde_json::json!({ "homeScore": 3, "awayScore": 1 })))
            .with_status(200)
            .with_body(SNAPSHOT)
            .create_async()
            .await;

        let api = MatchdayApi::new(format!("{}/", server.url())).with_token("s3cret");
        let fixture = api.update_score("fx-1", 3, 1).await.unwrap();
        mock.assert_async().await;
        assert_eq!(fixture.map(|f| f.id), Some("fx-1".to_string()));
    }

    #[tokio::test]
    async fn mutation_without_data_returns_none() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/live-fixtures/fx-1/goal-scorers/g1")
            .with_status(200)
            .with_body(r#"{ "success": true, "message": "Goal removed" }"#)
            .create_async()
            .await;

        let result = MatchdayApi::new(server.url()).delete_goal("fx-1", "g1").await.unwrap();
        mock.assert_async().await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn update_status_uses_wire_value() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/live-fixtures/fx-1/status")
            .match_body(Matcher::Json(serde_json::json!({ "status": "half_time" })))
            .with_status(200)
            .with_body(r#"{ "success": true }"#)
            .create_async()
            .await;

        MatchdayApi::new(server.url())
            .update_status("fx-1", MatchStatus::HalfTime)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn set_team_lineup_puts_submission() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/live-fixtures/fx-1/lineup")
            .match_body(Matcher::PartialJson(serde_json::json!({ "teamId": "t-eng", "formation": "4-4-2" })))
            .with_status(200)
            .with_body(r#"{ "success": true, "message": "Lineup saved" }"#)
            .create_async()
            .await;

        let lineup = TeamLineup {
            team_id: "t-eng".into(),
            formation: "4-4-2".into(),
            starting_xi: vec![],
            substitutes: vec![],
        };
        MatchdayApi::new(server.url())
            .set_team_lineup("fx-1", &lineup)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn fetch_team_players_feeds_a_roster_pool() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/teams/t-eng/players")
            .with_status(200)
            .with_body(
                r#"{ "success": true, "data": [
                    { "_id": "p9", "name": "Okafor", "position": "st", "jerseyNumber": 9 },
                    { "_id": "p1", "name": "Bello", "position": "GK", "jerseyNumber": 1 }
                ] }"#,
            )
            .create_async()
            .await;

        let players = MatchdayApi::new(server.url()).fetch_team_players("t-eng").await.unwrap();
        assert_eq!(players[0].position_code, "ST");

        let roster = Roster::new(players);
        assert_eq!(roster.available[0].id, "p1", "pool is ordered by jersey number");
    }

    #[tokio::test]
    async fn potm_vote_returns_confirmation() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/live-fixtures/fx-1/potm-votes")
            .match_body(Matcher::Json(serde_json::json!({ "playerId": "p9" })))
            .with_status(201)
            .with_body(r#"{ "success": true, "message": "Vote recorded" }"#)
            .create_async()
            .await;

        let message = MatchdayApi::new(server.url())
            .vote_player_of_match("fx-1", "p9")
            .await
            .unwrap();
        assert_eq!(message.as_deref(), Some("Vote recorded"));
    }

    #[test]
    fn short_name_falls_back_to_initials() {
        assert_eq!(short_name_from("Faculty of Engineering"), "FOE");
        assert_eq!(short_name_from("Medicine"), "MED");
        assert_eq!(short_name_from(""), "");
    }

    #[test]
    fn timeline_is_sorted_by_minute() {
        let timeline = map_timeline(vec![
            TimelineEventWire { minute: Some(70), ..Default::default() },
            TimelineEventWire { minute: Some(5), kind: Some("red".into()), ..Default::default() },
        ]);
        assert_eq!(timeline[0].minute, 5);
        assert_eq!(timeline[0].kind, TimelineKind::RedCard);
        assert_eq!(timeline[1].kind, TimelineKind::Other);
    }
}
