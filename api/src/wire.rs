/// Backend wire types: serde shapes for the REST API and realtime payloads.
/// These map to the clean domain types via the mapping functions in client.rs.
use serde::{Deserialize, Serialize};

/// Every REST response is wrapped in this envelope.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Live fixture snapshot  (GET /live-fixtures/{id})
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LiveFixtureWire {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub home_team: Option<TeamWire>,
    pub away_team: Option<TeamWire>,
    pub status: Option<String>,
    pub current_minute: Option<u16>,
    pub injury_time: Option<u16>,
    pub result: Option<ResultWire>,
    pub statistics: Option<StatisticsWire>,
    pub cheer_meter: Option<CheerMeterWire>,
    pub timeline: Option<Vec<TimelineEventWire>>,
    pub goal_scorers: Option<Vec<GoalScorerWire>>,
    pub substitutions: Option<Vec<SubstitutionWire>>,
    pub general_info: Option<GeneralInfoWire>,
    pub live_watchers: Option<u32>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TeamWire {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub short_name: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ResultWire {
    pub home_score: Option<u16>,
    pub away_score: Option<u16>,
    pub halftime_home_score: Option<u16>,
    pub halftime_away_score: Option<u16>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct StatisticsWire {
    pub home: Option<TeamStatsWire>,
    pub away: Option<TeamStatsWire>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TeamStatsWire {
    pub possession_time: Option<u32>,
    pub shots: Option<u16>,
    pub shots_on_target: Option<u16>,
    pub corners: Option<u16>,
    pub fouls: Option<u16>,
    pub yellow_cards: Option<u16>,
    pub red_cards: Option<u16>,
    pub offsides: Option<u16>,
    pub saves: Option<u16>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct CheerMeterWire {
    pub home: Option<u32>,
    pub away: Option<u32>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GeneralInfoWire {
    pub referee: Option<String>,
    pub kickoff_time: Option<String>, // ISO 8601
    pub weather: Option<String>,
    pub venue: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEventWire {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub minute: Option<u16>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub team: Option<String>, // "home" | "away"
    pub player_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GoalScorerWire {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub player_id: Option<String>,
    pub player_name: Option<String>,
    pub team: Option<String>,
    pub minute: Option<u16>,
    pub is_own_goal: Option<bool>,
    pub is_penalty: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutionWire {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub team: Option<String>,
    pub player_out_id: Option<String>,
    pub player_out_name: Option<String>,
    pub player_in_id: Option<String>,
    pub player_in_name: Option<String>,
    pub minute: Option<u16>,
}

// ---------------------------------------------------------------------------
// Squad players  (GET /teams/{teamId}/players)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlayerWire {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub position: Option<String>, // "CB", "ST", ...
    pub jersey_number: Option<u8>,
}

// ---------------------------------------------------------------------------
// Request bodies that have no domain counterpart
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct StatusUpdate<'a> {
    pub status: &'a str,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct ScoreWire {
    pub home_score: u16,
    pub away_score: u16,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PotmVote<'a> {
    pub player_id: &'a str,
}
