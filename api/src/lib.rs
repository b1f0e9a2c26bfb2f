pub mod client;
pub mod formation;
pub mod lineup;
pub mod realtime;
pub mod reconcile;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain types, independent of the backend wire format
// ---------------------------------------------------------------------------

/// Last known-good state of a live fixture, as returned by the REST API.
///
/// Fields the backend may omit are `Option`s so the reconciler can tell
/// "absent" apart from a real zero and fall through to the template default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveFixture {
    pub id: String,
    pub home: TeamRef,
    pub away: TeamRef,
    pub status: Option<MatchStatus>,
    pub current_minute: Option<u16>,
    pub injury_time: Option<u16>,
    pub result: Option<MatchResult>,
    pub statistics: Option<MatchStatistics>,
    pub cheer_meter: Option<CheerMeter>,
    pub timeline: Vec<TimelineEvent>,
    pub goal_scorers: Vec<GoalScorer>,
    pub substitutions: Vec<Substitution>,
    pub general_info: GeneralInfo,
    pub live_watchers: Option<u32>,
}

impl LiveFixture {
    pub fn team(&self, side: TeamSide) -> &TeamRef {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamRef {
    pub id: String,
    pub name: String,       // "Faculty of Engineering"
    pub short_name: String, // "ENG"
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    #[default]
    Home,
    Away,
}

impl TeamSide {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Some(TeamSide::Home),
            "away" => Some(TeamSide::Away),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamSide::Home => "home",
            TeamSide::Away => "away",
        }
    }

    pub fn other(self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchStatus {
    #[default]
    Scheduled,
    FirstHalf,
    HalfTime,
    SecondHalf,
    ExtraTime,
    Penalties,
    Finished,
    Postponed,
    Cancelled,
}

impl MatchStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "first_half" | "live" | "in_progress" => MatchStatus::FirstHalf,
            "half_time" | "halftime" => MatchStatus::HalfTime,
            "second_half" => MatchStatus::SecondHalf,
            "extra_time" => MatchStatus::ExtraTime,
            "penalties" => MatchStatus::Penalties,
            "finished" | "completed" | "full_time" => MatchStatus::Finished,
            "postponed" => MatchStatus::Postponed,
            "cancelled" | "canceled" => MatchStatus::Cancelled,
            _ => MatchStatus::Scheduled,
        }
    }

    /// Wire value sent back to the API on status updates.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::FirstHalf => "first_half",
            MatchStatus::HalfTime => "half_time",
            MatchStatus::SecondHalf => "second_half",
            MatchStatus::ExtraTime => "extra_time",
            MatchStatus::Penalties => "penalties",
            MatchStatus::Finished => "finished",
            MatchStatus::Postponed => "postponed",
            MatchStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "Scheduled",
            MatchStatus::FirstHalf => "1st Half",
            MatchStatus::HalfTime => "Half Time",
            MatchStatus::SecondHalf => "2nd Half",
            MatchStatus::ExtraTime => "Extra Time",
            MatchStatus::Penalties => "Penalties",
            MatchStatus::Finished => "Full Time",
            MatchStatus::Postponed => "Postponed",
            MatchStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(
            self,
            MatchStatus::FirstHalf
                | MatchStatus::HalfTime
                | MatchStatus::SecondHalf
                | MatchStatus::ExtraTime
                | MatchStatus::Penalties
        )
    }

    /// Next status in the usual match progression, used by the admin
    /// "advance status" action. Terminal states return None.
    pub fn next(self) -> Option<Self> {
        match self {
            MatchStatus::Scheduled => Some(MatchStatus::FirstHalf),
            MatchStatus::FirstHalf => Some(MatchStatus::HalfTime),
            MatchStatus::HalfTime => Some(MatchStatus::SecondHalf),
            MatchStatus::SecondHalf => Some(MatchStatus::Finished),
            MatchStatus::ExtraTime => Some(MatchStatus::Penalties),
            MatchStatus::Penalties => Some(MatchStatus::Finished),
            MatchStatus::Finished | MatchStatus::Postponed | MatchStatus::Cancelled => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub home_score: u16,
    pub away_score: u16,
    pub halftime_home_score: Option<u16>,
    pub halftime_away_score: Option<u16>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub home: u16,
    pub away: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamStats {
    pub possession_time: u32, // seconds with the ball
    pub shots: u16,
    pub shots_on_target: u16,
    pub corners: u16,
    pub fouls: u16,
    pub yellow_cards: u16,
    pub red_cards: u16,
    pub offsides: u16,
    pub saves: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStatistics {
    pub home: TeamStats,
    pub away: TeamStats,
}

/// Fan cheer counters, driven by the realtime channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheerMeter {
    pub home: u32,
    pub away: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneralInfo {
    pub referee: Option<String>,
    pub kickoff_time: Option<DateTime<Utc>>,
    pub weather: Option<String>,
    pub venue: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimelineKind {
    Goal,
    YellowCard,
    RedCard,
    Substitution,
    Injury,
    VarReview,
    #[default]
    Other,
}

impl TimelineKind {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "goal" => TimelineKind::Goal,
            "yellow_card" | "yellow" => TimelineKind::YellowCard,
            "red_card" | "red" => TimelineKind::RedCard,
            "substitution" | "sub" => TimelineKind::Substitution,
            "injury" => TimelineKind::Injury,
            "var" | "var_review" => TimelineKind::VarReview,
            _ => TimelineKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimelineKind::Goal => "goal",
            TimelineKind::YellowCard => "yellow_card",
            TimelineKind::RedCard => "red_card",
            TimelineKind::Substitution => "substitution",
            TimelineKind::Injury => "injury",
            TimelineKind::VarReview => "var",
            TimelineKind::Other => "other",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TimelineKind::Goal => "GOAL",
            TimelineKind::YellowCard => "YC",
            TimelineKind::RedCard => "RC",
            TimelineKind::Substitution => "SUB",
            TimelineKind::Injury => "INJ",
            TimelineKind::VarReview => "VAR",
            TimelineKind::Other => "--",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineEvent {
    pub id: String,
    pub minute: u16,
    pub kind: TimelineKind,
    pub team: Option<TeamSide>,
    pub player_name: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalScorer {
    pub id: String,
    pub player_id: String,
    pub player_name: String,
    pub team: TeamSide,
    pub minute: u16,
    pub own_goal: bool,
    pub penalty: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    pub id: String,
    pub team: TeamSide,
    pub player_out_id: String,
    pub player_out_name: String,
    pub player_in_id: String,
    pub player_in_name: String,
    pub minute: u16,
}

// ---------------------------------------------------------------------------
// Mutation request bodies, serialized as-is by the client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub player_id: String,
    pub team: TeamSide,
    pub minute: u16,
    pub is_own_goal: bool,
    pub is_penalty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimelineEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub minute: u16,
    pub team: Option<TeamSide>,
    pub player_id: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubstitution {
    pub team: TeamSide,
    pub player_out_id: String,
    pub player_in_id: String,
    pub minute: u16,
}
