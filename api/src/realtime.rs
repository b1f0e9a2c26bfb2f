/// Realtime channel frames.
///
/// Every WebSocket text frame is `{ "event": name, "fixtureId": id, "data": payload }`.
/// Inbound events each replace one field of the reconciled view; outbound
/// frames are `subscribe` and `cheer`.
use crate::client::{
    map_cheer_meter, map_general_info, map_goal_scorers, map_statistics, map_substitutions,
    map_timeline,
};
use crate::wire::{
    CheerMeterWire, GeneralInfoWire, GoalScorerWire, ScoreWire, StatisticsWire, SubstitutionWire,
    TimelineEventWire,
};
use crate::{
    CheerMeter, GeneralInfo, GoalScorer, MatchStatistics, MatchStatus, Score, Substitution,
    TeamSide, TimelineEvent,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const EVENT_SUBSCRIBE: &str = "subscribe";
pub const EVENT_CHEER: &str = "cheer";
pub const EVENT_CHEER_METER: &str = "cheerMeter";

#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeEvent {
    Minute(u16),
    InjuryTime(u16),
    Score(Score),
    Status(MatchStatus),
    Statistics(MatchStatistics),
    CheerMeter(CheerMeter),
    GeneralInfo(GeneralInfo),
    Timeline(Vec<TimelineEvent>),
    Substitutions(Vec<Substitution>),
    GoalScorers(Vec<GoalScorer>),
    LiveWatchers(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture_id: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug)]
pub enum FrameError {
    Json(serde_json::Error),
    UnknownEvent(String),
    Payload(String, serde_json::Error),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Json(e) => write!(f, "invalid frame: {e}"),
            FrameError::UnknownEvent(name) => write!(f, "unknown realtime event '{name}'"),
            FrameError::Payload(name, e) => write!(f, "bad payload for '{name}': {e}"),
        }
    }
}

impl std::error::Error for FrameError {}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CheerPayload {
    pub side: TeamSide,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatusPayload {
    Bare(String),
    Wrapped { status: String },
}

impl Frame {
    pub fn decode(text: &str) -> Result<Self, FrameError> {
        serde_json::from_str(text).map_err(FrameError::Json)
    }

    pub fn encode(&self) -> Result<String, FrameError> {
        serde_json::to_string(self).map_err(FrameError::Json)
    }

    pub fn subscribe(fixture_id: &str) -> Self {
        Self {
            event: EVENT_SUBSCRIBE.into(),
            fixture_id: Some(fixture_id.into()),
            data: serde_json::Value::Null,
        }
    }

    pub fn cheer(fixture_id: &str, side: TeamSide) -> Self {
        Self {
            event: EVENT_CHEER.into(),
            fixture_id: Some(fixture_id.into()),
            data: serde_json::json!({ "side": side }),
        }
    }

    pub fn cheer_meter(fixture_id: &str, meter: CheerMeter) -> Self {
        Self {
            event: EVENT_CHEER_METER.into(),
            fixture_id: Some(fixture_id.into()),
            data: serde_json::json!({ "home": meter.home, "away": meter.away }),
        }
    }

    /// Frames without a fixture id are broadcasts and apply to everyone.
    pub fn is_for(&self, fixture_id: &str) -> bool {
        self.fixture_id.as_deref().is_none_or(|id| id == fixture_id)
    }

    pub fn into_event(self) -> Result<RealtimeEvent, FrameError> {
        let Frame { event, data, .. } = self;
        let event = match event.as_str() {
            "minute" => RealtimeEvent::Minute(payload(&event, data)?),
            "injuryTime" => RealtimeEvent::InjuryTime(payload(&event, data)?),
            "score" => {
                let s: ScoreWire = payload(&event, data)?;
                RealtimeEvent::Score(Score { home: s.home_score, away: s.away_score })
            }
            "status" => {
                let status = match payload::<StatusPayload>(&event, data)? {
                    StatusPayload::Bare(s) | StatusPayload::Wrapped { status: s } => s,
                };
                RealtimeEvent::Status(MatchStatus::parse(&status))
            }
            "statistics" => {
                RealtimeEvent::Statistics(map_statistics(payload::<StatisticsWire>(&event, data)?))
            }
            EVENT_CHEER_METER => {
                RealtimeEvent::CheerMeter(map_cheer_meter(payload::<CheerMeterWire>(&event, data)?))
            }
            "generalInfo" => {
                RealtimeEvent::GeneralInfo(map_general_info(payload::<GeneralInfoWire>(&event, data)?))
            }
            "timeline" => {
                RealtimeEvent::Timeline(map_timeline(payload::<Vec<TimelineEventWire>>(&event, data)?))
            }
            "substitution" => RealtimeEvent::Substitutions(map_substitutions(payload::<
                Vec<SubstitutionWire>,
            >(&event, data)?)),
            "goalScorers" => {
                RealtimeEvent::GoalScorers(map_goal_scorers(payload::<Vec<GoalScorerWire>>(&event, data)?))
            }
            "liveWatchers" => RealtimeEvent::LiveWatchers(payload(&event, data)?),
            _ => return Err(FrameError::UnknownEvent(event)),
        };
        Ok(event)
    }
}

fn payload<T: DeserializeOwned>(event: &str, data: serde_json::Value) -> Result<T, FrameError> {
    serde_json::from_value(data).map_err(|e| FrameError::Payload(event.to_owned(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(text: &str) -> Result<RealtimeEvent, FrameError> {
        Frame::decode(text)?.into_event()
    }

    #[test]
    fn decodes_scalar_events() {
        assert_eq!(
            event(r#"{"event":"minute","fixtureId":"fx-1","data":37}"#).unwrap(),
            RealtimeEvent::Minute(37)
        );
        assert_eq!(
            event(r#"{"event":"liveWatchers","data":1500}"#).unwrap(),
            RealtimeEvent::LiveWatchers(1500)
        );
    }

    #[test]
    fn decodes_score_and_both_status_shapes() {
        assert_eq!(
            event(r#"{"event":"score","data":{"homeScore":2,"awayScore":3}}"#).unwrap(),
            RealtimeEvent::Score(Score { home: 2, away: 3 })
        );
        assert_eq!(
            event(r#"{"event":"status","data":"half_time"}"#).unwrap(),
            RealtimeEvent::Status(MatchStatus::HalfTime)
        );
        assert_eq!(
            event(r#"{"event":"status","data":{"status":"finished"}}"#).unwrap(),
            RealtimeEvent::Status(MatchStatus::Finished)
        );
    }

    #[test]
    fn decodes_list_events_into_domain_types() {
        let ev = event(
            r#"{"event":"substitution","data":[
                {"_id":"s1","team":"away","playerOutName":"Ade","playerInName":"Obi","minute":70}
            ]}"#,
        )
        .unwrap();
        let RealtimeEvent::Substitutions(subs) = ev else {
            panic!("expected substitutions, got {ev:?}");
        };
        assert_eq!(subs[0].team, TeamSide::Away);
        assert_eq!(subs[0].player_in_name, "Obi");
    }

    #[test]
    fn unknown_event_is_reported_not_applied() {
        assert!(matches!(
            event(r#"{"event":"confetti","data":{}}"#),
            Err(FrameError::UnknownEvent(name)) if name == "confetti"
        ));
    }

    #[test]
    fn wrong_payload_type_is_a_payload_error() {
        assert!(matches!(
            event(r#"{"event":"minute","data":"soon"}"#),
            Err(FrameError::Payload(name, _)) if name == "minute"
        ));
    }

    #[test]
    fn frames_are_filtered_by_fixture() {
        let frame = Frame::decode(r#"{"event":"minute","fixtureId":"fx-2","data":1}"#).unwrap();
        assert!(!frame.is_for("fx-1"));
        assert!(frame.is_for("fx-2"));
        let broadcast = Frame::decode(r#"{"event":"minute","data":1}"#).unwrap();
        assert!(broadcast.is_for("fx-1"));
    }

    #[test]
    fn outbound_frames_encode_camel_case() {
        let text = Frame::cheer("fx-1", TeamSide::Away).encode().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["event"], "cheer");
        assert_eq!(value["fixtureId"], "fx-1");
        assert_eq!(value["data"]["side"], "away");

        let meter = Frame::cheer_meter("fx-1", CheerMeter { home: 3, away: 4 });
        assert_eq!(meter.into_event().unwrap(), RealtimeEvent::CheerMeter(CheerMeter { home: 3, away: 4 }));
    }
}
