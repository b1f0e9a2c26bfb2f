use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use matchday_api::lineup::{SquadPlayer, TeamLineup};
use matchday_api::{LiveFixture, MatchStatus, NewGoal, NewSubstitution, NewTimelineEvent, TeamSide};

/// Timeline rows that can be deleted, by item id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineItem {
    Goal(String),
    Event(String),
    Substitution(String),
}

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadFixture,
    LoadSquad { side: TeamSide, team_id: String },
    UpdateStatus { status: MatchStatus },
    UpdateScore { home: u16, away: u16 },
    AddGoal { goal: NewGoal },
    AddTimelineEvent { event: NewTimelineEvent },
    AddSubstitution { substitution: NewSubstitution },
    DeleteTimelineItem { item: TimelineItem },
    SubmitLineup { lineup: TeamLineup },
    VotePlayerOfMatch { player_id: String },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    /// `ticket` orders snapshot-bearing responses by dispatch time.
    FixtureLoaded { ticket: u64, fixture: LiveFixture },
    MutationApplied { ticket: u64, fixture: Option<LiveFixture>, notice: String },
    SquadLoaded { side: TeamSide, players: Vec<SquadPlayer> },
    VoteRecorded { message: String },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    Tick,
}
