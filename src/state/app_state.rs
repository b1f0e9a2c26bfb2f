use crate::app::MenuItem;
use crate::state::messages::TimelineItem;
use log::debug;
use matchday_api::lineup::{Roster, Squad, SquadPlayer};
use matchday_api::reconcile::{RealtimePatch, ReconciledView, TemplateDefaults, reconcile};
use matchday_api::realtime::RealtimeEvent;
use matchday_api::{LiveFixture, TeamSide, TimelineKind};
use std::time::{Duration, Instant};

pub const NOTICE_TTL: Duration = Duration::from_secs(4);

// ---------------------------------------------------------------------------
// Transient notices (the toast line under the tab bar)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub is_error: bool,
    pub raised_at: Instant,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { message: message.into(), is_error: false, raised_at: Instant::now() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { message: message.into(), is_error: true, raised_at: Instant::now() }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.raised_at) >= NOTICE_TTL
    }
}

// ---------------------------------------------------------------------------
// Live fixture: snapshot + realtime patch
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct LiveState {
    pub fixture_id: String,
    pub snapshot: Option<LiveFixture>,
    pub patch: RealtimePatch,
    pub defaults: TemplateDefaults,
    /// Ticket of the newest snapshot applied so far. Anything older that
    /// resolves later is discarded.
    pub last_applied_ticket: u64,
    pub connected: bool,
}

impl LiveState {
    pub fn new(fixture_id: impl Into<String>) -> Self {
        Self { fixture_id: fixture_id.into(), ..Self::default() }
    }

    /// Replace the snapshot wholesale if `ticket` is newer than the last one
    /// applied. Returns false for a stale response.
    pub fn accept_snapshot(&mut self, ticket: u64, fixture: LiveFixture) -> bool {
        if ticket <= self.last_applied_ticket {
            debug!(
                "discarding stale snapshot #{ticket} (already applied #{})",
                self.last_applied_ticket
            );
            return false;
        }
        self.last_applied_ticket = ticket;
        self.snapshot = Some(fixture);
        true
    }

    /// `accept_snapshot` for mutation responses: the realtime fields the
    /// fixture carries are cleared too. Plain fetches never clear the patch.
    pub fn accept_mutation(&mut self, ticket: u64, fixture: LiveFixture) -> bool {
        if !self.accept_snapshot(ticket, fixture) {
            return false;
        }
        if let Some(snapshot) = &self.snapshot {
            self.patch.yield_to(snapshot);
        }
        true
    }

    pub fn apply_event(&mut self, event: RealtimeEvent) {
        self.patch.apply(event);
    }

    pub fn view(&self) -> ReconciledView {
        reconcile(self.snapshot.as_ref(), &self.patch, &self.defaults)
    }

    pub fn team_id(&self, side: TeamSide) -> Option<&str> {
        self.snapshot
            .as_ref()
            .map(|s| s.team(side).id.as_str())
            .filter(|id| !id.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Timeline tab: goals, events and substitutions merged by minute
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub minute: u16,
    pub kind: TimelineKind,
    pub team: Option<TeamSide>,
    pub text: String,
    pub item: Option<TimelineItem>,
}

pub fn timeline_entries(view: &ReconciledView) -> Vec<TimelineEntry> {
    let goals = view.goal_scorers.iter().map(|g| {
        let mut text = g.player_name.clone();
        if g.penalty {
            text.push_str(" (pen)");
        }
        if g.own_goal {
            text.push_str(" (og)");
        }
        TimelineEntry {
            minute: g.minute,
            kind: TimelineKind::Goal,
            team: Some(g.team),
            text,
            item: (!g.id.is_empty()).then(|| TimelineItem::Goal(g.id.clone())),
        }
    });

    let events = view
        .timeline
        .iter()
        // Goals are listed from the scorer records.
        .filter(|e| e.kind != TimelineKind::Goal)
        .map(|e| TimelineEntry {
            minute: e.minute,
            kind: e.kind,
            team: e.team,
            text: match &e.player_name {
                Some(name) if !e.description.is_empty() => format!("{name}: {}", e.description),
                Some(name) => name.clone(),
                None => e.description.clone(),
            },
            item: (!e.id.is_empty()).then(|| TimelineItem::Event(e.id.clone())),
        });

    let subs = view.substitutions.iter().map(|s| TimelineEntry {
        minute: s.minute,
        kind: TimelineKind::Substitution,
        team: Some(s.team),
        text: format!("{} on, {} off", s.player_in_name, s.player_out_name),
        item: (!s.id.is_empty()).then(|| TimelineItem::Substitution(s.id.clone())),
    });

    let mut entries: Vec<TimelineEntry> = goals.chain(events).chain(subs).collect();
    entries.sort_by_key(|e| e.minute);
    entries
}

#[derive(Debug, Default)]
pub struct TimelineState {
    pub selected: usize,
}

// ---------------------------------------------------------------------------
// Lineup builder
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LineupPanel {
    #[default]
    Available,
    StartingXi,
    Substitutes,
}

impl LineupPanel {
    pub fn next(self) -> Self {
        match self {
            LineupPanel::Available => LineupPanel::StartingXi,
            LineupPanel::StartingXi => LineupPanel::Substitutes,
            LineupPanel::Substitutes => LineupPanel::Available,
        }
    }

    pub fn squad(self) -> Option<Squad> {
        match self {
            LineupPanel::Available => None,
            LineupPanel::StartingXi => Some(Squad::StartingXi),
            LineupPanel::Substitutes => Some(Squad::Substitutes),
        }
    }

    fn index(self) -> usize {
        match self {
            LineupPanel::Available => 0,
            LineupPanel::StartingXi => 1,
            LineupPanel::Substitutes => 2,
        }
    }
}

/// One team's draft: roster plus the formation being built toward.
#[derive(Debug, Default)]
pub struct LineupDraft {
    pub roster: Roster,
    /// Empty until a formation is picked.
    pub formation_code: String,
    pub loaded: bool,
}

#[derive(Debug, Default)]
pub struct LineupState {
    pub side: TeamSide,
    pub home: LineupDraft,
    pub away: LineupDraft,
    pub focus: LineupPanel,
    cursors: [usize; 3],
}

impl LineupState {
    pub fn draft(&self) -> &LineupDraft {
        match self.side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    pub fn draft_mut(&mut self) -> &mut LineupDraft {
        match self.side {
            TeamSide::Home => &mut self.home,
            TeamSide::Away => &mut self.away,
        }
    }

    pub fn load_squad(&mut self, side: TeamSide, players: Vec<SquadPlayer>) {
        let draft = match side {
            TeamSide::Home => &mut self.home,
            TeamSide::Away => &mut self.away,
        };
        draft.roster = Roster::new(players);
        draft.loaded = true;
        self.clamp_cursors();
    }

    pub fn switch_side(&mut self) {
        self.side = self.side.other();
        self.cursors = [0; 3];
    }

    pub fn panel_players(&self, panel: LineupPanel) -> &[SquadPlayer] {
        let roster = &self.draft().roster;
        match panel.squad() {
            None => &roster.available,
            Some(squad) => roster.squad(squad),
        }
    }

    pub fn cursor(&self, panel: LineupPanel) -> usize {
        self.cursors[panel.index()]
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn cursor_down(&mut self) {
        let max = self.panel_players(self.focus).len().saturating_sub(1);
        let cursor = &mut self.cursors[self.focus.index()];
        *cursor = (*cursor + 1).min(max);
    }

    pub fn cursor_up(&mut self) {
        let cursor = &mut self.cursors[self.focus.index()];
        *cursor = cursor.saturating_sub(1);
    }

    pub fn selected_in(&self, panel: LineupPanel) -> Option<&SquadPlayer> {
        self.panel_players(panel).get(self.cursor(panel))
    }

    pub fn selected(&self) -> Option<&SquadPlayer> {
        self.selected_in(self.focus)
    }

    /// Keep every cursor inside its list after players move around.
    pub fn clamp_cursors(&mut self) {
        for panel in [LineupPanel::Available, LineupPanel::StartingXi, LineupPanel::Substitutes] {
            let len = self.panel_players(panel).len();
            let cursor = &mut self.cursors[panel.index()];
            *cursor = (*cursor).min(len.saturating_sub(1));
        }
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub notice: Option<Notice>,
    /// Last fetch failure, kept until the next successful snapshot.
    pub last_error: Option<String>,
    pub live: LiveState,
    pub timeline: TimelineState,
    pub lineup: LineupState,
}

impl AppState {
    pub fn new(fixture_id: impl Into<String>) -> Self {
        Self { live: LiveState::new(fixture_id), ..Self::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchday_api::{GoalScorer, MatchResult, Score, Substitution, TimelineEvent};

    fn fixture(home_score: u16) -> LiveFixture {
        LiveFixture {
            id: "fx-1".into(),
            result: Some(MatchResult { home_score, ..Default::default() }),
            ..Default::default()
        }
    }

    #[test]
    fn newer_snapshot_replaces_older() {
        let mut live = LiveState::new("fx-1");
        assert!(live.accept_snapshot(1, fixture(0)));
        assert!(live.accept_snapshot(2, fixture(1)));
        assert_eq!(live.view().home_score, 1);
        assert_eq!(live.last_applied_ticket, 2);
    }

    #[test]
    fn stale_snapshot_resolving_late_is_discarded() {
        let mut live = LiveState::new("fx-1");
        // Fetch #2 resolves first, fetch #1 afterwards.
        assert!(live.accept_snapshot(2, fixture(3)));
        assert!(!live.accept_snapshot(1, fixture(0)));
        assert_eq!(live.view().home_score, 3);
    }

    #[test]
    fn realtime_patch_wins_over_snapshot_field_by_field() {
        let mut live = LiveState::new("fx-1");
        live.accept_snapshot(1, fixture(2));
        live.apply_event(RealtimeEvent::Minute(61));
        let view = live.view();
        assert_eq!(view.minute, 61);
        assert_eq!(view.home_score, 2);
    }

    #[test]
    fn mutation_snapshot_shows_through_an_older_patch() {
        let mut live = LiveState::new("fx-1");
        live.accept_snapshot(1, fixture(0));
        live.apply_event(RealtimeEvent::Score(Score { home: 1, away: 0 }));
        live.apply_event(RealtimeEvent::Minute(70));

        // A plain refresh still loses to the patch.
        live.accept_snapshot(2, fixture(0));
        assert_eq!(live.view().home_score, 1);

        assert!(live.accept_mutation(3, fixture(2)));
        let view = live.view();
        assert_eq!(view.home_score, 2);
        assert_eq!(view.minute, 70, "snapshot carried no minute");

        assert!(!live.accept_mutation(2, fixture(5)));
        assert_eq!(live.view().home_score, 2);
    }

    #[test]
    fn timeline_merges_sources_in_minute_order() {
        let mut live = LiveState::new("fx-1");
        live.accept_snapshot(
            1,
            LiveFixture {
                goal_scorers: vec![GoalScorer {
                    id: "g1".into(),
                    player_name: "Ade".into(),
                    minute: 30,
                    penalty: true,
                    ..Default::default()
                }],
                timeline: vec![
                    TimelineEvent {
                        id: "e1".into(),
                        minute: 12,
                        kind: TimelineKind::YellowCard,
                        player_name: Some("Obi".into()),
                        ..Default::default()
                    },
                    TimelineEvent {
                        id: "e2".into(),
                        minute: 30,
                        kind: TimelineKind::Goal,
                        ..Default::default()
                    },
                ],
                substitutions: vec![Substitution {
                    id: "s1".into(),
                    minute: 55,
                    player_in_name: "Eze".into(),
                    player_out_name: "Obi".into(),
                    ..Default::default()
                }],
                ..Default::default()
            },
        );

        let entries = timeline_entries(&live.view());
        let minutes: Vec<u16> = entries.iter().map(|e| e.minute).collect();
        assert_eq!(minutes, vec![12, 30, 55]);
        assert_eq!(entries[1].text, "Ade (pen)");
        assert_eq!(entries[1].item, Some(TimelineItem::Goal("g1".into())));
        assert_eq!(entries[2].text, "Eze on, Obi off");
    }

    fn squad_player(id: &str, pos: &str, jersey: u8) -> SquadPlayer {
        SquadPlayer {
            id: id.into(),
            name: id.to_uppercase(),
            position_code: pos.into(),
            jersey_number: jersey,
            is_captain: false,
        }
    }

    #[test]
    fn cursors_stay_inside_lists() {
        let mut lineup = LineupState::default();
        lineup.load_squad(
            TeamSide::Home,
            vec![squad_player("a", "GK", 1), squad_player("b", "CB", 2)],
        );
        lineup.cursor_down();
        lineup.cursor_down();
        assert_eq!(lineup.cursor(LineupPanel::Available), 1);

        let picked = lineup.selected().cloned().unwrap();
        lineup.draft_mut().roster.add_to_starting_xi(picked).unwrap();
        lineup.clamp_cursors();
        assert_eq!(lineup.cursor(LineupPanel::Available), 0);
        assert_eq!(lineup.selected().map(|p| p.id.as_str()), Some("a"));
    }

    #[test]
    fn each_side_keeps_its_own_draft() {
        let mut lineup = LineupState::default();
        lineup.load_squad(TeamSide::Away, vec![squad_player("x", "ST", 9)]);
        assert!(!lineup.draft().loaded);
        lineup.switch_side();
        assert!(lineup.draft().loaded);
        assert_eq!(lineup.panel_players(LineupPanel::Available).len(), 1);
    }
}
