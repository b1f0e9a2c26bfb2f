use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, LineupPanel, Notice, timeline_entries};
use crate::state::messages::TimelineItem;
use log::{error, info};
use matchday_api::formation::Formation;
use matchday_api::lineup::{RejectionReason, Squad, SquadPlayer, TeamLineup};
use matchday_api::realtime::RealtimeEvent;
use matchday_api::{
    LiveFixture, MatchStatus, NewGoal, NewSubstitution, NewTimelineEvent, TeamSide, TimelineKind,
};
use std::time::Instant;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Live,
    Stats,
    Timeline,
    Lineup,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings, fixture_id: String) -> Self {
        let app = Self {
            state: AppState::new(fixture_id),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    pub fn fixture_id(&self) -> &str {
        &self.state.live.fixture_id
    }

    // -----------------------------------------------------------------------
    // Network and realtime handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_fixture_loaded(&mut self, ticket: u64, fixture: LiveFixture) {
        if self.state.live.accept_snapshot(ticket, fixture) {
            self.state.last_error = None;
            self.clamp_timeline_cursor();
        }
    }

    /// Mutation responses carry the authoritative snapshot; it replaces
    /// local state under the same ticket rule as a fetch.
    pub fn on_mutation_applied(&mut self, ticket: u64, fixture: Option<LiveFixture>, notice: String) {
        if let Some(fixture) = fixture
            && self.state.live.accept_mutation(ticket, fixture)
        {
            self.state.last_error = None;
            self.clamp_timeline_cursor();
        }
        info!("{notice}");
        self.notify(Notice::info(notice));
    }

    pub fn on_squad_loaded(&mut self, side: TeamSide, players: Vec<SquadPlayer>) {
        let count = players.len();
        self.state.lineup.load_squad(side, players);
        self.notify(Notice::info(format!("Loaded {count} {} players", side.as_str())));
    }

    pub fn on_realtime_event(&mut self, event: RealtimeEvent) {
        self.state.live.apply_event(event);
        self.clamp_timeline_cursor();
    }

    pub fn on_realtime_connected(&mut self) {
        self.state.live.connected = true;
        info!("realtime connected to {}", self.settings.ws_url);
    }

    pub fn on_realtime_disconnected(&mut self) {
        if self.state.live.connected {
            self.notify(Notice::error("Live updates disconnected, retrying..."));
        }
        self.state.live.connected = false;
    }

    /// Failed fetches keep whatever snapshot is already on screen.
    pub fn on_error(&mut self, message: String) {
        error!("{message}");
        self.state.last_error = Some(message.clone());
        self.notify(Notice::error(message));
    }

    pub fn on_notice(&mut self, message: String) {
        self.notify(Notice::info(message));
    }

    pub fn expire_notice(&mut self, now: Instant) -> bool {
        if self.state.notice.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.state.notice = None;
            return true;
        }
        false
    }

    fn notify(&mut self, notice: Notice) {
        self.state.notice = Some(notice);
    }

    fn reject(&mut self, reason: RejectionReason) {
        self.notify(Notice::error(reason.to_string()));
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Live tab: admin data entry
    // -----------------------------------------------------------------------

    pub fn next_status(&mut self) -> Option<MatchStatus> {
        let current = self.state.live.view().status;
        let next = current.next();
        if next.is_none() {
            self.notify(Notice::error(format!("{} is final", current.label())));
        }
        next
    }

    /// New (home, away) score after bumping one side by `delta`.
    pub fn adjusted_score(&self, side: TeamSide, delta: i32) -> Option<(u16, u16)> {
        let view = self.state.live.view();
        let (home, away) = (view.home_score, view.away_score);
        let bump = |score: u16| u16::try_from(i32::from(score) + delta).ok();
        let adjusted = match side {
            TeamSide::Home => (bump(home)?, away),
            TeamSide::Away => (home, bump(away)?),
        };
        (adjusted != (home, away)).then_some(adjusted)
    }

    // -----------------------------------------------------------------------
    // Timeline tab
    // -----------------------------------------------------------------------

    pub fn timeline_down(&mut self) {
        let max = timeline_entries(&self.state.live.view()).len().saturating_sub(1);
        self.state.timeline.selected = (self.state.timeline.selected + 1).min(max);
    }

    pub fn timeline_up(&mut self) {
        self.state.timeline.selected = self.state.timeline.selected.saturating_sub(1);
    }

    pub fn selected_timeline_item(&mut self) -> Option<TimelineItem> {
        let entries = timeline_entries(&self.state.live.view());
        let item = entries.get(self.state.timeline.selected).and_then(|e| e.item.clone());
        if item.is_none() {
            self.notify(Notice::error("Nothing selected to delete"));
        }
        item
    }

    fn clamp_timeline_cursor(&mut self) {
        let len = timeline_entries(&self.state.live.view()).len();
        self.state.timeline.selected = self.state.timeline.selected.min(len.saturating_sub(1));
    }

    // -----------------------------------------------------------------------
    // Lineup tab: roster edits are local until submitted
    // -----------------------------------------------------------------------

    /// Team id of the side being edited, if its squad still needs loading.
    pub fn squad_to_load(&self) -> Option<(TeamSide, String)> {
        let side = self.state.lineup.side;
        if self.state.lineup.draft().loaded {
            return None;
        }
        self.state.live.team_id(side).map(|id| (side, id.to_string()))
    }

    pub fn lineup_switch_side(&mut self) {
        self.state.lineup.switch_side();
    }

    pub fn lineup_focus_next(&mut self) {
        self.state.lineup.focus_next();
    }

    pub fn lineup_down(&mut self) {
        self.state.lineup.cursor_down();
    }

    pub fn lineup_up(&mut self) {
        self.state.lineup.cursor_up();
    }

    pub fn lineup_cycle_formation(&mut self) {
        let draft = self.state.lineup.draft_mut();
        let current = (!draft.formation_code.is_empty()).then_some(draft.formation_code.as_str());
        draft.formation_code = Formation::next(current).code.to_string();
    }

    /// Pick the highlighted pool player into `squad`.
    pub fn lineup_add(&mut self, squad: Squad) {
        if self.state.lineup.focus != LineupPanel::Available {
            self.notify(Notice::error("Pick players from the available pool"));
            return;
        }
        let Some(player) = self.state.lineup.selected().cloned() else {
            return;
        };
        let roster = &mut self.state.lineup.draft_mut().roster;
        let result = match squad {
            Squad::StartingXi => roster.add_to_starting_xi(player),
            Squad::Substitutes => roster.add_to_substitutes(player),
        };
        self.finish_lineup_edit(result.map(|_| ()));
    }

    pub fn lineup_remove(&mut self) {
        let Some((squad, id)) = self.selected_squad_player() else {
            return;
        };
        let roster = &mut self.state.lineup.draft_mut().roster;
        let result = match squad {
            Squad::StartingXi => roster.remove_from_starting_xi(&id),
            Squad::Substitutes => roster.remove_from_substitutes(&id),
        };
        self.finish_lineup_edit(result.map(|_| ()));
    }

    pub fn lineup_move(&mut self) {
        let Some((squad, id)) = self.selected_squad_player() else {
            return;
        };
        let result = self
            .state
            .lineup
            .draft_mut()
            .roster
            .move_between_squads(&id, squad, squad.other());
        self.finish_lineup_edit(result);
    }

    pub fn lineup_set_captain(&mut self) {
        let Some((_, id)) = self.selected_squad_player() else {
            return;
        };
        let result = self.state.lineup.draft_mut().roster.set_captain(&id);
        self.finish_lineup_edit(result);
    }

    /// Validated submission body, or None with a notice explaining why not.
    pub fn lineup_submission(&mut self) -> Option<TeamLineup> {
        let side = self.state.lineup.side;
        let team_id = self.state.live.team_id(side).unwrap_or_default().to_string();
        let draft = self.state.lineup.draft();
        match draft.roster.build_lineup(&team_id, &draft.formation_code) {
            Ok(lineup) => Some(lineup),
            Err(reason) => {
                self.reject(reason);
                None
            }
        }
    }

    /// Goal for the highlighted starter at the current match minute.
    pub fn goal_for_selected(&mut self) -> Option<NewGoal> {
        let Some(player) = self.state.lineup.selected_in(LineupPanel::StartingXi) else {
            self.notify(Notice::error("Select a starter to credit the goal"));
            return None;
        };
        Some(NewGoal {
            player_id: player.id.clone(),
            team: self.state.lineup.side,
            minute: self.state.live.view().minute,
            is_own_goal: false,
            is_penalty: false,
        })
    }

    /// Booking for the highlighted starter at the current match minute.
    pub fn card_for_selected(&mut self, kind: TimelineKind) -> Option<NewTimelineEvent> {
        let Some(player) = self.state.lineup.selected_in(LineupPanel::StartingXi) else {
            self.notify(Notice::error("Select a starter to book"));
            return None;
        };
        let card = if kind == TimelineKind::RedCard { "Red card" } else { "Yellow card" };
        Some(NewTimelineEvent {
            kind: kind.as_str().to_string(),
            minute: self.state.live.view().minute,
            team: Some(self.state.lineup.side),
            player_id: Some(player.id.clone()),
            description: format!("{card} for {}", player.name),
        })
    }

    /// Highlighted starter off, highlighted substitute on.
    pub fn substitution_for_selected(&mut self) -> Option<NewSubstitution> {
        let lineup = &self.state.lineup;
        let (Some(out), Some(on)) = (
            lineup.selected_in(LineupPanel::StartingXi),
            lineup.selected_in(LineupPanel::Substitutes),
        ) else {
            self.notify(Notice::error("Select a starter and a substitute"));
            return None;
        };
        Some(NewSubstitution {
            team: lineup.side,
            player_out_id: out.id.clone(),
            player_in_id: on.id.clone(),
            minute: self.state.live.view().minute,
        })
    }

    pub fn vote_for_selected(&mut self) -> Option<String> {
        let id = self.state.lineup.selected().map(|p| p.id.clone());
        if id.is_none() {
            self.notify(Notice::error("Select a player to vote for"));
        }
        id
    }

    fn selected_squad_player(&mut self) -> Option<(Squad, String)> {
        let lineup = &self.state.lineup;
        let picked = lineup
            .focus
            .squad()
            .zip(lineup.selected().map(|p| p.id.clone()));
        if picked.is_none() {
            self.notify(Notice::error("Select a player in the starting XI or substitutes"));
        }
        picked
    }

    fn finish_lineup_edit(&mut self, result: Result<(), RejectionReason>) {
        match result {
            Ok(()) => self.state.lineup.clamp_cursors(),
            Err(reason) => self.reject(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchday_api::{MatchResult, TeamRef};

    fn app() -> App {
        App::new(AppSettings::default(), "fx-1".to_string())
    }

    fn snapshot(home_score: u16) -> LiveFixture {
        LiveFixture {
            id: "fx-1".into(),
            home: TeamRef { id: "t-home".into(), name: "Engineering".into(), short_name: "ENG".into() },
            away: TeamRef { id: "t-away".into(), name: "Medicine".into(), short_name: "MED".into() },
            result: Some(MatchResult { home_score, ..Default::default() }),
            ..Default::default()
        }
    }

    fn player(id: &str, pos: &str, jersey: u8) -> SquadPlayer {
        SquadPlayer {
            id: id.into(),
            name: id.into(),
            position_code: pos.into(),
            jersey_number: jersey,
            is_captain: false,
        }
    }

    #[test]
    fn mutation_snapshot_replaces_local_state() {
        let mut app = app();
        app.on_fixture_loaded(1, snapshot(0));
        app.on_mutation_applied(2, Some(snapshot(1)), "Score set to 1-0".into());
        assert_eq!(app.state.live.view().home_score, 1);
        assert!(app.state.notice.as_ref().is_some_and(|n| !n.is_error));
    }

    #[test]
    fn late_fetch_does_not_undo_a_mutation() {
        let mut app = app();
        app.on_mutation_applied(2, Some(snapshot(1)), "ok".into());
        app.on_fixture_loaded(1, snapshot(0));
        assert_eq!(app.state.live.view().home_score, 1);
    }

    #[test]
    fn fetch_error_keeps_prior_snapshot() {
        let mut app = app();
        app.on_fixture_loaded(1, snapshot(2));
        app.on_error("Network error".into());
        assert_eq!(app.state.live.view().home_score, 2);
        assert!(app.state.notice.as_ref().is_some_and(|n| n.is_error));
    }

    #[test]
    fn score_adjustment_never_goes_negative() {
        let mut app = app();
        app.on_fixture_loaded(1, snapshot(0));
        assert_eq!(app.adjusted_score(TeamSide::Home, 1), Some((1, 0)));
        assert_eq!(app.adjusted_score(TeamSide::Away, -1), None);
    }

    #[test]
    fn score_entry_builds_on_the_returned_snapshot() {
        let mut app = app();
        app.on_fixture_loaded(1, snapshot(0));
        app.on_realtime_event(RealtimeEvent::Score(matchday_api::Score { home: 1, away: 0 }));
        assert_eq!(app.adjusted_score(TeamSide::Home, 1), Some((2, 0)));

        app.on_mutation_applied(2, Some(snapshot(2)), "Score set to 2-0".into());
        assert_eq!(app.state.live.view().home_score, 2);
        assert_eq!(app.adjusted_score(TeamSide::Home, 1), Some((3, 0)));
    }

    #[test]
    fn bookings_need_a_selected_starter() {
        let mut app = app();
        app.on_squad_loaded(TeamSide::Home, vec![player("b", "ST", 9)]);
        assert!(app.card_for_selected(TimelineKind::YellowCard).is_none());

        app.lineup_add(Squad::StartingXi);
        app.lineup_focus_next();
        app.on_realtime_event(RealtimeEvent::Minute(37));
        let card = app.card_for_selected(TimelineKind::RedCard).unwrap();
        assert_eq!(card.kind, "red_card");
        assert_eq!(card.minute, 37);
        assert_eq!(card.team, Some(TeamSide::Home));
        assert_eq!(card.player_id.as_deref(), Some("b"));
        assert_eq!(card.description, "Red card for b");
    }

    #[test]
    fn finished_match_has_no_next_status() {
        let mut app = app();
        app.on_realtime_event(RealtimeEvent::Status(MatchStatus::Finished));
        assert_eq!(app.next_status(), None);
        app.on_realtime_event(RealtimeEvent::Status(MatchStatus::HalfTime));
        assert_eq!(app.next_status(), Some(MatchStatus::SecondHalf));
    }

    #[test]
    fn lineup_rejections_surface_as_notices() {
        let mut app = app();
        app.on_fixture_loaded(1, snapshot(0));
        app.on_squad_loaded(TeamSide::Home, vec![player("gk", "GK", 1)]);

        app.lineup_add(Squad::StartingXi);
        assert_eq!(app.state.lineup.draft().roster.starting_xi.len(), 1);

        // No formation picked yet.
        assert!(app.lineup_submission().is_none());
        let notice = app.state.notice.as_ref().map(|n| n.message.clone());
        assert_eq!(notice.as_deref(), Some("Missing formation"));

        app.lineup_cycle_formation();
        assert_eq!(app.state.lineup.draft().formation_code, "4-3-3");
        assert!(app.lineup_submission().is_none());
        assert!(
            app.state
                .notice
                .as_ref()
                .is_some_and(|n| n.message.starts_with("Lineup does not match"))
        );
    }

    #[test]
    fn captain_and_move_go_through_the_roster() {
        let mut app = app();
        app.on_squad_loaded(TeamSide::Home, vec![player("a", "GK", 1), player("b", "ST", 9)]);
        app.lineup_add(Squad::StartingXi);
        app.lineup_add(Squad::StartingXi);

        app.lineup_focus_next();
        assert_eq!(app.state.lineup.focus, LineupPanel::StartingXi);
        app.lineup_set_captain();
        assert_eq!(app.state.lineup.draft().roster.captain().map(|p| p.id.as_str()), Some("a"));

        app.lineup_move();
        let roster = &app.state.lineup.draft().roster;
        assert_eq!(roster.substitutes.len(), 1);
        assert!(roster.captain().is_none());
    }

    #[test]
    fn squad_loads_once_per_side() {
        let mut app = app();
        assert_eq!(app.squad_to_load(), None);
        app.on_fixture_loaded(1, snapshot(0));
        assert_eq!(app.squad_to_load(), Some((TeamSide::Home, "t-home".to_string())));
        app.on_squad_loaded(TeamSide::Home, Vec::new());
        assert_eq!(app.squad_to_load(), None);
        app.lineup_switch_side();
        assert_eq!(app.squad_to_load(), Some((TeamSide::Away, "t-away".to_string())));
    }
}
