use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crate::state::realtime::RealtimeCommand;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::warn;
use matchday_api::{TeamSide, TimelineKind};
use matchday_api::lineup::Squad;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    realtime_commands: &mpsc::Sender<RealtimeCommand>,
) {
    let mut guard = app.lock().await;
    let mut request: Option<NetworkRequest> = None;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Live),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Stats),
        (_, Char('3'), _) => guard.update_tab(MenuItem::Timeline),
        (_, Char('4'), _) => {
            guard.update_tab(MenuItem::Lineup);
            request = guard
                .squad_to_load()
                .map(|(side, team_id)| NetworkRequest::LoadSquad { side, team_id });
        }
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Live: fan cheers and admin entry
        (MenuItem::Live, Char('c'), _) => queue_cheer(&mut guard, realtime_commands, TeamSide::Home),
        (MenuItem::Live, Char('C'), _) => queue_cheer(&mut guard, realtime_commands, TeamSide::Away),
        (MenuItem::Live, Char('s'), _) => {
            request = guard.next_status().map(|status| NetworkRequest::UpdateStatus { status });
        }
        (MenuItem::Live, Char(key @ ('h' | 'H' | 'a' | 'A')), _) => {
            let side = if key.eq_ignore_ascii_case(&'h') { TeamSide::Home } else { TeamSide::Away };
            let delta = if key.is_ascii_lowercase() { 1 } else { -1 };
            request = guard
                .adjusted_score(side, delta)
                .map(|(home, away)| NetworkRequest::UpdateScore { home, away });
        }

        // Timeline
        (MenuItem::Timeline, Char('j') | KeyCode::Down, _) => guard.timeline_down(),
        (MenuItem::Timeline, Char('k') | KeyCode::Up, _) => guard.timeline_up(),
        (MenuItem::Timeline, Char('d') | KeyCode::Delete, _) => {
            request = guard
                .selected_timeline_item()
                .map(|item| NetworkRequest::DeleteTimelineItem { item });
        }

        // Lineup builder
        (MenuItem::Lineup, KeyCode::Tab, _) => guard.lineup_focus_next(),
        (MenuItem::Lineup, Char('j') | KeyCode::Down, _) => guard.lineup_down(),
        (MenuItem::Lineup, Char('k') | KeyCode::Up, _) => guard.lineup_up(),
        (MenuItem::Lineup, Char('s'), _) => guard.lineup_add(Squad::StartingXi),
        (MenuItem::Lineup, Char('b'), _) => guard.lineup_add(Squad::Substitutes),
        (MenuItem::Lineup, Char('x'), _) => guard.lineup_remove(),
        (MenuItem::Lineup, Char('m'), _) => guard.lineup_move(),
        (MenuItem::Lineup, Char('c'), _) => guard.lineup_set_captain(),
        (MenuItem::Lineup, Char('f'), _) => guard.lineup_cycle_formation(),
        (MenuItem::Lineup, Char('t'), _) => {
            guard.lineup_switch_side();
            request = guard
                .squad_to_load()
                .map(|(side, team_id)| NetworkRequest::LoadSquad { side, team_id });
        }
        (MenuItem::Lineup, KeyCode::Enter, _) => {
            request = guard.lineup_submission().map(|lineup| NetworkRequest::SubmitLineup { lineup });
        }
        (MenuItem::Lineup, Char('g'), _) => {
            request = guard.goal_for_selected().map(|goal| NetworkRequest::AddGoal { goal });
        }
        (MenuItem::Lineup, Char(key @ ('y' | 'r')), _) => {
            let kind = if key == 'y' { TimelineKind::YellowCard } else { TimelineKind::RedCard };
            request = guard
                .card_for_selected(kind)
                .map(|event| NetworkRequest::AddTimelineEvent { event });
        }
        (MenuItem::Lineup, Char('o'), _) => {
            request = guard
                .substitution_for_selected()
                .map(|substitution| NetworkRequest::AddSubstitution { substitution });
        }
        (MenuItem::Lineup, Char('v'), _) => {
            request = guard
                .vote_for_selected()
                .map(|player_id| NetworkRequest::VotePlayerOfMatch { player_id });
        }

        // Global
        (_, Char('R'), _) => request = Some(NetworkRequest::LoadFixture),
        (_, Char('F'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }

    if let Some(request) = request {
        drop(guard);
        let _ = network_requests.send(request).await;
    }
}

/// Never waits on the realtime worker; it stops draining while reconnecting.
fn queue_cheer(app: &mut App, commands: &mpsc::Sender<RealtimeCommand>, side: TeamSide) {
    match commands.try_send(RealtimeCommand::Cheer(side)) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            warn!("cheer dropped: realtime queue full");
            app.on_notice("Cheer not sent, live updates are catching up".to_string());
        }
        Err(TrySendError::Closed(_)) => warn!("cheer dropped: realtime worker stopped"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_settings::AppSettings;

    #[test]
    fn cheering_into_a_full_queue_does_not_block() {
        let mut app = App::new(AppSettings::default(), "fx-1".to_string());
        let (tx, mut rx) = mpsc::channel(1);

        queue_cheer(&mut app, &tx, TeamSide::Home);
        queue_cheer(&mut app, &tx, TeamSide::Away);

        assert!(matches!(rx.try_recv(), Ok(RealtimeCommand::Cheer(TeamSide::Home))));
        assert!(rx.try_recv().is_err());
        assert!(app.state.notice.is_some());
    }
}
