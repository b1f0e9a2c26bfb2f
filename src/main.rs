mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::{App, MenuItem};
use crate::state::app_settings::AppSettings;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::realtime::{RealtimeCommand, RealtimeUpdate, RealtimeWorker};
use crate::state::refresher::PeriodicRefresher;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::{LevelFilter, error};
use matchday_api::client::MatchdayApi;
use std::io::Stdout;
use std::sync::Arc;
use std::time::Instant;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tokio::time::Duration;
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut settings = AppSettings::load();
    let Some(fixture_arg) = handle_cli_args() else {
        return Ok(());
    };
    let Some(fixture_id) = fixture_arg.or_else(|| settings.fixture_id.clone()) else {
        eprintln!("No fixture given.\n\n{}", usage_text());
        std::process::exit(2);
    };
    settings.fixture_id = Some(fixture_id.clone());

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    let level = settings.log_level.unwrap_or(LevelFilter::Error);
    tui_logger::init_logger(level)?;
    tui_logger::set_default_level(level);

    let mut api = MatchdayApi::new(settings.api_url.clone());
    if let Some(token) = &settings.api_token {
        api = api.with_token(token.clone());
    }
    let ws_url = settings.ws_url.clone();
    let refresh_interval = settings.refresh_interval;

    let app = Arc::new(Mutex::new(App::new(settings, fixture_id.clone())));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);
    let (realtime_cmd_tx, realtime_cmd_rx) = mpsc::channel::<RealtimeCommand>(100);
    let (realtime_upd_tx, realtime_upd_rx) = mpsc::channel::<RealtimeUpdate>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(api, fixture_id.clone(), network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Realtime thread
    let realtime_worker = RealtimeWorker {
        url: ws_url,
        fixture_id,
        commands: realtime_cmd_rx,
        updates: realtime_upd_tx,
    };
    let realtime_task = tokio::spawn(realtime_worker.run());

    // Periodic snapshot refresh thread
    let periodic_updater = PeriodicRefresher::new(network_req_tx.clone(), refresh_interval);
    let periodic_task = tokio::spawn(periodic_updater.run());

    // Notice expiry tick
    let tick_tx = ui_event_tx.clone();
    let tick_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(500));
        loop {
            interval.tick().await;
            if tick_tx.send(UiEvent::Tick).await.is_err() {
                break;
            }
        }
    });

    // Trigger snapshot load on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(
        terminal,
        app,
        ui_event_rx,
        network_req_tx,
        network_resp_rx,
        realtime_cmd_tx,
        realtime_upd_rx,
    )
    .await;

    input_handler.abort();
    network_task.abort();
    realtime_task.abort();
    periodic_task.abort();
    tick_task.abort();

    Ok(())
}

/// Returns the positional fixture id (if any), or None when the process
/// should exit after printing help or version.
fn handle_cli_args() -> Option<Option<String>> {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return Some(None);
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            None
        }
        "-V" | "--version" => {
            println!("matchday {}", env!("CARGO_PKG_VERSION"));
            None
        }
        flag if flag.starts_with('-') => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
        _ => Some(Some(arg)),
    }
}

fn usage_text() -> &'static str {
    "matchday - live football fixture terminal client

Usage:
  matchday <FIXTURE_ID>
  matchday --help
  matchday --version

Environment:
  MATCHDAY_FIXTURE        Fixture id when none is given on the command line
  MATCHDAY_API_URL        REST API base URL (default http://127.0.0.1:4000/api)
  MATCHDAY_WS_URL         Realtime WebSocket URL (default ws://127.0.0.1:8787)
  MATCHDAY_API_TOKEN      Bearer token for admin actions
  MATCHDAY_REFRESH_SECS   Snapshot refresh interval in seconds (default 15)
  MATCHDAY_LOG            Log level: error, warn, info, debug, trace (default error)"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
    realtime_commands: mpsc::Sender<RealtimeCommand>,
    mut realtime_updates: mpsc::Receiver<RealtimeUpdate>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw =
                    handle_ui_event(ui_event, &app, &network_requests, &realtime_commands).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw =
                    handle_network_response(response, &app, &network_requests, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(update) = realtime_updates.recv() => {
                handle_realtime_update(update, &app).await;
                let mut app_guard = app.lock().await;
                draw::draw(&mut terminal, &mut app_guard, loading);
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    realtime_commands: &mpsc::Sender<RealtimeCommand>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let _ = network_requests.send(NetworkRequest::LoadFixture).await;
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests, realtime_commands).await;
            true
        }
        UiEvent::Resize => true,
        UiEvent::Tick => {
            let mut guard = app.lock().await;
            guard.expire_notice(Instant::now())
        }
    }
}

async fn handle_realtime_update(update: RealtimeUpdate, app: &Arc<Mutex<App>>) {
    let mut guard = app.lock().await;
    match update {
        RealtimeUpdate::Connected => guard.on_realtime_connected(),
        RealtimeUpdate::Disconnected => guard.on_realtime_disconnected(),
        RealtimeUpdate::Event(event) => guard.on_realtime_event(event),
        RealtimeUpdate::Error(message) => log::warn!("realtime: {message}"),
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        NetworkResponse::FixtureLoaded { ticket, fixture } => {
            let mut guard = app.lock().await;
            guard.on_fixture_loaded(ticket, fixture);
            let squad = guard.squad_to_load().filter(|_| guard.state.active_tab == MenuItem::Lineup);
            drop(guard);
            if let Some((side, team_id)) = squad {
                let _ = network_requests
                    .send(NetworkRequest::LoadSquad { side, team_id })
                    .await;
            }
        }
        NetworkResponse::MutationApplied { ticket, fixture, notice } => {
            let mut guard = app.lock().await;
            guard.on_mutation_applied(ticket, fixture, notice);
        }
        NetworkResponse::SquadLoaded { side, players } => {
            let mut guard = app.lock().await;
            guard.on_squad_loaded(side, players);
        }
        NetworkResponse::VoteRecorded { message } => {
            let mut guard = app.lock().await;
            guard.on_notice(message);
        }
        NetworkResponse::Error { message } => {
            error!("Network error: {message}");
            let mut guard = app.lock().await;
            guard.on_error(message);
        }
    }
    true
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

/// Best effort: also runs from the panic hook, where there is nobody left
/// to report a failure to.
pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
