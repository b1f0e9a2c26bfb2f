use crate::state::messages::{NetworkRequest, NetworkResponse, TimelineItem};
use log::{debug, error};
use matchday_api::client::{ApiResult, MatchdayApi};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Runs every request as its own task so a slow fetch never blocks a
/// mutation. Responses can therefore arrive out of order; each one carries
/// the ticket it was stamped with at dispatch.
pub struct NetworkWorker {
    client: MatchdayApi,
    fixture_id: String,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    in_flight: Arc<AtomicUsize>,
    next_ticket: u64,
}

impl NetworkWorker {
    pub fn new(
        client: MatchdayApi,
        fixture_id: String,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            fixture_id,
            requests,
            responses,
            in_flight: Arc::new(AtomicUsize::new(0)),
            next_ticket: 0,
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.next_ticket += 1;
            let ticket = self.next_ticket;

            if self.in_flight.fetch_add(1, Ordering::SeqCst) == 0 {
                self.start_loading_animation().await;
            }

            let client = self.client.clone();
            let fixture_id = self.fixture_id.clone();
            let responses = self.responses.clone();
            let in_flight = self.in_flight.clone();

            tokio::spawn(async move {
                debug!("request #{ticket} dispatched: {request:?}");
                let result = dispatch(&client, &fixture_id, ticket, request).await;

                if in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
                    stop_loading_animation(&responses, result.is_ok()).await;
                }

                let response = result.unwrap_or_else(|err| NetworkResponse::Error {
                    message: err.to_string(),
                });
                if let Err(e) = responses.send(response).await {
                    error!("Failed to send network response: {e}");
                }
            });
        }
    }

    async fn start_loading_animation(&self) {
        let mut loading_state = LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let in_flight = self.in_flight.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if in_flight.load(Ordering::SeqCst) == 0 {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }
}

async fn stop_loading_animation(responses: &mpsc::Sender<NetworkResponse>, is_ok: bool) {
    tokio::time::sleep(Duration::from_millis(15)).await;

    let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
    let _ = responses
        .send(NetworkResponse::LoadingStateChanged {
            loading_state: LoadingState { is_loading: false, spinner_char },
        })
        .await;
}

async fn dispatch(
    client: &MatchdayApi,
    fixture_id: &str,
    ticket: u64,
    request: NetworkRequest,
) -> ApiResult<NetworkResponse> {
    let (fixture, notice) = match request {
        NetworkRequest::LoadFixture => {
            let fixture = client.fetch_live_fixture(fixture_id).await?;
            return Ok(NetworkResponse::FixtureLoaded { ticket, fixture });
        }
        NetworkRequest::LoadSquad { side, team_id } => {
            debug!("loading {} squad {team_id}", side.as_str());
            let players = client.fetch_team_players(&team_id).await?;
            return Ok(NetworkResponse::SquadLoaded { side, players });
        }
        NetworkRequest::VotePlayerOfMatch { player_id } => {
            let message = client
                .vote_player_of_match(fixture_id, &player_id)
                .await?
                .unwrap_or_else(|| "Vote recorded".to_string());
            return Ok(NetworkResponse::VoteRecorded { message });
        }
        NetworkRequest::UpdateStatus { status } => (
            client.update_status(fixture_id, status).await?,
            format!("Status set to {}", status.label()),
        ),
        NetworkRequest::UpdateScore { home, away } => (
            client.update_score(fixture_id, home, away).await?,
            format!("Score set to {home}-{away}"),
        ),
        NetworkRequest::AddGoal { goal } => (
            client.add_goal_scorer(fixture_id, &goal).await?,
            format!("Goal recorded at {}'", goal.minute),
        ),
        NetworkRequest::AddTimelineEvent { event } => (
            client.add_timeline_event(fixture_id, &event).await?,
            format!("Event added at {}'", event.minute),
        ),
        NetworkRequest::AddSubstitution { substitution } => (
            client.add_substitution(fixture_id, &substitution).await?,
            format!("Substitution recorded at {}'", substitution.minute),
        ),
        NetworkRequest::DeleteTimelineItem { item } => {
            let fixture = match &item {
                TimelineItem::Goal(id) => client.delete_goal(fixture_id, id).await?,
                TimelineItem::Event(id) => client.delete_timeline_event(fixture_id, id).await?,
                TimelineItem::Substitution(id) => client.delete_substitution(fixture_id, id).await?,
            };
            (fixture, "Timeline entry deleted".to_string())
        }
        NetworkRequest::SubmitLineup { lineup } => (
            client.set_team_lineup(fixture_id, &lineup).await?,
            format!("Lineup saved ({})", lineup.formation),
        ),
    };
    Ok(NetworkResponse::MutationApplied { ticket, fixture, notice })
}
