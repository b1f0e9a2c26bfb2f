use crate::state::messages::NetworkRequest;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Re-fetches the snapshot so the fallback layer stays fresh even when the
/// realtime channel is quiet or down.
pub struct PeriodicRefresher {
    network_requests: mpsc::Sender<NetworkRequest>,
    every: Duration,
}

impl PeriodicRefresher {
    pub fn new(network_requests: mpsc::Sender<NetworkRequest>, every: Duration) -> Self {
        Self { network_requests, every }
    }

    pub async fn run(self) {
        let mut refresh_interval = interval(self.every);
        // Skip the immediate first tick so startup loading isn't double-triggered.
        refresh_interval.tick().await;

        loop {
            refresh_interval.tick().await;
            if self
                .network_requests
                .send(NetworkRequest::LoadFixture)
                .await
                .is_err()
            {
                break;
            }
        }
    }
}
