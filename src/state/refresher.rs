use crate::state::messages::LoadRequest;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Periodic background reload of the match list, so a bracket served over
/// HTTP or rewritten on disk stays current.
pub struct PeriodicRefresher {
    load_requests: mpsc::Sender<LoadRequest>,
    period: Duration,
}

impl PeriodicRefresher {
    pub fn new(load_requests: mpsc::Sender<LoadRequest>, period: Duration) -> Self {
        Self { load_requests, period }
    }

    pub async fn run(self) {
        let mut reload_interval = interval(self.period);
        // Skip the immediate first tick so startup loading isn't double-triggered.
        reload_interval.tick().await;

        loop {
            reload_interval.tick().await;
            if self.load_requests.send(LoadRequest::Refresh).await.is_err() {
                break;
            }
        }
    }
}
