//! Background worker persisting click events.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::click_recorder::ClickReceiver;
use crate::domain::repositories::ClickRepository;

/// Retries after the first failed write.
const MAX_RETRIES: usize = 2;
const RETRY_BASE_MS: u64 = 10;
const RETRY_MAX_DELAY: Duration = Duration::from_secs(1);

/// Drains the click queue into `repository`.
///
/// Up to `concurrency` writes run at once. Each write is retried with
/// exponential backoff; permanently failed events are logged and counted.
/// Returns after every [`crate::domain::click_recorder::ClickRecorder`] is
/// dropped and all in-flight writes are finished.
pub async fn run_click_worker<R>(mut receiver: ClickReceiver, repository: Arc<R>, concurrency: usize)
where
    R: ClickRepository + ?Sized + 'static,
{
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut in_flight = JoinSet::new();

    info!(concurrency, "Click worker started");

    while let Some(event) = receiver.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let repository = repository.clone();
        in_flight.spawn(async move {
            persist(repository.as_ref(), &event).await;
            drop(permit);
        });

        while in_flight.try_join_next().is_some() {}
    }

    while in_flight.join_next().await.is_some() {}

    info!("Click worker stopped");
}

async fn persist<R>(repository: &R, event: &ClickEvent)
where
    R: ClickRepository + ?Sized,
{
    let strategy = ExponentialBackoff::from_millis(RETRY_BASE_MS)
        .max_delay(RETRY_MAX_DELAY)
        .map(jitter)
        .take(MAX_RETRIES);

    match Retry::spawn(strategy, || repository.record(event)).await {
        Ok(()) => debug!(link_id = event.link_id, "Click recorded"),
        Err(e) => {
            counter!("click_events_failed_total").increment(1);
            warn!(
                link_id = event.link_id,
                code = %event.short_code,
                error = %e,
                "Failed to record click after retries"
            );
        }
    }
}
