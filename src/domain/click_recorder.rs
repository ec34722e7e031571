//! Bounded, drop-oldest click queue between redirect handlers and the click worker.
//!
//! [`ClickRecorder::record`] never blocks and never fails the caller. When the
//! queue is full the oldest queued event is overwritten; the receiving side
//! notices the gap, counts it and logs it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use metrics::counter;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::warn;

use crate::domain::click_event::ClickEvent;

#[derive(Debug, Default)]
struct QueueStats {
    dropped: AtomicU64,
}

impl QueueStats {
    fn add_dropped(&self, n: u64) -> u64 {
        counter!("click_events_dropped_total").increment(n);
        self.dropped.fetch_add(n, Ordering::Relaxed) + n
    }
}

/// Producer side of the click queue. Cheap to clone.
#[derive(Clone)]
pub struct ClickRecorder {
    sender: broadcast::Sender<ClickEvent>,
    stats: Arc<QueueStats>,
}

/// Consumer side of the click queue, owned by the click worker.
pub struct ClickReceiver {
    receiver: broadcast::Receiver<ClickEvent>,
    stats: Arc<QueueStats>,
}

/// Creates a click queue holding at least `capacity` events.
///
/// The capacity is rounded up to the next power of two.
pub fn click_queue(capacity: usize) -> (ClickRecorder, ClickReceiver) {
    let (sender, receiver) = broadcast::channel(capacity.max(1));
    let stats = Arc::new(QueueStats::default());

    (
        ClickRecorder {
            sender,
            stats: stats.clone(),
        },
        ClickReceiver { receiver, stats },
    )
}

impl ClickRecorder {
    /// Enqueues a click event without waiting.
    ///
    /// Overwrites the oldest queued event when the queue is full. If the
    /// worker is gone the event is dropped and counted.
    pub fn record(&self, event: ClickEvent) {
        if self.sender.send(event).is_err() {
            let total = self.stats.add_dropped(1);
            warn!(total_dropped = total, "Click worker is not running; click event dropped");
        }
    }

    /// Number of events waiting for the worker.
    pub fn queued(&self) -> usize {
        self.sender.len()
    }

    /// Total events lost to overflow or a stopped worker.
    pub fn dropped(&self) -> u64 {
        self.stats.dropped.load(Ordering::Relaxed)
    }

    /// Returns true while a worker is attached to the queue.
    pub fn is_attached(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

impl ClickReceiver {
    /// Waits for the next event.
    ///
    /// Returns `None` once every [`ClickRecorder`] is dropped and the queue
    /// is drained.
    pub async fn recv(&mut self) -> Option<ClickEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(n)) => self.report_overflow(n),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Takes the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<ClickEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(n)) => self.report_overflow(n),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    fn report_overflow(&self, n: u64) {
        let total = self.stats.add_dropped(n);
        warn!(
            dropped = n,
            total_dropped = total,
            "Click queue overflowed; oldest events dropped"
        );
    }
}
