//! Event subscribers for asserting on download notifications.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use downpour_events::{DownloadEvent, EventSubscriber, Gid, NotifyAction, SubscriberToken};

/// Subscriber that records every notification it receives.
///
/// Safe to share across the run-loop thread and the asserting test thread;
/// [`RecordingSubscriber::wait_for`] blocks until enough notifications have
/// arrived.
#[derive(Default)]
pub struct RecordingSubscriber {
    records: Mutex<Vec<(SubscriberToken, Gid, DownloadEvent)>>,
    wakeup: Condvar,
}

impl RecordingSubscriber {
    /// All recorded notifications, in delivery order.
    ///
    /// # Panics
    ///
    /// Panics when the internal record mutex is poisoned.
    #[must_use]
    pub fn records(&self) -> Vec<(SubscriberToken, Gid, DownloadEvent)> {
        self.records.lock().expect("records mutex poisoned").clone()
    }

    /// Events recorded for one download, in delivery order.
    #[must_use]
    pub fn events_for(&self, gid: Gid) -> Vec<DownloadEvent> {
        self.records()
            .into_iter()
            .filter(|(_, event_gid, _)| *event_gid == gid)
            .map(|(_, _, event)| event)
            .collect()
    }

    /// Block until at least `count` notifications arrived or `timeout`
    /// elapsed. Returns whether the count was reached.
    ///
    /// # Panics
    ///
    /// Panics when the internal record mutex is poisoned.
    #[must_use]
    pub fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut records = self.records.lock().expect("records mutex poisoned");
        while records.len() < count {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                return false;
            };
            let (guard, result) = self
                .wakeup
                .wait_timeout(records, remaining)
                .expect("records mutex poisoned");
            records = guard;
            if result.timed_out() && records.len() < count {
                return false;
            }
        }
        true
    }
}

impl EventSubscriber for RecordingSubscriber {
    fn notify(&self, token: SubscriberToken, gid: Gid, event: DownloadEvent) -> NotifyAction {
        self.records
            .lock()
            .expect("records mutex poisoned")
            .push((token, gid, event));
        self.wakeup.notify_all();
        NotifyAction::Continue
    }
}
