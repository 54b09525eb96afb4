//! Delivery of engine events to the registered subscriber.

use std::sync::Arc;

use tracing::trace;

use downpour_events::{DownloadEvent, EventSubscriber, Gid, NotifyAction, SubscriberToken};

/// Binds the session's subscriber to its init-time token and dispatches
/// events to it, one at a time, in engine order.
pub(crate) struct EventBridge {
    token: SubscriberToken,
    subscriber: Arc<dyn EventSubscriber>,
}

impl EventBridge {
    pub(crate) fn new(token: SubscriberToken, subscriber: Arc<dyn EventSubscriber>) -> Self {
        Self { token, subscriber }
    }

    /// Deliver one event synchronously; returns once the subscriber does.
    pub(crate) fn dispatch(&self, gid: Gid, event: DownloadEvent) {
        trace!(gid = %gid, kind = event.kind(), "dispatching download event");
        // Only `Continue` exists today; future non-continue actions will
        // signal cancellation back into the run loop.
        let NotifyAction::Continue = self.subscriber.notify(self.token, gid, event) else {
            return;
        };
    }
}
