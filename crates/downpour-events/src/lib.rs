//! Download lifecycle events and the subscriber contract for Downpour.
//!
//! The engine raises lifecycle notifications from inside its run loop; this
//! crate defines the shared leaf types those notifications carry (`Gid`,
//! `DownloadEvent`, `SubscriberToken`) and the [`EventSubscriber`] trait the
//! session controller dispatches them through. Delivery is synchronous and
//! strictly ordered: the loop iteration that raised an event does not proceed
//! until the subscriber call returns.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle identifying one submitted download.
///
/// Gids are assigned by the engine and never minted by this workspace. The
/// value `0` is reserved: it is the uniform "submission failed" signal and
/// never a valid handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gid(u64);

impl Gid {
    /// Reserved sentinel returned when a submission is rejected.
    pub const INVALID: Self = Self(0);

    /// Wrap a raw engine-assigned gid.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Whether this gid refers to a real submission.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Raw numeric form, as the engine reports it.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Gid {
    /// Renders the 16-digit lowercase hex form aria2 uses for gids.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Opaque caller-supplied token stored at session init and handed back
/// verbatim with every notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberToken(u64);

impl SubscriberToken {
    /// Wrap a raw token value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw token value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// Lifecycle events raised by the engine for a single download.
///
/// The variants map 1:1 onto aria2's `EVENT_ON_DOWNLOAD_*` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadEvent {
    /// The download became active.
    Started,
    /// The download was paused.
    Paused,
    /// The download was stopped or removed.
    Stopped,
    /// The download finished.
    Completed,
    /// The engine reported an error for the download.
    ErrorOccurred,
    /// A BitTorrent download finished while seeding continues.
    BtDownloadCompleted,
}

impl DownloadEvent {
    /// Machine-friendly discriminator for log fields and external consumers.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            DownloadEvent::Started => "started",
            DownloadEvent::Paused => "paused",
            DownloadEvent::Stopped => "stopped",
            DownloadEvent::Completed => "completed",
            DownloadEvent::ErrorOccurred => "error_occurred",
            DownloadEvent::BtDownloadCompleted => "bt_download_completed",
        }
    }
}

/// Result of a subscriber notification, returned to the engine.
///
/// Only `Continue` exists today; the enum is non-exhaustive because a
/// non-continue action is reserved for future cancellation signaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum NotifyAction {
    /// Report success so the engine keeps processing.
    #[default]
    Continue,
}

/// External consumer of download lifecycle events.
///
/// `notify` is invoked exclusively from within the session run loop's
/// execution context: never concurrently with itself, in the exact order the
/// engine raised the events. Implementations must not block indefinitely
/// (the whole engine loop stalls while a notification is in flight) and must
/// not call back into the session's submission or control operations from
/// inside `notify`; re-entering the run loop is forbidden, and such
/// re-entrancy is the caller's responsibility to avoid.
pub trait EventSubscriber: Send + Sync {
    /// Deliver one event, tagged with the token supplied at session init.
    fn notify(&self, token: SubscriberToken, gid: Gid, event: DownloadEvent) -> NotifyAction;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_gid_is_reserved() {
        assert!(!Gid::INVALID.is_valid());
        assert_eq!(Gid::INVALID.as_u64(), 0);
        assert!(Gid::new(0x2089_b05e_cca3_d829).is_valid());
    }

    #[test]
    fn gid_displays_as_aria2_hex() {
        let gid = Gid::new(0x2089_b05e_cca3_d829);
        assert_eq!(gid.to_string(), "2089b05ecca3d829");
        assert_eq!(Gid::new(1).to_string(), "0000000000000001");
    }

    #[test]
    fn gid_serializes_transparently() {
        let gid = Gid::new(42);
        let json = serde_json::to_string(&gid).expect("serialize gid");
        assert_eq!(json, "42");
        let back: Gid = serde_json::from_str(&json).expect("deserialize gid");
        assert_eq!(back, gid);
    }

    #[test]
    fn event_kinds_are_stable() {
        let cases = [
            (DownloadEvent::Started, "started"),
            (DownloadEvent::Paused, "paused"),
            (DownloadEvent::Stopped, "stopped"),
            (DownloadEvent::Completed, "completed"),
            (DownloadEvent::ErrorOccurred, "error_occurred"),
            (DownloadEvent::BtDownloadCompleted, "bt_download_completed"),
        ];
        for (event, kind) in cases {
            assert_eq!(event.kind(), kind);
        }
    }

    #[test]
    fn tokens_round_trip_raw_values() {
        let token = SubscriberToken::new(u64::MAX);
        assert_eq!(token.as_u64(), u64::MAX);
        assert_eq!(token, SubscriberToken::new(u64::MAX));
    }
}
