#![deny(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! aria2 adapter: session controller, blocking run loop, and torrent
//! inspection.
//!
//! [`Session`] owns one engine session for its whole lifetime and funnels all
//! engine access through an internal mutex. Submission and control calls
//! report failure through the uniform boundary convention (`Gid::INVALID`,
//! `false`, or `None`) and log the richer engine error; initialization, the
//! run loop, and inspection return typed errors directly.
//!
//! The native engine is linked only when the `libaria2` feature is enabled;
//! otherwise a deterministic in-memory stub backs the session.

mod bridge;
#[cfg(feature = "libaria2")]
#[allow(unsafe_code)]
/// Raw cxx bridge to libaria2.
pub mod ffi;
mod inspect;
/// Session abstraction and the native/stub engine implementations.
pub mod session;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};

use downpour_core::{DownloadInfo, InitError, InspectError, OptionSet, SessionError, TorrentInfo};
use downpour_events::{EventSubscriber, Gid, SubscriberToken};

use bridge::EventBridge;
use session::{DriveOutcome, EngineSession};
pub use session::SessionConfig;

/// Controller for one engine session.
///
/// All methods take `&self`; the engine lives behind a mutex and every call
/// serializes on it. [`Session::run`] blocks the calling thread and holds the
/// engine across each drive step, so submission and control calls made from
/// other threads interleave between steps. Events are dispatched to the
/// subscriber outside the engine lock, in the order the engine raised them.
pub struct Session {
    engine: Mutex<Box<dyn EngineSession>>,
    bridge: EventBridge,
    running: AtomicBool,
}

impl Session {
    /// Create a session with default configuration.
    ///
    /// The `token` is stored verbatim and handed back with every event
    /// delivered to `subscriber`.
    ///
    /// # Errors
    ///
    /// Returns [`InitError`] when the engine library or session cannot be
    /// brought up. No `Session` exists on failure.
    pub fn init(
        token: SubscriberToken,
        subscriber: Arc<dyn EventSubscriber>,
    ) -> Result<Self, InitError> {
        Self::init_with(token, subscriber, SessionConfig::default())
    }

    /// Create a session with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`InitError`] when the engine library or session cannot be
    /// brought up.
    pub fn init_with(
        token: SubscriberToken,
        subscriber: Arc<dyn EventSubscriber>,
        config: SessionConfig,
    ) -> Result<Self, InitError> {
        info!(keep_running = config.keep_running, "initializing engine session");
        let engine = session::create(config)?;
        Ok(Self {
            engine: Mutex::new(engine),
            bridge: EventBridge::new(token, subscriber),
            running: AtomicBool::new(false),
        })
    }

    #[cfg(test)]
    fn with_engine(
        engine: Box<dyn EngineSession>,
        token: SubscriberToken,
        subscriber: Arc<dyn EventSubscriber>,
    ) -> Self {
        Self {
            engine: Mutex::new(engine),
            bridge: EventBridge::new(token, subscriber),
            running: AtomicBool::new(false),
        }
    }

    fn engine(&self) -> MutexGuard<'_, Box<dyn EngineSession>> {
        self.engine.lock().expect("engine session mutex poisoned")
    }

    /// Submit a download by URI.
    ///
    /// Returns the engine-assigned gid, or [`Gid::INVALID`] when the engine
    /// rejects the submission.
    #[must_use]
    pub fn submit_uri(&self, uri: &str) -> Gid {
        let result = self.engine().add_uri(uri);
        result.unwrap_or_else(|err| {
            warn!(uri, error = %err, "uri submission rejected");
            Gid::INVALID
        })
    }

    /// Submit a download from a torrent file, with options in the flat
    /// comma-delimited wire form.
    ///
    /// Malformed options fail the submission before the engine is touched.
    /// Returns [`Gid::INVALID`] on any failure.
    #[must_use]
    pub fn submit_torrent(&self, path: &Path, raw_options: &str) -> Gid {
        let options = match OptionSet::decode(raw_options) {
            Ok(options) => options,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "malformed torrent options");
                return Gid::INVALID;
            }
        };
        let result = self.engine().add_torrent(path, &options);
        result.unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "torrent submission rejected");
            Gid::INVALID
        })
    }

    /// Apply options to an existing download.
    ///
    /// An empty option string is a successful no-op and never reaches the
    /// engine. Malformed options and engine refusals both report `false`.
    #[must_use]
    pub fn change_options(&self, gid: Gid, raw_options: &str) -> bool {
        let options = match OptionSet::decode(raw_options) {
            Ok(options) => options,
            Err(err) => {
                warn!(gid = %gid, error = %err, "malformed download options");
                return false;
            }
        };
        if options.is_empty() {
            return true;
        }
        self.control("change_options", gid, |engine, gid| {
            engine.change_options(gid, &options)
        })
    }

    /// Pause a waiting or active download.
    #[must_use]
    pub fn pause(&self, gid: Gid) -> bool {
        self.control("pause", gid, |engine, gid| engine.pause(gid))
    }

    /// Return a paused download to the waiting queue.
    #[must_use]
    pub fn resume(&self, gid: Gid) -> bool {
        self.control("resume", gid, |engine, gid| engine.resume(gid))
    }

    /// Remove a download from the session.
    #[must_use]
    pub fn remove(&self, gid: Gid) -> bool {
        self.control("remove", gid, |engine, gid| engine.remove(gid))
    }

    fn control(
        &self,
        operation: &'static str,
        gid: Gid,
        op: impl FnOnce(&mut dyn EngineSession, Gid) -> downpour_core::SessionResult<()>,
    ) -> bool {
        let result = op(self.engine().as_mut(), gid);
        if let Err(err) = result {
            warn!(operation, gid = %gid, error = %err, "engine refused control request");
            return false;
        }
        true
    }

    /// Snapshot the current state of one download.
    ///
    /// Absent when the gid is unknown to the engine.
    #[must_use]
    pub fn query_status(&self, gid: Gid) -> Option<DownloadInfo> {
        self.engine().status(gid)
    }

    /// Read a torrent file's metadata without starting a download.
    ///
    /// Registers the torrent in dry-run mode, copies its manifest out, and
    /// removes the transient registration before returning.
    ///
    /// # Errors
    ///
    /// Returns [`InspectError`] when the engine refuses the registration or
    /// yields no handle for it.
    pub fn inspect_torrent(&self, path: &Path) -> Result<TorrentInfo, InspectError> {
        inspect::inspect(self.engine().as_mut(), path)
    }

    /// Drive the engine until it finishes, blocking the calling thread.
    ///
    /// Each iteration performs one engine drive step, then delivers the
    /// events it raised to the subscriber, synchronously and in order. The
    /// loop exits when the engine reports terminal shutdown (all downloads
    /// settled and keep-running disabled).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::LoopActive`] when another thread is already
    /// inside this session's run loop, and [`SessionError::Fatal`] when the
    /// engine's drive step fails unrecoverably.
    pub fn run(&self) -> Result<(), SessionError> {
        if self.running.swap(true, Ordering::Acquire) {
            return Err(SessionError::LoopActive);
        }
        let result = self.drive_loop();
        self.running.store(false, Ordering::Release);
        result
    }

    fn drive_loop(&self) -> Result<(), SessionError> {
        info!("engine run loop started");
        loop {
            let (outcome, events) = {
                let mut engine = self.engine();
                let outcome = engine.drive();
                let events = engine.drain_events();
                (outcome, events)
            };
            // Events raised by a failed drive step are still delivered.
            for (gid, event) in events {
                self.bridge.dispatch(gid, event);
            }
            match outcome {
                Ok(DriveOutcome::Continue) => {}
                Ok(DriveOutcome::Finished) => {
                    info!("engine run loop finished");
                    return Ok(());
                }
                Err(err) => {
                    warn!(error = %err, "engine run loop failed");
                    return Err(err);
                }
            }
        }
    }
}
