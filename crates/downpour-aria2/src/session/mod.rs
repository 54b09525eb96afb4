#![allow(clippy::redundant_pub_crate)]

//! Session abstraction over the download engine.
//!
//! [`EngineSession`] is the seam between the public controller and the
//! engine: the native implementation wraps libaria2 through the cxx bridge
//! when the `libaria2` feature is enabled, and a deterministic in-memory
//! stub stands in otherwise (and in tests).

use std::path::Path;

use downpour_core::{DownloadInfo, InitError, OptionSet, SessionResult};
use downpour_events::{DownloadEvent, Gid};

#[cfg(feature = "libaria2")]
mod native;
#[cfg(any(test, not(feature = "libaria2")))]
mod stub;

#[cfg(test)]
pub(crate) use stub::StubSession;

/// Session-level configuration applied when the engine session is created.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Keep the run loop alive when no downloads are queued.
    ///
    /// Mirrors the engine's keep-running flag: while set, the drive step
    /// keeps reporting the continue outcome even when the queue is idle.
    pub keep_running: bool,
    /// Engine options applied to the session as a whole.
    pub options: OptionSet,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            keep_running: true,
            options: OptionSet::new(),
        }
    }
}

/// Outcome of one engine drive step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DriveOutcome {
    /// The engine has more work; restart the loop.
    Continue,
    /// The engine reached terminal shutdown.
    Finished,
}

/// Raw manifest data read from an engine download handle.
#[derive(Debug, Clone)]
pub(crate) struct EngineManifest {
    pub(crate) info_hash: String,
    pub(crate) dir: String,
    pub(crate) files: Vec<EngineFile>,
}

/// One file entry as the engine reports it (full on-disk path).
#[derive(Debug, Clone)]
pub(crate) struct EngineFile {
    pub(crate) index: u32,
    pub(crate) path: String,
    pub(crate) length: u64,
    pub(crate) selected: bool,
}

/// Synchronous engine session seam.
///
/// Every method is a short, non-blocking call apart from `drive`, which may
/// block while the engine waits for work. Implementations are not expected
/// to be internally synchronized; the controller serializes access behind
/// its own mutex.
pub(crate) trait EngineSession: Send {
    fn add_uri(&mut self, uri: &str) -> SessionResult<Gid>;
    fn add_torrent(&mut self, path: &Path, options: &OptionSet) -> SessionResult<Gid>;
    fn change_options(&mut self, gid: Gid, options: &OptionSet) -> SessionResult<()>;
    fn pause(&mut self, gid: Gid) -> SessionResult<()>;
    fn resume(&mut self, gid: Gid) -> SessionResult<()>;
    fn remove(&mut self, gid: Gid) -> SessionResult<()>;
    fn status(&mut self, gid: Gid) -> Option<DownloadInfo>;
    fn manifest(&mut self, gid: Gid) -> Option<EngineManifest>;
    fn drive(&mut self) -> SessionResult<DriveOutcome>;
    fn drain_events(&mut self) -> Vec<(Gid, DownloadEvent)>;
}

pub(crate) fn create(config: SessionConfig) -> Result<Box<dyn EngineSession>, InitError> {
    #[cfg(feature = "libaria2")]
    {
        native::create(config)
    }

    #[cfg(not(feature = "libaria2"))]
    {
        Ok(Box::new(stub::StubSession::new(config)))
    }
}
