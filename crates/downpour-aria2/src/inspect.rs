//! Torrent inspection via dry-run registration.
//!
//! The engine has no standalone metadata parser, so inspection registers the
//! torrent with `dry-run` enabled, copies the manifest out of the transient
//! handle, and removes the handle again before returning. The transient gid
//! never escapes this module.

use std::path::Path;

use tracing::debug;

use downpour_core::{FileInfo, InspectError, OptionSet, TorrentInfo};
use downpour_events::Gid;

use crate::session::{EngineManifest, EngineSession};

pub(crate) fn inspect(
    session: &mut dyn EngineSession,
    path: &Path,
) -> Result<TorrentInfo, InspectError> {
    let mut options = OptionSet::new();
    options.push("dry-run", "true");

    let gid = session
        .add_torrent(path, &options)
        .map_err(|source| InspectError::RegistrationFailed { source })?;

    let result = read_manifest(session, gid);

    // Cleanup failure must not mask the primary result.
    if let Err(err) = session.remove(gid) {
        debug!(gid = %gid, error = %err, "failed to remove transient inspection download");
    }

    result
}

fn read_manifest(
    session: &mut dyn EngineSession,
    gid: Gid,
) -> Result<TorrentInfo, InspectError> {
    let Some(manifest) = session.manifest(gid) else {
        return Err(InspectError::HandleUnavailable { gid });
    };
    let EngineManifest {
        info_hash,
        dir,
        files,
    } = manifest;

    let files = files
        .into_iter()
        .map(|file| FileInfo {
            index: file.index,
            name: manifest_name(&dir, &file.path),
            length: file.length,
            selected: file.selected,
        })
        .collect();

    Ok(TorrentInfo { info_hash, files })
}

/// Reduce an engine file path to its name relative to the download root.
///
/// Falls back to the full path when the engine reports a file outside the
/// configured directory.
fn manifest_name(dir: &str, path: &str) -> String {
    path.strip_prefix(dir)
        .map(|rest| rest.trim_start_matches('/'))
        .filter(|rest| !rest.is_empty())
        .map_or_else(|| path.to_string(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use downpour_core::{DownloadInfo, SessionError, SessionResult};
    use downpour_events::DownloadEvent;

    use crate::session::{DriveOutcome, SessionConfig, StubSession};

    #[test]
    fn manifest_names_are_relative_to_download_root() {
        assert_eq!(manifest_name("/downloads", "/downloads/iso/a.bin"), "iso/a.bin");
        assert_eq!(manifest_name("/downloads", "/downloads/a.bin"), "a.bin");
        assert_eq!(manifest_name("/other", "/downloads/a.bin"), "/downloads/a.bin");
        assert_eq!(manifest_name("/downloads", "/downloads"), "/downloads");
        assert_eq!(manifest_name("", "relative/a.bin"), "relative/a.bin");
    }

    #[test]
    fn inspection_copies_manifest_and_removes_handle() {
        let mut session = StubSession::new(SessionConfig::default());
        let info = inspect(&mut session, &PathBuf::from("/tmp/linux.torrent"))
            .expect("inspection succeeds");

        assert_eq!(info.files.len(), 2);
        assert_eq!(info.files[0].name, "linux/payload.bin");
        assert_eq!(info.files[1].name, "linux/README.md");
        assert_eq!(info.info_hash.len(), 40);

        // The transient registration must be gone afterwards.
        assert!(session.status(Gid::new(1)).is_none());
    }

    #[test]
    fn inspection_rejects_non_torrent_paths() {
        let mut session = StubSession::new(SessionConfig::default());
        let err = inspect(&mut session, &PathBuf::from("/tmp/file.iso"))
            .expect_err("non-torrent path is refused");
        assert!(matches!(err, InspectError::RegistrationFailed { .. }));
    }

    /// Accepts registrations but never yields a handle, recording removals.
    struct HandleLessSession {
        removed: Vec<Gid>,
    }

    impl EngineSession for HandleLessSession {
        fn add_uri(&mut self, _uri: &str) -> SessionResult<Gid> {
            Err(SessionError::Rejected {
                operation: "add_uri",
                code: -1,
            })
        }

        fn add_torrent(&mut self, _path: &Path, _options: &OptionSet) -> SessionResult<Gid> {
            Ok(Gid::new(7))
        }

        fn change_options(&mut self, gid: Gid, _options: &OptionSet) -> SessionResult<()> {
            Err(SessionError::UnknownGid { gid })
        }

        fn pause(&mut self, gid: Gid) -> SessionResult<()> {
            Err(SessionError::UnknownGid { gid })
        }

        fn resume(&mut self, gid: Gid) -> SessionResult<()> {
            Err(SessionError::UnknownGid { gid })
        }

        fn remove(&mut self, gid: Gid) -> SessionResult<()> {
            self.removed.push(gid);
            Ok(())
        }

        fn status(&mut self, _gid: Gid) -> Option<DownloadInfo> {
            None
        }

        fn manifest(&mut self, _gid: Gid) -> Option<EngineManifest> {
            None
        }

        fn drive(&mut self) -> SessionResult<DriveOutcome> {
            Ok(DriveOutcome::Finished)
        }

        fn drain_events(&mut self) -> Vec<(Gid, DownloadEvent)> {
            Vec::new()
        }
    }

    #[test]
    fn cleanup_runs_even_when_the_manifest_is_missing() {
        let mut session = HandleLessSession { removed: Vec::new() };
        let err = inspect(&mut session, &PathBuf::from("/tmp/linux.torrent"))
            .expect_err("missing manifest is an error");
        assert!(matches!(
            err,
            InspectError::HandleUnavailable { gid } if gid == Gid::new(7)
        ));
        assert_eq!(session.removed, vec![Gid::new(7)]);
    }
}
