//! Deterministic in-memory engine used for tests and stub builds.
//!
//! Downloads progress a fixed fraction per drive step so lifecycle tests can
//! observe every transition without touching the network or the filesystem.

use std::collections::BTreeMap;
use std::path::Path;
use std::thread;
use std::time::Duration;

use downpour_core::{DownloadInfo, DownloadStatus, OptionSet, SessionError, SessionResult};
use downpour_events::{DownloadEvent, Gid};

use super::{DriveOutcome, EngineFile, EngineManifest, EngineSession, SessionConfig};

const DEFAULT_URI_LENGTH: u64 = 1 << 20;
const PAYLOAD_LENGTH: u64 = 4 * 1024 * 1024;
const README_LENGTH: u64 = 1024;
const DEFAULT_DOWNLOAD_DIR: &str = "/downloads";
const IDLE_WAIT: Duration = Duration::from_millis(5);

#[derive(Debug)]
struct StubDownload {
    status: DownloadStatus,
    total_length: u64,
    bytes_completed: u64,
    options: OptionSet,
    torrent: Option<TorrentSource>,
    bt_complete_raised: bool,
}

#[derive(Debug)]
struct TorrentSource {
    stem: String,
    info_hash: String,
}

/// In-memory stand-in for the native engine session.
pub(crate) struct StubSession {
    config: SessionConfig,
    downloads: BTreeMap<u64, StubDownload>,
    next_gid: u64,
    pending: Vec<(Gid, DownloadEvent)>,
}

impl StubSession {
    pub(crate) const fn new(config: SessionConfig) -> Self {
        Self {
            config,
            downloads: BTreeMap::new(),
            next_gid: 1,
            pending: Vec::new(),
        }
    }

    fn register(&mut self, download: StubDownload) -> Gid {
        let gid = Gid::new(self.next_gid);
        self.downloads.insert(self.next_gid, download);
        self.next_gid += 1;
        gid
    }

    fn download_mut(&mut self, gid: Gid) -> SessionResult<&mut StubDownload> {
        self.downloads
            .get_mut(&gid.as_u64())
            .ok_or(SessionError::UnknownGid { gid })
    }

    fn effective_dir<'a>(&'a self, download: &'a StubDownload) -> &'a str {
        download
            .options
            .get("dir")
            .or_else(|| self.config.options.get("dir"))
            .unwrap_or(DEFAULT_DOWNLOAD_DIR)
    }

    fn has_busy_downloads(&self) -> bool {
        self.downloads.values().any(|download| {
            matches!(
                download.status,
                DownloadStatus::Waiting | DownloadStatus::Active
            )
        })
    }
}

/// Bytes moved per drive step. Three steps plus the remainder finish any
/// download, which keeps lifecycle tests short.
const fn chunk_for(total: u64) -> u64 {
    total / 3 + 1
}

fn synth_info_hash(stem: &str) -> String {
    // FNV-1a over the stem, expanded to the 40 hex digits of an info hash.
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in stem.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    let mut out = String::with_capacity(40);
    for round in 0..5u64 {
        let word = hash.wrapping_add(round.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        out.push_str(&format!("{:08x}", (word >> 16) & 0xffff_ffff));
    }
    out
}

impl EngineSession for StubSession {
    fn add_uri(&mut self, uri: &str) -> SessionResult<Gid> {
        let looks_like_uri = uri.contains("://") || uri.starts_with("magnet:");
        if uri.is_empty() || !looks_like_uri {
            return Err(SessionError::Rejected {
                operation: "add_uri",
                code: -1,
            });
        }
        Ok(self.register(StubDownload {
            status: DownloadStatus::Waiting,
            total_length: DEFAULT_URI_LENGTH,
            bytes_completed: 0,
            options: OptionSet::new(),
            torrent: None,
            bt_complete_raised: false,
        }))
    }

    fn add_torrent(&mut self, path: &Path, options: &OptionSet) -> SessionResult<Gid> {
        if path.extension().and_then(|ext| ext.to_str()) != Some("torrent") {
            return Err(SessionError::Rejected {
                operation: "add_torrent",
                code: -1,
            });
        }
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("torrent")
            .to_string();
        let info_hash = synth_info_hash(&stem);
        Ok(self.register(StubDownload {
            status: DownloadStatus::Waiting,
            total_length: PAYLOAD_LENGTH + README_LENGTH,
            bytes_completed: 0,
            options: options.clone(),
            torrent: Some(TorrentSource { stem, info_hash }),
            bt_complete_raised: false,
        }))
    }

    fn change_options(&mut self, gid: Gid, options: &OptionSet) -> SessionResult<()> {
        let download = self.download_mut(gid)?;
        for (key, value) in options.iter() {
            download.options.push(key, value);
        }
        Ok(())
    }

    fn pause(&mut self, gid: Gid) -> SessionResult<()> {
        let download = self.download_mut(gid)?;
        if !matches!(
            download.status,
            DownloadStatus::Waiting | DownloadStatus::Active
        ) {
            return Err(SessionError::Rejected {
                operation: "pause",
                code: -1,
            });
        }
        download.status = DownloadStatus::Paused;
        self.pending.push((gid, DownloadEvent::Paused));
        Ok(())
    }

    fn resume(&mut self, gid: Gid) -> SessionResult<()> {
        let download = self.download_mut(gid)?;
        if download.status != DownloadStatus::Paused {
            return Err(SessionError::Rejected {
                operation: "resume",
                code: -1,
            });
        }
        download.status = DownloadStatus::Waiting;
        Ok(())
    }

    fn remove(&mut self, gid: Gid) -> SessionResult<()> {
        if self.downloads.remove(&gid.as_u64()).is_none() {
            return Err(SessionError::UnknownGid { gid });
        }
        self.pending.push((gid, DownloadEvent::Stopped));
        Ok(())
    }

    fn status(&mut self, gid: Gid) -> Option<DownloadInfo> {
        let download = self.downloads.get(&gid.as_u64())?;
        let download_speed = if download.status == DownloadStatus::Active {
            chunk_for(download.total_length)
        } else {
            0
        };
        Some(DownloadInfo {
            status: download.status,
            total_length: download.total_length,
            bytes_completed: download.bytes_completed,
            upload_length: 0,
            download_speed,
            upload_speed: 0,
        })
    }

    fn manifest(&mut self, gid: Gid) -> Option<EngineManifest> {
        let download = self.downloads.get(&gid.as_u64())?;
        let torrent = download.torrent.as_ref()?;
        let dir = self.effective_dir(download).to_string();
        let root = format!("{dir}/{}", torrent.stem);
        Some(EngineManifest {
            info_hash: torrent.info_hash.clone(),
            dir,
            files: vec![
                EngineFile {
                    index: 1,
                    path: format!("{root}/payload.bin"),
                    length: PAYLOAD_LENGTH,
                    selected: true,
                },
                EngineFile {
                    index: 2,
                    path: format!("{root}/README.md"),
                    length: README_LENGTH,
                    selected: true,
                },
            ],
        })
    }

    fn drive(&mut self) -> SessionResult<DriveOutcome> {
        let mut progressed = false;
        for (&raw, download) in &mut self.downloads {
            let gid = Gid::new(raw);
            match download.status {
                DownloadStatus::Waiting => {
                    download.status = DownloadStatus::Active;
                    self.pending.push((gid, DownloadEvent::Started));
                    progressed = true;
                }
                DownloadStatus::Active => {
                    let chunk = chunk_for(download.total_length);
                    download.bytes_completed =
                        (download.bytes_completed + chunk).min(download.total_length);
                    progressed = true;
                    if download.bytes_completed == download.total_length {
                        if download.torrent.is_some() && !download.bt_complete_raised {
                            download.bt_complete_raised = true;
                            self.pending.push((gid, DownloadEvent::BtDownloadCompleted));
                        }
                        download.status = DownloadStatus::Complete;
                        self.pending.push((gid, DownloadEvent::Completed));
                    }
                }
                _ => {}
            }
        }

        if self.has_busy_downloads() {
            return Ok(DriveOutcome::Continue);
        }
        if self.config.keep_running {
            if !progressed {
                // The native engine blocks inside its drive step while idle.
                thread::sleep(IDLE_WAIT);
            }
            return Ok(DriveOutcome::Continue);
        }
        Ok(DriveOutcome::Finished)
    }

    fn drain_events(&mut self) -> Vec<(Gid, DownloadEvent)> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn session() -> StubSession {
        StubSession::new(SessionConfig {
            keep_running: false,
            options: OptionSet::new(),
        })
    }

    #[test]
    fn uri_download_runs_to_completion() {
        let mut session = session();
        let gid = session.add_uri("https://example.com/file.iso").expect("uri");

        assert_eq!(session.drive().expect("drive"), DriveOutcome::Continue);
        let info = session.status(gid).expect("active status");
        assert_eq!(info.status, DownloadStatus::Active);

        let mut outcome = DriveOutcome::Continue;
        for _ in 0..8 {
            outcome = session.drive().expect("drive");
            if outcome == DriveOutcome::Finished {
                break;
            }
        }
        assert_eq!(outcome, DriveOutcome::Finished);
        let info = session.status(gid).expect("final status");
        assert_eq!(info.status, DownloadStatus::Complete);
        assert_eq!(info.bytes_completed, info.total_length);

        let events: Vec<DownloadEvent> = session
            .drain_events()
            .into_iter()
            .map(|(_, event)| event)
            .collect();
        assert_eq!(events, vec![DownloadEvent::Started, DownloadEvent::Completed]);
    }

    #[test]
    fn torrent_completion_raises_bt_event_first() {
        let mut session = session();
        let gid = session
            .add_torrent(&PathBuf::from("/tmp/linux.torrent"), &OptionSet::new())
            .expect("torrent");

        for _ in 0..8 {
            if session.drive().expect("drive") == DriveOutcome::Finished {
                break;
            }
        }
        let events: Vec<DownloadEvent> = session
            .drain_events()
            .into_iter()
            .filter(|(event_gid, _)| *event_gid == gid)
            .map(|(_, event)| event)
            .collect();
        assert_eq!(
            events,
            vec![
                DownloadEvent::Started,
                DownloadEvent::BtDownloadCompleted,
                DownloadEvent::Completed,
            ]
        );
    }

    #[test]
    fn rejects_malformed_submissions() {
        let mut session = session();
        assert!(session.add_uri("").is_err());
        assert!(session.add_uri("not a uri").is_err());
        assert!(session.add_uri("magnet:?xt=urn:btih:abc").is_ok());
        assert!(
            session
                .add_torrent(&PathBuf::from("/tmp/file.iso"), &OptionSet::new())
                .is_err()
        );
    }

    #[test]
    fn manifest_honors_dir_option() {
        let mut session = session();
        let mut options = OptionSet::new();
        options.push("dir", "/srv/media");
        let gid = session
            .add_torrent(&PathBuf::from("/tmp/linux.torrent"), &options)
            .expect("torrent");

        let manifest = session.manifest(gid).expect("manifest");
        assert_eq!(manifest.dir, "/srv/media");
        assert!(manifest.files[0].path.starts_with("/srv/media/linux/"));

        // A later option change re-roots the manifest paths.
        let mut update = OptionSet::new();
        update.push("dir", "/mnt/alt");
        session.change_options(gid, &update).expect("change");
        let manifest = session.manifest(gid).expect("manifest");
        assert_eq!(manifest.dir, "/mnt/alt");
        assert_eq!(manifest.files[1].path, "/mnt/alt/linux/README.md");
    }

    #[test]
    fn pause_resume_and_remove_transitions() {
        let mut session = session();
        let gid = session.add_uri("https://example.com/a").expect("uri");

        session.pause(gid).expect("pause from waiting");
        assert_eq!(
            session.status(gid).expect("status").status,
            DownloadStatus::Paused
        );
        assert!(session.pause(gid).is_err(), "pause is not idempotent");

        session.resume(gid).expect("resume");
        assert_eq!(
            session.status(gid).expect("status").status,
            DownloadStatus::Waiting
        );
        assert!(session.resume(gid).is_err(), "resume requires paused");

        session.remove(gid).expect("remove");
        assert!(session.status(gid).is_none());
        assert!(matches!(
            session.remove(gid),
            Err(SessionError::UnknownGid { .. })
        ));
    }

    #[test]
    fn unknown_gid_is_distinguished() {
        let mut session = session();
        let missing = Gid::new(99);
        assert!(matches!(
            session.change_options(missing, &OptionSet::new()),
            Err(SessionError::UnknownGid { .. })
        ));
        assert!(session.manifest(missing).is_none());
    }
}
