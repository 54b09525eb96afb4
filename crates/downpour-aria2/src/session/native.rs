//! Native engine session backed by libaria2 through the cxx bridge.

use std::path::Path;
use std::pin::Pin;
use std::sync::OnceLock;

use cxx::UniquePtr;
use tracing::debug;

use downpour_core::{DownloadInfo, DownloadStatus, InitError, OptionSet, SessionError, SessionResult};
use downpour_events::{DownloadEvent, Gid};

use crate::ffi::bridge::ffi;

use super::{DriveOutcome, EngineFile, EngineManifest, EngineSession, SessionConfig};

// libraryInit must run once per process, before the first session.
static LIBRARY_INIT: OnceLock<i32> = OnceLock::new();

pub(crate) fn create(config: SessionConfig) -> Result<Box<dyn EngineSession>, InitError> {
    let code = *LIBRARY_INIT.get_or_init(ffi::library_init);
    if code != 0 {
        return Err(InitError::Library { code });
    }

    let SessionConfig {
        keep_running,
        options,
    } = config;
    let (keys, values) = split_pairs(&options);
    let inner = ffi::new_session(&ffi::SessionOptions {
        keep_running,
        keys,
        values,
    });
    if inner.is_null() {
        return Err(InitError::Session {
            message: "aria2 session allocation returned null".to_string(),
        });
    }
    Ok(Box::new(NativeSession { inner }))
}

fn split_pairs(options: &OptionSet) -> (Vec<String>, Vec<String>) {
    options
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .unzip()
}

fn non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

const fn map_status(raw: u8) -> Option<DownloadStatus> {
    match raw {
        0 => Some(DownloadStatus::Active),
        1 => Some(DownloadStatus::Waiting),
        2 => Some(DownloadStatus::Paused),
        3 => Some(DownloadStatus::Error),
        4 => Some(DownloadStatus::Complete),
        5 => Some(DownloadStatus::Removed),
        _ => None,
    }
}

const fn map_event(kind: u8) -> Option<DownloadEvent> {
    match kind {
        1 => Some(DownloadEvent::Started),
        2 => Some(DownloadEvent::Paused),
        3 => Some(DownloadEvent::Stopped),
        4 => Some(DownloadEvent::Completed),
        5 => Some(DownloadEvent::ErrorOccurred),
        6 => Some(DownloadEvent::BtDownloadCompleted),
        _ => None,
    }
}

const fn check(operation: &'static str, code: i32) -> SessionResult<()> {
    if code == 0 {
        Ok(())
    } else {
        Err(SessionError::Rejected { operation, code })
    }
}

struct NativeSession {
    inner: UniquePtr<ffi::Session>,
}

impl NativeSession {
    fn session(&mut self) -> Pin<&mut ffi::Session> {
        self.inner.pin_mut()
    }
}

impl EngineSession for NativeSession {
    fn add_uri(&mut self, uri: &str) -> SessionResult<Gid> {
        let submit = self.session().add_uri(uri);
        if submit.code != 0 {
            return Err(SessionError::Rejected {
                operation: "add_uri",
                code: submit.code,
            });
        }
        Ok(Gid::new(submit.gid))
    }

    fn add_torrent(&mut self, path: &Path, options: &OptionSet) -> SessionResult<Gid> {
        let (keys, values) = split_pairs(options);
        let submit = self
            .session()
            .add_torrent(&path.to_string_lossy(), &keys, &values);
        if submit.code != 0 {
            return Err(SessionError::Rejected {
                operation: "add_torrent",
                code: submit.code,
            });
        }
        Ok(Gid::new(submit.gid))
    }

    fn change_options(&mut self, gid: Gid, options: &OptionSet) -> SessionResult<()> {
        let (keys, values) = split_pairs(options);
        let code = self.session().change_options(gid.as_u64(), &keys, &values);
        check("change_options", code)
    }

    fn pause(&mut self, gid: Gid) -> SessionResult<()> {
        let code = self.session().pause(gid.as_u64());
        check("pause", code)
    }

    fn resume(&mut self, gid: Gid) -> SessionResult<()> {
        let code = self.session().unpause(gid.as_u64());
        check("resume", code)
    }

    fn remove(&mut self, gid: Gid) -> SessionResult<()> {
        let code = self.session().remove(gid.as_u64());
        check("remove", code)
    }

    fn status(&mut self, gid: Gid) -> Option<DownloadInfo> {
        let status = self.session().status(gid.as_u64());
        if !status.ok {
            return None;
        }
        let Some(state) = map_status(status.status) else {
            debug!(gid = %gid, raw = status.status, "ignoring unknown engine status");
            return None;
        };
        Some(DownloadInfo {
            status: state,
            total_length: non_negative(status.total_length),
            bytes_completed: non_negative(status.bytes_completed),
            upload_length: non_negative(status.upload_length),
            download_speed: non_negative(status.download_speed),
            upload_speed: non_negative(status.upload_speed),
        })
    }

    fn manifest(&mut self, gid: Gid) -> Option<EngineManifest> {
        let manifest = self.session().manifest(gid.as_u64());
        if !manifest.ok {
            return None;
        }
        let files = manifest
            .files
            .into_iter()
            .map(|file| EngineFile {
                index: u32::try_from(file.index).unwrap_or(0),
                path: file.path,
                length: non_negative(file.length),
                selected: file.selected,
            })
            .collect();
        Some(EngineManifest {
            info_hash: manifest.info_hash,
            dir: manifest.dir,
            files,
        })
    }

    fn drive(&mut self) -> SessionResult<DriveOutcome> {
        let code = self.session().drive();
        match code {
            1 => Ok(DriveOutcome::Continue),
            code if code < 0 => Err(SessionError::Fatal { code }),
            _ => Ok(DriveOutcome::Finished),
        }
    }

    fn drain_events(&mut self) -> Vec<(Gid, DownloadEvent)> {
        self.session()
            .drain_events()
            .into_iter()
            .filter_map(|event| {
                map_event(event.kind).map_or_else(
                    || {
                        debug!(gid = event.gid, kind = event.kind, "ignoring unknown engine event");
                        None
                    },
                    |mapped| Some((Gid::new(event.gid), mapped)),
                )
            })
            .collect()
    }
}
