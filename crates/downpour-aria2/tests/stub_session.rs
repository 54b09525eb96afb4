//! End-to-end exercises of the session controller over the stub engine.

#![cfg(not(feature = "libaria2"))]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;

use downpour_aria2::{Session, SessionConfig};
use downpour_core::{DownloadStatus, OptionSet};
use downpour_events::{DownloadEvent, EventSubscriber, Gid, SubscriberToken};
use downpour_test_support::{RecordingSubscriber, write_sample_torrent};

fn session_with(
    keep_running: bool,
    token: SubscriberToken,
    subscriber: &Arc<RecordingSubscriber>,
) -> Result<Session> {
    let session = Session::init_with(
        token,
        Arc::clone(subscriber) as Arc<dyn EventSubscriber>,
        SessionConfig {
            keep_running,
            options: OptionSet::new(),
        },
    )?;
    Ok(session)
}

#[test]
fn torrent_lifecycle_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let torrent = write_sample_torrent(dir.path(), "linux")?;
    let subscriber = Arc::new(RecordingSubscriber::default());
    let session = session_with(true, SubscriberToken::new(21), &subscriber)?;

    let gid = session.submit_torrent(&torrent, "dir,/srv/media");
    assert!(gid.is_valid());
    assert_eq!(
        session.query_status(gid).map(|info| info.status),
        Some(DownloadStatus::Waiting)
    );

    assert!(session.pause(gid));
    assert_eq!(
        session.query_status(gid).map(|info| info.status),
        Some(DownloadStatus::Paused)
    );
    assert!(!session.pause(gid), "pausing a paused download is refused");

    assert!(session.resume(gid));
    assert_eq!(
        session.query_status(gid).map(|info| info.status),
        Some(DownloadStatus::Waiting)
    );

    assert!(session.remove(gid));
    assert!(session.query_status(gid).is_none());
    assert!(!session.remove(gid), "removal is not idempotent");
    Ok(())
}

#[test]
fn run_loop_delivers_ordered_events_and_finishes() -> Result<()> {
    let subscriber = Arc::new(RecordingSubscriber::default());
    let token = SubscriberToken::new(42);
    let session = Arc::new(session_with(false, token, &subscriber)?);

    let gid = session.submit_uri("https://example.com/file.iso");
    assert!(gid.is_valid());

    let runner = {
        let session = Arc::clone(&session);
        thread::spawn(move || session.run())
    };
    runner.join().expect("run loop thread panicked")?;

    assert!(subscriber.wait_for(2, Duration::from_secs(1)));
    assert_eq!(
        subscriber.events_for(gid),
        vec![DownloadEvent::Started, DownloadEvent::Completed]
    );
    assert!(
        subscriber
            .records()
            .iter()
            .all(|(record_token, _, _)| *record_token == token),
        "every notification carries the init token verbatim"
    );

    assert_eq!(
        session.query_status(gid).map(|info| info.status),
        Some(DownloadStatus::Complete)
    );
    let info = session.query_status(gid).expect("completed download");
    assert_eq!(info.bytes_completed, info.total_length);
    assert!((info.percent_complete() - 100.0).abs() < f64::EPSILON);
    Ok(())
}

#[test]
fn inspection_never_leaks_transient_gids() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let torrent = write_sample_torrent(dir.path(), "linux")?;
    let subscriber = Arc::new(RecordingSubscriber::default());
    let session = session_with(true, SubscriberToken::new(7), &subscriber)?;

    let info = session.inspect_torrent(&torrent)?;
    assert_eq!(info.files.len(), 2);
    assert_eq!(info.files[0].name, "linux/payload.bin");
    assert_eq!(info.files[1].name, "linux/README.md");
    assert_eq!(info.info_hash.len(), 40);
    assert!(info.total_length() > 0);

    // The dry-run registration is gone; its gid resolves to nothing.
    assert!(session.query_status(Gid::new(1)).is_none());

    // Inspection results are plain data and serialize for copy-out.
    let json = serde_json::to_value(&info)?;
    assert_eq!(json["files"][0]["index"], 1);
    assert_eq!(json["files"][1]["name"], "linux/README.md");
    Ok(())
}

#[test]
fn inspection_failures_surface_as_errors() -> Result<()> {
    let subscriber = Arc::new(RecordingSubscriber::default());
    let session = session_with(true, SubscriberToken::new(9), &subscriber)?;

    let err = session
        .inspect_torrent(std::path::Path::new("/tmp/not-a-torrent.iso"))
        .expect_err("non-torrent input is refused");
    assert!(err.to_string().contains("rejected"));
    Ok(())
}
