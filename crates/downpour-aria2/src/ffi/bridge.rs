#[cxx::bridge(namespace = "downpour")]
/// Native bridge types and functions exposed to Rust.
pub mod ffi {
    /// Options used when constructing an aria2 session.
    #[derive(Debug)]
    struct SessionOptions {
        /// Keep the run loop alive when the queue is idle.
        keep_running: bool,
        /// Session option keys, paired positionally with `values`.
        keys: Vec<String>,
        /// Session option values, paired positionally with `keys`.
        values: Vec<String>,
    }

    /// Result of a download submission.
    #[derive(Debug)]
    struct NativeSubmit {
        /// Engine-assigned gid; zero when the submission failed.
        gid: u64,
        /// Engine status code; negative on failure.
        code: i32,
    }

    /// One file entry from a download's manifest.
    #[derive(Debug)]
    struct NativeFile {
        /// 1-based index assigned by the engine.
        index: i32,
        /// Full on-disk path as the engine reports it.
        path: String,
        /// Declared length in bytes.
        length: i64,
        /// Whether the file is selected for download.
        selected: bool,
    }

    /// Manifest snapshot for one download handle.
    #[derive(Debug)]
    struct NativeManifest {
        /// Whether the handle was found.
        ok: bool,
        /// Hex-encoded info-hash, empty for non-torrent downloads.
        info_hash: String,
        /// Configured download directory for the handle.
        dir: String,
        /// Declared files.
        files: Vec<NativeFile>,
    }

    /// Status snapshot for one download handle.
    #[derive(Debug)]
    struct NativeStatus {
        /// Whether the handle was found.
        ok: bool,
        /// Engine status discriminant (active..removed).
        status: u8,
        /// Total payload size in bytes.
        total_length: i64,
        /// Bytes downloaded so far.
        bytes_completed: i64,
        /// Bytes uploaded so far.
        upload_length: i64,
        /// Current download rate in bytes per second.
        download_speed: i64,
        /// Current upload rate in bytes per second.
        upload_speed: i64,
    }

    /// One queued engine event.
    #[derive(Debug)]
    struct NativeEvent {
        /// Download the event refers to.
        gid: u64,
        /// Raw engine event code.
        kind: u8,
    }

    unsafe extern "C++" {
        include!("downpour/aria2_session.hpp");

        /// Opaque handle to the native aria2 session.
        type Session;

        /// Initialize the aria2 library; must precede any session.
        #[must_use]
        fn library_init() -> i32;

        /// Create a new aria2 session with the provided options.
        #[must_use]
        fn new_session(options: &SessionOptions) -> UniquePtr<Session>;

        /// Queue a download by URI.
        #[must_use]
        fn add_uri(self: Pin<&mut Session>, uri: &str) -> NativeSubmit;
        /// Queue a download from a torrent file.
        #[must_use]
        fn add_torrent(
            self: Pin<&mut Session>,
            path: &str,
            keys: &[String],
            values: &[String],
        ) -> NativeSubmit;
        /// Apply options to an existing download.
        #[must_use]
        fn change_options(
            self: Pin<&mut Session>,
            gid: u64,
            keys: &[String],
            values: &[String],
        ) -> i32;
        /// Pause a download.
        #[must_use]
        fn pause(self: Pin<&mut Session>, gid: u64) -> i32;
        /// Return a paused download to the waiting queue.
        #[must_use]
        fn unpause(self: Pin<&mut Session>, gid: u64) -> i32;
        /// Remove a download from the session.
        #[must_use]
        fn remove(self: Pin<&mut Session>, gid: u64) -> i32;
        /// Snapshot the status of a download.
        #[must_use]
        fn status(self: Pin<&mut Session>, gid: u64) -> NativeStatus;
        /// Snapshot the manifest of a download.
        #[must_use]
        fn manifest(self: Pin<&mut Session>, gid: u64) -> NativeManifest;
        /// Perform one engine run step; returns the raw engine code.
        #[must_use]
        fn drive(self: Pin<&mut Session>) -> i32;
        /// Take all events queued since the last call.
        #[must_use]
        fn drain_events(self: Pin<&mut Session>) -> Vec<NativeEvent>;
    }
}
