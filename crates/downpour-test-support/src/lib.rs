#![forbid(unsafe_code)]
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

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (torrent file fixtures), subscribers.rs (recording
//! event subscribers).

pub mod fixtures;
pub mod subscribers;

pub use fixtures::write_sample_torrent;
pub use subscribers::RecordingSubscriber;
