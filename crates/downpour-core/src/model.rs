//! Core download domain types and DTOs shared across the workspace.

use serde::{Deserialize, Serialize};

/// High-level download states reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    /// The download is currently transferring data.
    Active,
    /// The download is queued and waiting for a slot.
    Waiting,
    /// The download was paused by the caller.
    Paused,
    /// The engine stopped the download with an error.
    Error,
    /// The download finished.
    Complete,
    /// The download was removed by the caller.
    Removed,
}

impl DownloadStatus {
    /// Whether the download can make further progress in this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Error | Self::Complete | Self::Removed)
    }
}

/// Point-in-time snapshot of one download.
///
/// A fresh snapshot is produced per query; nothing is cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadInfo {
    /// Current lifecycle state.
    pub status: DownloadStatus,
    /// Total payload size in bytes.
    pub total_length: u64,
    /// Bytes downloaded so far.
    pub bytes_completed: u64,
    /// Bytes uploaded so far (BitTorrent seeding).
    pub upload_length: u64,
    /// Current download rate in bytes per second.
    pub download_speed: u64,
    /// Current upload rate in bytes per second.
    pub upload_speed: u64,
}

impl DownloadInfo {
    /// Calculate the completion percentage (0-100).
    #[must_use]
    pub fn percent_complete(&self) -> f64 {
        if self.total_length == 0 {
            0.0
        } else {
            (to_f64(self.bytes_completed) / to_f64(self.total_length)) * 100.0
        }
    }
}

const fn to_f64(value: u64) -> f64 {
    #[expect(
        clippy::cast_precision_loss,
        reason = "u64 to f64 conversion is required for user-facing percentage reporting"
    )]
    {
        value as f64
    }
}

/// Metadata extracted from a torrent file by a dry-run inspection.
///
/// Immutable once constructed; request-scoped and never associated with a
/// live download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TorrentInfo {
    /// Hex-encoded info-hash of the torrent.
    pub info_hash: String,
    /// File manifest declared by the torrent.
    pub files: Vec<FileInfo>,
}

impl TorrentInfo {
    /// Sum of all declared file lengths in bytes.
    #[must_use]
    pub fn total_length(&self) -> u64 {
        self.files.iter().map(|file| file.length).sum()
    }
}

/// Individual file within a torrent manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// 1-based index matching the engine's file numbering.
    pub index: u32,
    /// Path relative to the download root.
    pub name: String,
    /// Declared file size in bytes.
    pub length: u64,
    /// Whether the file is selected for download.
    pub selected: bool,
}
