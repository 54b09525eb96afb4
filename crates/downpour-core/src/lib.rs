//! Engine-agnostic download domain types and errors shared across the
//! workspace.

pub mod error;
pub mod model;
pub mod options;

pub use downpour_events::Gid;
pub use error::{FormatError, InitError, InspectError, SessionError, SessionResult};
pub use model::{DownloadInfo, DownloadStatus, FileInfo, TorrentInfo};
pub use options::OptionSet;
