//! Error types for the download session core.
//!
//! The public session boundary deliberately collapses failures to the
//! uniform `0` / `false` / absent convention; these richer kinds exist so
//! the adapter and its callers can attach diagnostics without widening that
//! contract.

use thiserror::Error;

use downpour_events::Gid;

/// Malformed option wire strings, detected before touching the engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// The flat key/value sequence did not pair up.
    #[error("option string has an odd number of comma-separated tokens ({count})")]
    OddTokenCount {
        /// Number of tokens found in the input.
        count: usize,
    },
}

/// Fatal failures during session initialization.
///
/// Init failures prevent all further operations; there is no `Session`
/// value to call them on.
#[derive(Debug, Error)]
pub enum InitError {
    /// The engine library failed to initialize.
    #[error("engine library initialization failed (code {code})")]
    Library {
        /// Status code reported by the engine library.
        code: i32,
    },
    /// The engine session could not be created.
    #[error("engine session creation failed: {message}")]
    Session {
        /// Description of the creation failure.
        message: String,
    },
}

/// Failures reported by the engine for session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The engine rejected a submission or control request.
    #[error("engine rejected {operation} (code {code})")]
    Rejected {
        /// Operation that was refused.
        operation: &'static str,
        /// Status code reported by the engine.
        code: i32,
    },
    /// The gid is unknown to the engine.
    #[error("unknown download handle {gid}")]
    UnknownGid {
        /// Handle that could not be resolved.
        gid: Gid,
    },
    /// Another thread is already inside the session's run loop.
    #[error("engine run loop is already active for this session")]
    LoopActive,
    /// The engine's drive step failed unrecoverably.
    #[error("engine run loop failed (code {code})")]
    Fatal {
        /// Status code reported by the drive step.
        code: i32,
    },
}

/// Failures while inspecting a torrent file via dry-run registration.
#[derive(Debug, Error)]
pub enum InspectError {
    /// The engine refused the dry-run registration.
    #[error("torrent registration was rejected by the engine")]
    RegistrationFailed {
        /// Underlying engine refusal.
        #[source]
        source: SessionError,
    },
    /// No handle was available for the transient gid after registration.
    #[error("download handle unavailable for transient gid {gid}")]
    HandleUnavailable {
        /// Transient gid produced by the dry-run registration.
        gid: Gid,
    },
}

/// Convenience alias for session operation results.
pub type SessionResult<T> = Result<T, SessionError>;
