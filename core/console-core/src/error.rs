//! Error types for console operations.
//!
//! Nothing here is fatal to the process: the worst outcome of any of these
//! is a forced return to the token entry screen.

use jointscope_protocol::ErrorInfo;

/// All errors that can occur in console-core operations and in the transport
/// layers built on top of it.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    // ─────────────────────────────────────────────────────────────────────
    // Readiness errors (non-fatal, resolved by re-check or re-entry)
    // ─────────────────────────────────────────────────────────────────────
    #[error("Readiness check failed: {0}")]
    ReadinessFetch(String),

    #[error("No access token supplied and none stored")]
    MissingToken,

    #[error("Invalid endpoint configuration: {0}")]
    InvalidConfig(String),

    // ─────────────────────────────────────────────────────────────────────
    // Channel errors (session-ending)
    // ─────────────────────────────────────────────────────────────────────
    #[error("Live channel closed: {0}")]
    ChannelClosed(String),

    #[error("Live channel could not be established: {0}")]
    ChannelConnect(String),

    // ─────────────────────────────────────────────────────────────────────
    // Action errors (transient, state rolled back)
    // ─────────────────────────────────────────────────────────────────────
    #[error("Action rejected by server: {action}: {details}")]
    ActionRejected { action: String, details: String },

    #[error("Action request failed: {action}: {details}")]
    ActionTransport { action: String, details: String },

    #[error("Reset is unavailable while inference is in progress")]
    InferenceActive,

    #[error("Invalid action parameters: {0}")]
    InvalidAction(ErrorInfo),

    #[error("Response arrived for a torn-down session; discarded")]
    StaleSession,

    // ─────────────────────────────────────────────────────────────────────
    // I/O errors (token store)
    // ─────────────────────────────────────────────────────────────────────
    #[error("Token store I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using ConsoleError.
pub type Result<T> = std::result::Result<T, ConsoleError>;
