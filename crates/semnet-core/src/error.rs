//! Error taxonomy for the network generation pipeline.
//!
//! Every internal failure is mapped to one of these categories at the
//! [`crate::service::NetworkService`] boundary. Clients only ever see the
//! stable category string from [`Error::category`]; raw error details are
//! logged server-side and never leave the process.

use thiserror::Error;

/// Errors produced by the semantic network engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Request parameters were malformed (unknown object type, empty id).
    /// Fatal: no partial graph is returned.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The source object does not exist in the vector store. Fatal.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The vector store could not be reached after one retry. Fatal.
    #[error("vector store unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The request deadline expired before the source object was fetched.
    /// Later deadline hits degrade to a partial graph instead.
    #[error("request deadline exceeded before source fetch")]
    Timeout,

    /// A summarization call failed. Never escapes the service: it is
    /// converted to `summary = null` for the affected level.
    #[error("summarization failed: {0}")]
    Summarization(String),
}

impl Error {
    /// Stable category name exposed in client-facing error payloads.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "InvalidInput",
            Self::NotFound(_) => "NotFound",
            Self::UpstreamUnavailable(_) => "UpstreamUnavailable",
            Self::Timeout => "Timeout",
            Self::Summarization(_) => "SummarizationFailure",
        }
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
