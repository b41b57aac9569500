//! Error types for the Lookup client core.
//!
//! # Design
//! Failures split into two kinds with different propagation rules.
//! [`ServerError`] is data: the server (or the transport framing layer)
//! reported a failure that the caller is expected to inspect, log or
//! display, so it travels inside [`CallResult::Failure`] rather than as an
//! `Err`. [`ClientError`] is reserved for faults the client cannot
//! interpret safely — connectivity loss, malformed XML, a broken path
//! template — and propagates with `?`.
//!
//! [`CallResult::Failure`]: crate::response::CallResult::Failure

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A structured failure reported by the server, or synthesized from a
/// response whose framing made the payload uninterpretable.
///
/// Carries enough detail to log or display without a secondary lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerError {
    /// HTTP status code, or the status carried in the error payload.
    pub status: u16,
    /// Short identifier, e.g. `"NotFound"`, or the HTTP reason phrase when
    /// the error was synthesized from a non-XML response.
    pub code: String,
    /// Human-readable summary.
    pub message: String,
    /// Free-text elaboration; the raw response body for framing failures.
    pub details: Option<String>,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.code, self.status, self.message)
    }
}

/// Fatal faults raised across the invocation boundary.
///
/// Everything recoverable is returned as data instead; see [`ServerError`].
#[derive(Error, Debug)]
pub enum ClientError {
    /// The path template referenced a parameter that was not supplied, or
    /// contained a malformed placeholder. Raised before any network
    /// activity.
    #[error("invalid path template: {0}")]
    Template(String),

    /// An underlying network or TLS failure from the HTTP transport.
    #[error("transport error: {0}")]
    Transport(#[from] Box<ureq::Error>),

    /// The response claimed to be `application/xml` but was not well-formed.
    #[error("malformed XML in response: {0}")]
    MalformedXml(String),

    /// The XML was well-formed but violated the expected payload schema
    /// (e.g. an error element missing its status or message).
    #[error("unexpected payload structure: {0}")]
    Payload(String),
}

impl From<ureq::Error> for ClientError {
    fn from(err: ureq::Error) -> Self {
        ClientError::Transport(Box::new(err))
    }
}
