//! Error kinds raised by the session's collaborators.
//!
//! None of these leave the session: each one is turned into display
//! text or a log line in `QuoteSession::complete`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The sanitized body was not a JSON object or array.
    #[error("quote payload is not valid JSON: {0}")]
    Decode(String),

    /// The request failed and the connectivity probe found no route.
    #[error("no network connection")]
    Unreachable,

    /// The request failed while the network looked reachable.
    #[error("quote request failed: {0}")]
    Network(String),

    #[error("quote payload is not UTF-8")]
    NotText,
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("failed to launch `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },
}
