//! Centralized error types for mailsift.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while parsing a message or loading configuration.
///
/// Every parse variant aborts the whole message. Recoverable problems
/// (unknown charsets, malformed addresses, bad dates) never surface here;
/// they degrade to a best-effort value instead.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The text is not a syntactically valid RFC 5322 / MIME message.
    #[error("Malformed message structure: {0}")]
    Structure(#[source] mailparse::MailParseError),

    /// A part's transfer encoding could not be reversed.
    #[error("Failed to decode {content_type} payload: {source}")]
    Payload {
        content_type: String,
        source: mailparse::MailParseError,
    },

    /// A `Content-Disposition` parameter has no `=`.
    #[error("Malformed Content-Disposition parameter '{param}': expected key=value")]
    DispositionParam { param: String },

    /// The configuration file could not be read or parsed.
    #[error("Invalid configuration in '{}': {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

/// Convenience alias for `Result<T, ParseError>`.
pub type Result<T> = std::result::Result<T, ParseError>;

impl ParseError {
    /// Create a `Config` variant from a path and any displayable cause.
    pub fn config(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::Config {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
