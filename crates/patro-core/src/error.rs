use std::fmt;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Closed set of failure categories for Patro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Resource acquisition or connectivity failure.
    Network,
    /// Extraction produced something that could not be interpreted.
    Parsing,
    /// Structural or semantic rule violation in calendar data.
    Validation,
    /// Export or read failure on the local filesystem.
    FileSystem,
    /// A fetch exceeded the configured timeout.
    Timeout,
    /// Invalid configuration.
    Config,
    /// Raw collaborator failure that has not been classified yet.
    Unclassified,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Parsing => "parsing",
            ErrorKind::Validation => "validation",
            ErrorKind::FileSystem => "filesystem",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Config => "config",
            ErrorKind::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-wide error type for Patro.
///
/// Every failure carries a [`ErrorKind`] tag, a human-readable message and,
/// optionally, the underlying cause (reachable via
/// [`std::error::Error::source`]).
#[derive(Error, Debug)]
#[error("{kind} error: {message}")]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn parsing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parsing, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn file_system(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FileSystem, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn unclassified(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unclassified, message)
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Timeout
    }

    /// Returns true if this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::Network | ErrorKind::Timeout)
    }

    /// Reclassify a failure raised while fetching a single unit.
    ///
    /// Only [`ErrorKind::Unclassified`] failures are rewritten: a message
    /// matching the timeout pattern becomes [`ErrorKind::Timeout`], anything
    /// else becomes [`ErrorKind::Network`]. Already classified errors pass
    /// through unchanged.
    pub fn classify_fetch_error(self) -> Self {
        if self.kind != ErrorKind::Unclassified {
            return self;
        }
        let kind = if looks_like_timeout(&self.message) {
            ErrorKind::Timeout
        } else {
            ErrorKind::Network
        };
        Self { kind, ..self }
    }
}

fn looks_like_timeout(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("timeout") || lower.contains("timed out")
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::file_system(err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::parsing(err.to_string()).with_source(err)
    }
}
