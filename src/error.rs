use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of failures, used by the CLI for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Network,
    FileSystem,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid {field} '{value}': {reason}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid webapp name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("no supported browser found.")]
    NoBrowser { supported: Vec<String> },

    #[error("webapp with name '{0}' does not exist.")]
    AppNotFound(String),

    #[error("failed to download file: {url}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to initialise the HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("failed to download file: {url} (HTTP status {status})")]
    HttpStatus { url: String, status: u16 },

    #[error("failed to {context} {path:?}")]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not determine the home directory")]
    NoHomeDir,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidUrl { .. } | Error::InvalidName { .. } => ErrorKind::Validation,
            Error::NoBrowser { .. } | Error::AppNotFound(_) => ErrorKind::NotFound,
            Error::Http { .. } | Error::HttpStatus { .. } | Error::HttpClient(_) => {
                ErrorKind::Network
            }
            Error::Io { .. } | Error::NoHomeDir => ErrorKind::FileSystem,
        }
    }

    /// Remediation line printed under the error, if there is one.
    pub fn hint(&self) -> Option<String> {
        match self {
            Error::NoBrowser { supported } => {
                Some(format!("-> supported browsers: {}", supported.join(", ")))
            }
            Error::AppNotFound(_) => Some("-> tip: make sure that the case is matching.".into()),
            Error::HttpStatus { .. } | Error::Http { .. } => {
                Some("-> tip: check that the icon url points to a reachable image.".into())
            }
            _ => None,
        }
    }

    pub(crate) fn io(
        context: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Error::Io {
            context,
            path: path.into(),
            source,
        }
    }
}
