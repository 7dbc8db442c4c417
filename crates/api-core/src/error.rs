//! Error types for API client operations

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("cannot load trust anchor {path}: {source}")]
    TrustAnchor {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("login rejected with status {status}")]
    LoginFailed { status: u16 },

    #[error("login response carried no usable session cookie")]
    SessionMissing,

    #[error("channel listing failed with status {status}")]
    ListingFailed { status: u16 },

    #[error("{endpoint} failed with status {status}")]
    ApiFailure {
        endpoint: &'static str,
        status: u16,
    },

    #[error("no job created for system {sid}")]
    ScheduleRejected { sid: i64 },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
