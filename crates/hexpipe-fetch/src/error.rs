//! Error types for hexpipe-fetch.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GET {url}: HTTP {status} {text}")]
    HttpStatus { url: String, status: u16, text: String },

    #[error("network error fetching {url}")]
    Network {
        url:    String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error(transparent)]
    Checksum(#[from] hexpipe_verify::VerificationError),

    #[error(transparent)]
    Write(#[from] hexpipe_fs::Error),

    #[error("failed to write response body to {}", path.display())]
    Body {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, FetchError>;
