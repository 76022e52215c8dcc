use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("checksum has no hash constructor, or it produced no hash")]
    HashMissing,

    #[error("checksum has an empty expected digest")]
    HashExpectedEmpty,

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    Mismatch { expected: String, actual: String },

    #[error("failed to read {path}")]
    Io {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, VerificationError>;
