use std::fmt;
use std::sync::Arc;

use crate::error::{Result, VerificationError};
use crate::hasher::Hasher;
use crate::verifier::HashVerifier;

/// Constructor for a fresh hash state.
pub type NewHash = Arc<dyn Fn() -> Option<Box<dyn Hasher>> + Send + Sync>;

/// A hash algorithm paired with the expected digest in hex, either case.
///
/// Nothing is checked until the checksum is turned into a [`HashVerifier`].
#[derive(Clone, Default)]
pub struct HashChecksum {
    pub new_hash:     Option<NewHash>,
    pub expected_hex: String,
}

impl HashChecksum {
    pub fn new<F>(new_hash: F, expected_hex: impl Into<String>) -> Self
    where
        F: Fn() -> Option<Box<dyn Hasher>> + Send + Sync + 'static,
    {
        Self { new_hash: Some(Arc::new(new_hash)), expected_hex: expected_hex.into() }
    }

    #[cfg(feature = "sha2")]
    pub fn sha256(expected_hex: impl Into<String>) -> Self {
        Self::new(|| Some(Box::new(crate::Sha256Hasher::new())), expected_hex)
    }

    #[cfg(feature = "sha2")]
    pub fn sha512(expected_hex: impl Into<String>) -> Self {
        Self::new(|| Some(Box::new(crate::Sha512Hasher::new())), expected_hex)
    }

    #[cfg(feature = "md5")]
    pub fn md5(expected_hex: impl Into<String>) -> Self {
        Self::new(|| Some(Box::new(crate::Md5Hasher::new())), expected_hex)
    }

    #[cfg(feature = "blake3")]
    pub fn blake3(expected_hex: impl Into<String>) -> Self {
        Self::new(|| Some(Box::new(crate::Blake3Hasher::new())), expected_hex)
    }

    /// Builds a verifier with a fresh hash.
    ///
    /// # Errors
    ///
    /// [`VerificationError::HashMissing`] when there is no constructor or it
    /// returns `None`; [`VerificationError::HashExpectedEmpty`] when the
    /// expected digest is empty.
    pub fn verifier(&self) -> Result<HashVerifier> {
        let hasher = self.new_hash.as_ref().and_then(|f| f()).ok_or(VerificationError::HashMissing)?;
        if self.expected_hex.is_empty() {
            return Err(VerificationError::HashExpectedEmpty);
        }
        Ok(HashVerifier::new(hasher, self.expected_hex.clone()))
    }
}

impl fmt::Debug for HashChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashChecksum")
            .field("new_hash", &self.new_hash.as_ref().map(|_| ".."))
            .field("expected_hex", &self.expected_hex)
            .finish()
    }
}
