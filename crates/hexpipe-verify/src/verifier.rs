use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hexpipe_codec::{can_encode_to, encode_to_string};

use crate::error::{Result, VerificationError};
use crate::hasher::Hasher;

/// Write sink that hashes everything it receives and compares the digest
/// with an expected hex string.
///
/// Clones share one hash state, so a verifier can be handed to a pipeline
/// as a sink while a clone is kept to ask [`matches`](Self::matches) later.
#[derive(Clone)]
pub struct HashVerifier {
    hasher:   Arc<Mutex<Box<dyn Hasher>>>,
    expected: Arc<str>,
}

impl HashVerifier {
    pub fn new(hasher: Box<dyn Hasher>, expected_hex: impl Into<Arc<str>>) -> Self {
        Self { hasher: Arc::new(Mutex::new(hasher)), expected: expected_hex.into() }
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Hasher>> {
        self.hasher.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn update(&self, data: &[u8]) { self.lock().update(data); }

    /// Whether the digest so far equals the expected one, ignoring letter case.
    /// The hash state is left untouched.
    pub fn matches(&self) -> bool {
        let digest = self.lock().digest();
        can_encode_to(&digest, self.expected.as_bytes())
    }

    /// Like [`matches`](Self::matches), reporting both digests on mismatch.
    pub fn check(&self) -> Result<()> {
        let digest = self.lock().digest();
        if can_encode_to(&digest, self.expected.as_bytes()) {
            return Ok(());
        }
        Err(VerificationError::Mismatch {
            expected: self.expected.to_string(),
            actual:   encode_to_string(&digest, false),
        })
    }

    pub fn reset(&self) { self.lock().reset(); }

    pub fn expected_hex(&self) -> &str { &self.expected }

    /// Lowercase hex of the digest so far.
    pub fn digest_hex(&self) -> String { encode_to_string(&self.lock().digest(), false) }
}

impl Write for HashVerifier {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl std::fmt::Debug for HashVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashVerifier").field("expected", &self.expected).finish_non_exhaustive()
    }
}
