use digest::{Digest, Reset};

/// Incremental hash with a non-consuming digest.
///
/// `digest` may be called any number of times between updates; only
/// `reset` returns the state to empty.
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);

    fn digest(&self) -> Vec<u8>;

    fn reset(&mut self);

    /// Digest length in bytes.
    fn output_size(&self) -> usize;
}

impl<H: Hasher + ?Sized> Hasher for Box<H> {
    fn update(&mut self, data: &[u8]) { (**self).update(data) }
    fn digest(&self) -> Vec<u8> { (**self).digest() }
    fn reset(&mut self) { (**self).reset() }
    fn output_size(&self) -> usize { (**self).output_size() }
}

/// Adapter for any RustCrypto [`Digest`].
#[derive(Clone, Default)]
pub struct DigestHasher<D>(D);

impl<D: Digest> DigestHasher<D> {
    pub fn new() -> Self { Self(D::new()) }
}

impl<D: Digest + Reset + Clone + Send> Hasher for DigestHasher<D> {
    fn update(&mut self, data: &[u8]) { Digest::update(&mut self.0, data); }

    fn digest(&self) -> Vec<u8> { self.0.clone().finalize().to_vec() }

    fn reset(&mut self) { Digest::reset(&mut self.0); }

    fn output_size(&self) -> usize { <D as Digest>::output_size() }
}

#[cfg(feature = "sha2")]
pub type Sha256Hasher = DigestHasher<sha2::Sha256>;

#[cfg(feature = "sha2")]
pub type Sha512Hasher = DigestHasher<sha2::Sha512>;

#[cfg(feature = "md5")]
pub type Md5Hasher = DigestHasher<md5::Md5>;

#[cfg(feature = "blake3")]
#[derive(Clone, Default)]
pub struct Blake3Hasher(blake3::Hasher);

#[cfg(feature = "blake3")]
impl Blake3Hasher {
    pub fn new() -> Self { Self(blake3::Hasher::new()) }
}

#[cfg(feature = "blake3")]
impl Hasher for Blake3Hasher {
    fn update(&mut self, data: &[u8]) { self.0.update(data); }

    fn digest(&self) -> Vec<u8> { self.0.finalize().as_bytes().to_vec() }

    fn reset(&mut self) { self.0.reset(); }

    fn output_size(&self) -> usize { blake3::OUT_LEN }
}
