//! Checksum verification for streamed content.
//!
//! A [`HashChecksum`] names a hash algorithm and the digest a byte stream is
//! expected to produce, as hex in either letter case. Turning it into a
//! [`HashVerifier`] yields a write sink that hashes whatever it is fed;
//! [`HashVerifier::matches`] compares the running digest against the
//! expectation without encoding it.
//!
//! # Key Features
//!
//! - **Incremental**: digests are computed as data streams through
//! - **Non-consuming**: `matches` can be asked at any point, the hash keeps going
//! - **Extensible**: the minimal [`Hasher`] trait wraps any RustCrypto digest
//!
//! # Example
//!
//! ```
//! # #[cfg(feature = "sha2")] {
//! use std::io::Write;
//! use hexpipe_verify::HashChecksum;
//!
//! let checksum =
//!     HashChecksum::sha256("B94D27B9934D3E08A52E52D7DA7DABFAC484EFE37A5380EE9088F7ACE2EFCDE9");
//! let mut verifier = checksum.verifier().unwrap();
//! verifier.write_all(b"hello world").unwrap();
//! assert!(verifier.matches());
//! # }
//! ```

pub use self::checksum::{HashChecksum, NewHash};
pub use self::error::{Result, VerificationError};
pub use self::file::verify_file;
pub use self::hasher::{DigestHasher, Hasher};
pub use self::verifier::HashVerifier;

#[cfg(feature = "sha2")]
pub use self::hasher::{Sha256Hasher, Sha512Hasher};

#[cfg(feature = "md5")]
pub use self::hasher::Md5Hasher;

#[cfg(feature = "blake3")]
pub use self::hasher::Blake3Hasher;

mod checksum;
mod error;
mod file;
mod hasher;
mod verifier;
