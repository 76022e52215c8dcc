//! Layered file writing with staging, verification and atomic commit.
//!
//! A [`Writer`] picks its layers from the destination name: `.gz` adds a
//! gzip encoder, `.tar` (or `.tgz`) adds tar framing driven by
//! [`Writer::write_header`]. Every byte that reaches the file is also copied
//! to the tee sinks in [`WriteOptions`], typically hash verifiers, so they see
//! exactly what lands on disk.
//!
//! # Architecture
//!
//! - `writer.rs` - Open, write, close state machine and commit/rollback
//! - `layer.rs` - Layer trait, tee and gzip stages
//! - `tar_layer.rs` - Streaming tar framing with an entry-size budget
//! - `reader.rs` - The read side: gzip peeling and tar entries via `tar::Archive`
//! - `options.rs` - Builders for both
//!
//! # Key Features
//!
//! - **Backup mode**: writes go to `<name>.<random>.tmp`; a clean close renames it
//! - **Verification at close**: a predicate decides whether to commit
//! - **Latched errors**: the first failure sticks and is reported by `close`
//!
//! # Example
//!
//! ```
//! use std::io::Write;
//! use hexpipe_fs::{Writer, WriteOptions};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("out.txt");
//!
//! let mut w = Writer::open(&path, WriteOptions::new().backup(true).verify_fn(|| false)).unwrap();
//! w.write_all(b"rejected").unwrap();
//! assert!(w.close().unwrap_err().is_verification_failure());
//! assert!(!path.exists());
//! ```

pub use self::error::{Error, Result};
pub use self::options::{DEFAULT_BUF_SIZE, DEFAULT_PERM, ReadOptions, TeeSink, VerifyFn, WriteOptions};
pub use self::reader::{Entries, Reader, TarEntry};
pub use self::writer::Writer;

/// Re-exported for building entry headers.
pub use tar::Header;

mod error;
mod ext;
mod layer;
mod options;
mod reader;
mod tar_layer;
mod writer;
