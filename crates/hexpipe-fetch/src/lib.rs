//! HTTP download into a verified, atomically committed file.
//!
//! # Architecture
//!
//! - `http.rs` - [`HttpClient`] trait and the reqwest implementation
//! - `fetcher.rs` - [`Fetcher::download`] and [`Fetcher::update`]
//! - `options.rs` - Per-request configuration
//!
//! # Key Features
//!
//! - **Single-Pass**: checksums are computed by tee sinks while the body streams to disk
//! - **Atomic Placement**: the body lands in a temp file that is renamed only after verification
//! - **Mechanism-Only**: no retries or progress UI; callers decide policy

mod error;
mod fetcher;
mod http;
mod options;

pub use error::{FetchError, Result};
pub use fetcher::{Fetcher, UpdateOutcome};
pub use http::{BoxStream, HttpClient, Response};
pub use options::FetchOptions;

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
