//! Streaming hexadecimal encoding, block formatting and line dumping.
//!
//! # Architecture
//!
//! - `pool.rs` - Process-wide scratch buffer pools
//! - `table.rs` - Alphabets and the letter-case mask
//! - `len.rs` - Length arithmetic for every output shape
//! - `encoder.rs` / `formatter.rs` / `dumper.rs` - Streaming writers, each layered on the previous
//! - `int64.rs` - Fixed-width integer rendering
//! - `compare.rs` - Case-insensitive comparison against raw bytes
//!
//! # Key Features
//!
//! - **Streaming**: every writer is a [`std::io::Write`] over any sink
//! - **Pooled**: scratch buffers are leased per write and returned on drop
//! - **Latched errors**: the first sink failure sticks until the writer is dropped
//!
//! # Example
//!
//! ```
//! use std::io::Write;
//! use hexpipe_codec::{FormatConfig, HexFormatter};
//!
//! let cfg = FormatConfig::new().sep(" ").block_len(2);
//! let mut f = HexFormatter::new(Vec::new(), &cfg);
//! f.write_all(b"\x00\x01\x02").unwrap();
//! f.close().unwrap();
//! assert_eq!(f.into_inner(), b"0001 02");
//! ```

pub use self::compare::{can_encode_to, can_encode_to_prefix};
pub use self::config::{DumpConfig, FormatConfig, Layout, Lines, PrefixFn, SuffixFn};
pub use self::dumper::{HexDumper, canonical, dump_to_vec};
pub use self::encoder::{HexEncoder, encode, encode_to_string};
pub use self::error::{Error, Result};
pub use self::formatter::{HexFormatter, format_to_string};
pub use self::int64::{dst_len, encode_int64, encode_int64_into, write_int64};
pub use self::pool::{BufferPool, PoolRegistry, PoolStats, Pooled};
pub use self::table::{CASE_DIFF, LOWER, UPPER, alphabet};

pub mod len;
pub mod pool;

mod compare;
mod config;
mod dumper;
mod encoder;
mod error;
mod formatter;
mod int64;
mod table;
