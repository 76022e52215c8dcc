//! Process-wide pools of fixed-size scratch buffers.
//!
//! Each pool hands out boxed slices of exactly one size. A lease is returned
//! when its [`Pooled`] guard drops, so early returns and panics release the
//! buffer too. Pools are independent: initialising one never touches another.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;

/// Staging buffer for bytes read from a source.
pub const SOURCE_CHUNK_LEN: usize = 512;

/// Staging buffer for encoded output (two bytes per source byte).
pub const ENCODE_CHUNK_LEN: usize = SOURCE_CHUNK_LEN * 2;

/// Output buffer owned by a formatter between flushes.
pub const FORMAT_CHUNK_LEN: usize = 1024;

/// Sign plus sixteen nibbles covers every `i64`.
pub const INT64_SCRATCH_LEN: usize = 17;

const MAX_IDLE: usize = 64;

static GLOBAL: Lazy<PoolRegistry> = Lazy::new(PoolRegistry::new);

/// Counters describing the lease traffic of one pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub leased:    u64,
    pub returned:  u64,
    pub allocated: u64,
}

impl PoolStats {
    /// Leases currently held by callers.
    pub fn outstanding(&self) -> u64 { self.leased - self.returned }
}

#[derive(Debug)]
pub struct BufferPool {
    len:       usize,
    idle:      Mutex<Vec<Box<[u8]>>>,
    leased:    AtomicU64,
    returned:  AtomicU64,
    allocated: AtomicU64,
}

impl BufferPool {
    pub const fn new(len: usize) -> Self {
        Self {
            len,
            idle: Mutex::new(Vec::new()),
            leased: AtomicU64::new(0),
            returned: AtomicU64::new(0),
            allocated: AtomicU64::new(0),
        }
    }

    /// Length of every buffer handed out by this pool.
    pub fn buf_len(&self) -> usize { self.len }

    pub fn lease(&self) -> Pooled<'_> {
        let reused = self.idle.lock().unwrap_or_else(PoisonError::into_inner).pop();
        let buf = reused.unwrap_or_else(|| {
            self.allocated.fetch_add(1, Ordering::Relaxed);
            vec![0u8; self.len].into_boxed_slice()
        });
        self.leased.fetch_add(1, Ordering::Relaxed);
        Pooled {
            buf:  Some(buf),
            pool: self,
        }
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            leased:    self.leased.load(Ordering::Relaxed),
            returned:  self.returned.load(Ordering::Relaxed),
            allocated: self.allocated.load(Ordering::Relaxed),
        }
    }

    fn give_back(&self, buf: Box<[u8]>) {
        self.returned.fetch_add(1, Ordering::Relaxed);
        debug_assert_eq!(buf.len(), self.len, "pooled buffer returned with a different length");
        if buf.len() != self.len {
            return;
        }
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < MAX_IDLE {
            idle.push(buf);
        }
    }
}

/// A leased buffer. Returns itself to its pool on drop.
#[derive(Debug)]
pub struct Pooled<'a> {
    buf:  Option<Box<[u8]>>,
    pool: &'a BufferPool,
}

impl Deref for Pooled<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] { self.buf.as_deref().unwrap_or_default() }
}

impl DerefMut for Pooled<'_> {
    fn deref_mut(&mut self) -> &mut [u8] { self.buf.as_deref_mut().unwrap_or_default() }
}

impl Drop for Pooled<'_> {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.pool.give_back(buf);
        }
    }
}

/// The four buffer pools used by the codec.
#[derive(Debug)]
pub struct PoolRegistry {
    pub source: BufferPool,
    pub encode: BufferPool,
    pub format: BufferPool,
    pub int64:  BufferPool,
}

impl Default for PoolRegistry {
    fn default() -> Self { Self::new() }
}

impl PoolRegistry {
    pub const fn new() -> Self {
        Self {
            source: BufferPool::new(SOURCE_CHUNK_LEN),
            encode: BufferPool::new(ENCODE_CHUNK_LEN),
            format: BufferPool::new(FORMAT_CHUNK_LEN),
            int64:  BufferPool::new(INT64_SCRATCH_LEN),
        }
    }

    /// The registry shared by every encoder in the process.
    pub fn global() -> &'static PoolRegistry { &GLOBAL }
}
