use std::io::{self, Read, Write};

use crate::config::{FormatConfig, Layout};
use crate::encoder::{drain, write_counted};
use crate::error::{Error, Latch};
use crate::pool::{PoolRegistry, Pooled};
use crate::table::{alphabet, hi, lo};

/// Streaming hex encoder that inserts a separator every `block_len` source bytes.
///
/// Output accumulates in a pooled buffer that is leased on the first write and
/// handed back after a flush that reaches the sink completely. A flush that
/// stops half way with a retryable error (`WouldBlock`, `TimedOut`) keeps the
/// buffer and resumes where it stopped; other sink errors are latched.
pub struct HexFormatter<W> {
    sink:          W,
    table:         &'static [u8; 16],
    block_len:     usize,
    sep:           Box<[u8]>,
    sep_countdown: usize,
    out:           Option<Pooled<'static>>,
    filled:        usize,
    written:       usize,
    latch:         Latch,
    closed:        bool,
}

impl<W: Write> HexFormatter<W> {
    pub fn new(sink: W, cfg: &FormatConfig) -> Self {
        let (block_len, sep) = match cfg.layout() {
            Layout::Plain => (0, Box::default()),
            Layout::Blocked { block_len, sep } => (block_len.get(), sep),
        };
        Self {
            sink,
            table: alphabet(cfg.upper),
            block_len,
            sep,
            sep_countdown: block_len,
            out: None,
            filled: 0,
            written: 0,
            latch: Latch::default(),
            closed: false,
        }
    }

    pub fn read_from<R: Read>(&mut self, src: R) -> io::Result<u64> {
        self.ready()?;
        drain(src, self)
    }

    /// Flushes pending output and rejects further writes. A second call is a no-op.
    pub fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.ready()?;
        self.flush_buf()?;
        if let Err(e) = self.sink.flush() {
            return Err(self.latch.set(e));
        }
        self.closed = true;
        Ok(())
    }

    pub fn get_ref(&self) -> &W { &self.sink }

    pub fn get_mut(&mut self) -> &mut W { &mut self.sink }

    /// Returns the sink. Output still buffered is discarded; call [`close`](Self::close) first.
    pub fn into_inner(self) -> W { self.sink }

    pub(crate) fn is_closed(&self) -> bool { self.closed }

    pub(crate) fn ready(&self) -> io::Result<()> {
        if self.closed {
            return Err(Error::Closed("hex formatter").into());
        }
        self.latch.check()
    }

    /// Appends the separator (when a block just ended) and the two nibbles of `b`.
    ///
    /// Room for both is made before anything is appended, so a failed call
    /// leaves the countdown untouched and the byte can be offered again.
    pub(crate) fn push_byte(&mut self, b: u8) -> io::Result<()> {
        let sep_due = self.block_len > 0 && self.sep_countdown == 0;
        let need = if sep_due { self.sep.len() + 2 } else { 2 };
        self.reserve(need)?;

        if sep_due {
            let sep = std::mem::take(&mut self.sep);
            let pushed = self.append(&sep);
            self.sep = sep;
            pushed?;
            self.sep_countdown = self.block_len;
        }
        if self.block_len > 0 {
            self.sep_countdown -= 1;
        }
        let pair = [hi(self.table, b), lo(self.table, b)];
        self.append(&pair)
    }

    /// Starts a fresh block: no separator before the next byte.
    pub(crate) fn reset_block(&mut self) { self.sep_countdown = self.block_len; }

    /// Writes `bytes` straight to the sink, after whatever is buffered.
    pub(crate) fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.flush_buf()?;
        write_counted(&mut self.sink, bytes).map_err(|(_, e)| self.latch.set(e))
    }

    /// Writes the unwritten part of the pooled buffer and returns it to the pool.
    pub(crate) fn flush_buf(&mut self) -> io::Result<()> {
        let Some(out) = &self.out else {
            return Ok(());
        };
        match write_counted(&mut self.sink, &out[self.written..self.filled]) {
            Ok(()) => {
                self.out = None;
                self.filled = 0;
                self.written = 0;
                Ok(())
            }
            Err((n, e)) => {
                self.written += n;
                if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) {
                    Err(e)
                } else {
                    Err(self.latch.set(e))
                }
            }
        }
    }

    fn reserve(&mut self, need: usize) -> io::Result<()> {
        let cap = PoolRegistry::global().format.buf_len();
        if self.out.is_some() && self.filled + need > cap {
            self.flush_buf()?;
        }
        Ok(())
    }

    fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        let out = self.out.get_or_insert_with(|| PoolRegistry::global().format.lease());
        if self.filled + bytes.len() <= out.len() {
            out[self.filled..self.filled + bytes.len()].copy_from_slice(bytes);
            self.filled += bytes.len();
            return Ok(());
        }
        // Only a separator longer than the whole buffer gets here.
        self.write_raw(bytes)
    }
}

impl<W: Write> Write for HexFormatter<W> {
    fn write(&mut self, src: &[u8]) -> io::Result<usize> {
        self.ready()?;
        for (i, &b) in src.iter().enumerate() {
            if let Err(e) = self.push_byte(b) {
                return if i > 0 { Ok(i) } else { Err(e) };
            }
        }
        Ok(src.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.ready()?;
        self.flush_buf()?;
        self.sink.flush().map_err(|e| self.latch.set(e))
    }
}

/// Formats `src` in one call.
pub fn format_to_string(src: &[u8], cfg: &FormatConfig) -> String {
    let table = alphabet(cfg.upper);
    let mut out = String::with_capacity(crate::len::formatted(src.len(), cfg));
    let blocks = match cfg.layout() {
        Layout::Plain => None,
        Layout::Blocked { block_len, .. } => Some(block_len.get()),
    };
    for (i, &b) in src.iter().enumerate() {
        if let Some(block_len) = blocks {
            if i > 0 && i % block_len == 0 {
                out.push_str(&cfg.sep);
            }
        }
        out.push(hi(table, b) as char);
        out.push(lo(table, b) as char);
    }
    out
}
