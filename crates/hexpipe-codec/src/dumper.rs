use std::io::{self, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::{DumpConfig, FormatConfig, Lines, PrefixFn, SuffixFn};
use crate::encoder::drain;
use crate::formatter::HexFormatter;

/// Line-framed hex dumper.
///
/// Every line is `prefix() + blocks + suffix(line bytes) + line_sep`. Without a
/// valid line layout the dumper writes exactly what a [`HexFormatter`] would.
///
/// # Examples
///
/// ```
/// use std::io::Write;
/// use hexpipe_codec::{DumpConfig, FormatConfig, HexDumper};
///
/// let cfg = DumpConfig::new(FormatConfig::new().sep(" ").block_len(2))
///     .blocks_per_line(2)
///     .line_sep("\n")
///     .suffix(|line| format!("  {}", String::from_utf8_lossy(line)).into_bytes());
///
/// let mut dumper = HexDumper::new(Vec::new(), cfg);
/// dumper.write_all(b"hello").unwrap();
/// dumper.close().unwrap();
/// assert_eq!(dumper.into_inner(), b"6865 6c6c  hell\n6f  o\n");
/// ```
pub struct HexDumper<W> {
    fmt:            HexFormatter<W>,
    bytes_per_line: usize,
    line_countdown: usize,
    line:           Option<Box<[u8]>>,
    line_sep:       Box<[u8]>,
    prefix:         Option<PrefixFn>,
    suffix:         Option<SuffixFn>,
    used:           bool,
    /// A full line was accepted but its suffix and separator are not out yet.
    eol_pending:    bool,
}

impl<W: Write> HexDumper<W> {
    pub fn new(sink: W, cfg: DumpConfig) -> Self {
        let bytes_per_line = match cfg.lines() {
            Lines::Single => 0,
            Lines::Framed { bytes_per_line } => bytes_per_line.get(),
        };
        let framed = bytes_per_line > 0;
        let line = (framed && cfg.suffix.is_some()).then(|| vec![0u8; bytes_per_line].into_boxed_slice());
        Self {
            fmt: HexFormatter::new(sink, &cfg.format),
            bytes_per_line,
            line_countdown: bytes_per_line,
            line,
            line_sep: cfg.line_sep.into_boxed_slice(),
            prefix: cfg.prefix.filter(|_| framed),
            suffix: cfg.suffix.filter(|_| framed),
            used: false,
            eol_pending: false,
        }
    }

    pub fn read_from<R: Read>(&mut self, src: R) -> io::Result<u64> {
        self.fmt.ready()?;
        drain(src, self)
    }

    /// Finishes the last line and rejects further writes. A second call is a no-op.
    ///
    /// A partial last line still gets its suffix and line separator. A dumper
    /// that never saw a byte writes one empty frame.
    pub fn close(&mut self) -> io::Result<()> {
        if self.fmt.is_closed() {
            return Ok(());
        }
        self.fmt.ready()?;
        if self.eol_pending {
            self.finish_line()?;
        }
        self.fmt.flush_buf()?;
        if self.bytes_per_line > 0 {
            if !self.used {
                if let Some(prefix) = &self.prefix {
                    let bytes = prefix();
                    self.fmt.write_raw(&bytes)?;
                }
                self.end_line(0)?;
            } else if self.line_countdown < self.bytes_per_line {
                self.end_line(self.bytes_per_line - self.line_countdown)?;
            }
        }
        self.fmt.close()
    }

    pub fn get_ref(&self) -> &W { self.fmt.get_ref() }

    pub fn get_mut(&mut self) -> &mut W { self.fmt.get_mut() }

    pub fn into_inner(self) -> W { self.fmt.into_inner() }

    /// Accepts `b` or fails without consuming it.
    fn push_byte(&mut self, b: u8) -> io::Result<()> {
        if self.bytes_per_line == 0 {
            return self.fmt.push_byte(b);
        }
        if self.eol_pending {
            self.finish_line()?;
        }
        if self.line_countdown == self.bytes_per_line {
            if let Some(prefix) = &self.prefix {
                let bytes = prefix();
                self.fmt.write_raw(&bytes)?;
            }
        }
        if let Some(line) = &mut self.line {
            line[self.bytes_per_line - self.line_countdown] = b;
        }
        self.fmt.push_byte(b)?;
        self.used = true;
        self.line_countdown -= 1;
        self.eol_pending = self.line_countdown == 0;
        Ok(())
    }

    /// Writes the frame end of a full line and starts the next one.
    ///
    /// Only the leading buffer flush can fail without latching, and it runs
    /// before any frame byte is written, so a retry starts from scratch.
    fn finish_line(&mut self) -> io::Result<()> {
        self.fmt.flush_buf()?;
        self.end_line(self.bytes_per_line)?;
        self.fmt.reset_block();
        self.line_countdown = self.bytes_per_line;
        self.eol_pending = false;
        Ok(())
    }

    /// Emits `suffix(line[..len])` and the line separator.
    fn end_line(&mut self, len: usize) -> io::Result<()> {
        if let Some(suffix) = &self.suffix {
            let line = self.line.as_deref().map(|l| &l[..len]).unwrap_or_default();
            let bytes = suffix(line);
            self.fmt.write_raw(&bytes)?;
        }
        let line_sep = std::mem::take(&mut self.line_sep);
        let written = self.fmt.write_raw(&line_sep);
        self.line_sep = line_sep;
        written
    }
}

impl<W: Write> Write for HexDumper<W> {
    fn write(&mut self, src: &[u8]) -> io::Result<usize> {
        self.fmt.ready()?;
        for (i, &b) in src.iter().enumerate() {
            if let Err(e) = self.push_byte(b) {
                return if i > 0 { Ok(i) } else { Err(e) };
            }
            // The byte is consumed; a failed line end is retried by the next
            // call or surfaces through the latch.
            if self.eol_pending && self.finish_line().is_err() {
                return Ok(i + 1);
            }
        }
        Ok(src.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.fmt.ready()?;
        if self.eol_pending {
            self.finish_line()?;
        }
        self.fmt.flush()
    }
}

/// Dumps `src` in one call.
pub fn dump_to_vec(src: &[u8], cfg: DumpConfig) -> io::Result<Vec<u8>> {
    let mut dumper = HexDumper::new(Vec::new(), cfg);
    dumper.write_all(src)?;
    dumper.close()?;
    Ok(dumper.into_inner())
}

/// `hexdump -C` style layout: offset, sixteen bytes per line, ASCII gutter.
///
/// ```text
/// 00000000  48 65 6c 6c 6f 2c 20 77 6f 72 6c 64 21 0a        |Hello, world!.|
/// ```
///
/// Short last lines are padded so the gutter stays aligned. The offset counter
/// belongs to the returned config, so build a fresh one per dump.
pub fn canonical(upper: bool) -> DumpConfig {
    const WIDTH: usize = 16;
    let offset = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&offset);
    DumpConfig::new(FormatConfig::new().sep(" ").block_len(1).upper(upper))
        .blocks_per_line(WIDTH)
        .line_sep("\n")
        .prefix(move || format!("{:08x}  ", offset.load(Ordering::Relaxed)).into_bytes())
        .suffix(move |line| {
            seen.fetch_add(line.len(), Ordering::Relaxed);
            let mut out = Vec::with_capacity(WIDTH * 3 + 4);
            // Pad short lines to the full hex width.
            out.resize((WIDTH - line.len()) * 3, b' ');
            out.extend_from_slice(b"  |");
            out.extend(line.iter().map(|&c| if c.is_ascii_graphic() || c == b' ' { c } else { b'.' }));
            out.push(b'|');
            out
        })
}
