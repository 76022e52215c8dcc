//! Streaming tar framing over a [`Layer`].
//!
//! Bodies are written as they arrive; the layer only tracks how many bytes
//! the current entry still expects and pads to the 512-byte block size.

use std::io::{self, Write};
use std::path::Path;

use crate::error::Error;
use crate::layer::Layer;

const BLOCK: u64 = 512;
const ZEROS: [u8; BLOCK as usize] = [0; BLOCK as usize];

pub(crate) struct TarLayer<W> {
    inner:     W,
    remaining: u64,
    pad:       u64,
    entries:   u64,
}

impl<W: Layer> TarLayer<W> {
    pub(crate) fn new(inner: W) -> Self {
        tracing::trace!("push tar layer");
        Self { inner, remaining: 0, pad: 0, entries: 0 }
    }

    /// Starts a new entry. The checksum is computed here, so callers need
    /// not set it.
    pub(crate) fn write_header(&mut self, header: &tar::Header) -> io::Result<()> {
        if self.remaining > 0 {
            return Err(Error::TarEntryIncomplete { remaining: self.remaining }.into());
        }
        self.write_padding()?;
        let mut header = header.clone();
        header.set_cksum();
        let size = header.entry_size()?;
        self.inner.write_all(header.as_bytes())?;
        self.remaining = size;
        self.pad = (BLOCK - size % BLOCK) % BLOCK;
        self.entries += 1;
        tracing::trace!(entry = self.entries, size, "tar header written");
        Ok(())
    }

    fn write_padding(&mut self) -> io::Result<()> {
        let pad = std::mem::take(&mut self.pad) as usize;
        self.inner.write_all(&ZEROS[..pad])
    }

    fn write_trailer(&mut self) -> io::Result<()> {
        self.write_padding()?;
        self.inner.write_all(&ZEROS)?;
        self.inner.write_all(&ZEROS)
    }
}

impl<W: Layer> Write for TarLayer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.remaining == 0 {
            return Err(Error::TarEntryOverflow { attempted: buf.len() }.into());
        }
        let take = buf.len().min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        let n = self.inner.write(&buf[..take])?;
        self.remaining -= n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> { self.inner.flush() }
}

impl<W: Layer> Layer for TarLayer<W> {
    fn close(&mut self, path: &Path, errs: &mut Vec<Error>) {
        if self.remaining > 0 {
            errs.push(Error::TarEntryIncomplete { remaining: self.remaining });
        } else if let Err(e) = self.write_trailer() {
            errs.push(Error::io("write tar trailer to", path, e));
        }
        self.inner.close(path, errs);
    }
}
