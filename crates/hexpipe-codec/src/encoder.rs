use std::io::{self, Read, Write};

use crate::error::{Error, Latch};
use crate::pool::{PoolRegistry, SOURCE_CHUNK_LEN};
use crate::table::{alphabet, hi, lo};

/// Encodes `src` into `dst` and returns the number of bytes written, `2 * src.len()`.
///
/// # Panics
///
/// Panics if `dst` is shorter than `2 * src.len()`.
pub fn encode(dst: &mut [u8], src: &[u8], upper: bool) -> usize {
    let table = alphabet(upper);
    let n = src.len() * 2;
    for (pair, &b) in dst[..n].chunks_exact_mut(2).zip(src) {
        pair[0] = hi(table, b);
        pair[1] = lo(table, b);
    }
    n
}

pub fn encode_to_string(src: &[u8], upper: bool) -> String {
    let table = alphabet(upper);
    let mut out = String::with_capacity(src.len() * 2);
    for &b in src {
        out.push(hi(table, b) as char);
        out.push(lo(table, b) as char);
    }
    out
}

/// Writes all of `buf`, reporting how much got through when the sink fails.
pub(crate) fn write_counted<W: Write + ?Sized>(
    sink: &mut W,
    buf: &[u8],
) -> Result<(), (usize, io::Error)> {
    let mut off = 0;
    while off < buf.len() {
        match sink.write(&buf[off..]) {
            Ok(0) => {
                return Err((off, io::Error::new(io::ErrorKind::WriteZero, "sink accepted no bytes")));
            }
            Ok(n) => off += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err((off, e)),
        }
    }
    Ok(())
}

/// Copies `src` into `dst` until EOF using a pooled source chunk.
pub(crate) fn drain<R: Read, W: Write + ?Sized>(mut src: R, dst: &mut W) -> io::Result<u64> {
    let mut chunk = PoolRegistry::global().source.lease();
    let mut total = 0u64;
    loop {
        let n = match src.read(&mut chunk) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        dst.write_all(&chunk[..n])?;
        total += n as u64;
    }
}

/// Streaming hex encoder over any [`Write`] sink.
///
/// `write` reports the number of *source* bytes consumed. The first sink error
/// is latched and returned by every later call.
///
/// # Examples
///
/// ```
/// use std::io::Write;
/// use hexpipe_codec::HexEncoder;
///
/// let mut enc = HexEncoder::new(Vec::new(), false);
/// enc.write_all(b"\x01\xff").unwrap();
/// enc.close().unwrap();
/// assert_eq!(enc.into_inner(), b"01ff");
/// ```
#[derive(Debug)]
pub struct HexEncoder<W> {
    sink:   W,
    upper:  bool,
    latch:  Latch,
    closed: bool,
}

impl<W: Write> HexEncoder<W> {
    pub fn new(sink: W, upper: bool) -> Self {
        Self {
            sink,
            upper,
            latch: Latch::default(),
            closed: false,
        }
    }

    /// Encodes everything `src` yields until EOF and returns the source byte count.
    pub fn read_from<R: Read>(&mut self, src: R) -> io::Result<u64> {
        self.ready()?;
        drain(src, self)
    }

    /// Flushes the sink and rejects further writes. A second call is a no-op.
    pub fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.latch.check()?;
        if let Err(e) = self.sink.flush() {
            return Err(self.latch.set(e));
        }
        self.closed = true;
        Ok(())
    }

    pub fn get_ref(&self) -> &W { &self.sink }

    pub fn get_mut(&mut self) -> &mut W { &mut self.sink }

    pub fn into_inner(self) -> W { self.sink }

    fn ready(&self) -> io::Result<()> {
        if self.closed {
            return Err(Error::Closed("hex encoder").into());
        }
        self.latch.check()
    }
}

impl<W: Write> Write for HexEncoder<W> {
    fn write(&mut self, src: &[u8]) -> io::Result<usize> {
        self.ready()?;
        let mut chunk = PoolRegistry::global().encode.lease();
        let mut accepted = 0;
        for part in src.chunks(SOURCE_CHUNK_LEN) {
            let n = encode(&mut chunk, part, self.upper);
            if let Err((written, e)) = write_counted(&mut self.sink, &chunk[..n]) {
                let e = self.latch.set(e);
                accepted += written / 2;
                return if accepted > 0 { Ok(accepted) } else { Err(e) };
            }
            accepted += part.len();
        }
        Ok(accepted)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.ready()?;
        self.sink.flush().map_err(|e| self.latch.set(e))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Sink that accepts `budget` bytes and then fails.
    pub(crate) struct FailAfter {
        pub(crate) out:    Vec<u8>,
        pub(crate) budget: usize,
    }

    impl Write for FailAfter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink full"));
            }
            let n = buf.len().min(self.budget);
            self.out.extend_from_slice(&buf[..n]);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    #[test]
    fn encode_into_slice() {
        let mut dst = [0u8; 8];
        assert_eq!(encode(&mut dst, b"\x00\x7f\xab\xff", false), 8);
        assert_eq!(&dst, b"007fabff");
        assert_eq!(encode(&mut dst, b"\xab\xcd", true), 4);
        assert_eq!(&dst[..4], b"ABCD");
    }

    #[test]
    #[should_panic]
    fn encode_panics_on_short_dst() {
        let mut dst = [0u8; 3];
        encode(&mut dst, b"\x01\x02", false);
    }

    #[test]
    fn large_write_spans_chunks() {
        let src: Vec<u8> = (0..=255u8).cycle().take(SOURCE_CHUNK_LEN * 3 + 7).collect();
        let mut enc = HexEncoder::new(Vec::new(), true);
        assert_eq!(enc.write(&src).unwrap(), src.len());
        enc.close().unwrap();
        assert_eq!(enc.into_inner(), hex::encode_upper(&src).into_bytes());
    }

    #[test]
    fn read_from_drains_source() {
        let src = vec![0x5au8; 2000];
        let mut enc = HexEncoder::new(Vec::new(), false);
        assert_eq!(enc.read_from(&src[..]).unwrap(), 2000);
        assert_eq!(enc.into_inner(), "5a".repeat(2000).into_bytes());
    }

    #[test]
    fn sink_error_is_latched_with_partial_count() {
        let mut enc = HexEncoder::new(FailAfter { out: Vec::new(), budget: 5 }, false);
        assert_eq!(enc.write(b"abcdef").unwrap(), 2);
        let err = enc.write(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(enc.flush().unwrap_err().kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(enc.close().unwrap_err().kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(enc.get_ref().out, b"61626");
    }

    #[test]
    fn close_is_idempotent_and_rejects_writes() {
        let mut enc = HexEncoder::new(Vec::new(), false);
        enc.write_all(b"a").unwrap();
        enc.close().unwrap();
        enc.close().unwrap();
        let err = enc.write(b"b").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(enc.into_inner(), b"61");
    }
}
