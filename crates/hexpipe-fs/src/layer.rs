//! The stack between the client and the file.
//!
//! From the top: optional tar framing, zero or more gzip encoders, then the
//! tee that writes the file and copies every byte to the extra sinks.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use flate2::write::GzEncoder;

use crate::error::Error;
use crate::options::TeeSink;

/// A write stage that owns the stages below it.
pub(crate) trait Layer: Write + Send {
    /// Writes any trailer, then closes the layers below. Failures are
    /// collected in `errs`; lower layers are closed regardless.
    fn close(&mut self, path: &Path, errs: &mut Vec<Error>);
}

impl Layer for Box<dyn Layer> {
    fn close(&mut self, path: &Path, errs: &mut Vec<Error>) { (**self).close(path, errs) }
}

/// Bottom layer: the file, then each sink in order.
pub(crate) struct Tee {
    file:   File,
    sinks:  Vec<TeeSink>,
    closed: bool,
}

impl Tee {
    pub(crate) fn new(file: File, sinks: Vec<TeeSink>) -> Self { Self { file, sinks, closed: false } }
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.closed {
            return Err(Error::WriterClosed.into());
        }
        let n = self.file.write(buf)?;
        for sink in &mut self.sinks {
            sink.write_all(&buf[..n])?;
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.sinks.iter_mut().try_for_each(|s| s.flush())
    }
}

impl Layer for Tee {
    fn close(&mut self, path: &Path, errs: &mut Vec<Error>) {
        if std::mem::replace(&mut self.closed, true) {
            return;
        }
        if let Err(e) = self.flush() {
            errs.push(Error::io("flush", path, e));
        }
    }
}

impl<W: Layer> Layer for GzEncoder<W> {
    fn close(&mut self, path: &Path, errs: &mut Vec<Error>) {
        if let Err(e) = self.try_finish() {
            errs.push(Error::io("finish gzip stream of", path, e));
        }
        self.get_mut().close(path, errs);
    }
}

/// Builds the tee and `gzip` encoders over it.
pub(crate) fn stack(tee: Tee, gzip: usize, level: flate2::Compression) -> Box<dyn Layer> {
    let mut top: Box<dyn Layer> = Box::new(tee);
    for _ in 0..gzip {
        tracing::trace!(?level, "push gzip layer");
        top = Box::new(GzEncoder::new(top, level));
    }
    top
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> { Err(io::Error::other("sink down")) }

        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    #[test]
    fn tee_sinks_see_compressed_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.gz");
        let seen = Shared::default();
        let tee = Tee::new(File::create(&path).unwrap(), vec![Box::new(seen.clone())]);

        let mut top = stack(tee, 2, flate2::Compression::fast());
        top.write_all(b"twice compressed").unwrap();
        let mut errs = Vec::new();
        top.close(&path, &mut errs);
        drop(top);
        assert!(errs.is_empty());

        let on_disk = std::fs::read(&path).unwrap();
        assert_eq!(*seen.0.lock().unwrap(), on_disk);

        let mut once = flate2::read::GzDecoder::new(&on_disk[..]);
        let mut inner = Vec::new();
        once.read_to_end(&mut inner).unwrap();
        let mut plain = String::new();
        flate2::read::GzDecoder::new(&inner[..]).read_to_string(&mut plain).unwrap();
        assert_eq!(plain, "twice compressed");
    }

    #[test]
    fn failing_sink_surfaces_and_closed_tee_rejects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x");
        let mut tee = Tee::new(File::create(&path).unwrap(), vec![Box::new(Broken)]);
        assert_eq!(tee.write(b"abc").unwrap_err().to_string(), "sink down");

        let mut errs = Vec::new();
        tee.close(&path, &mut errs);
        assert_eq!(tee.write(b"x").unwrap_err().kind(), io::ErrorKind::BrokenPipe);
        // The file saw the bytes before the sink failed.
        assert_eq!(std::fs::read(&path).unwrap(), b"abc");
    }
}
