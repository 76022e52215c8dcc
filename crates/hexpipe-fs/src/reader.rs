use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::error::{Error, Result};
use crate::ext::layout_of;
use crate::options::ReadOptions;

type Source = Box<dyn Read + Send>;

/// One tar entry: its header and a body reader bounded to the entry size.
pub type TarEntry<'a> = tar::Entry<'a, Source>;

enum Stream {
    Plain(Source),
    Tar(tar::Archive<Source>),
}

/// Reading counterpart of [`Writer`](crate::Writer).
///
/// Gzip layers are peeled from the extension the same way. Plain streams are
/// read through [`Read`]; tar streams are walked with [`entries`](Self::entries).
pub struct Reader {
    path:   PathBuf,
    stream: Option<Stream>,
}

impl Reader {
    pub fn open(path: impl AsRef<Path>, opts: ReadOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| Error::io("open", &path, e))?;
        let layout = if opts.raw { Default::default() } else { layout_of(&path) };

        let mut src: Source = Box::new(BufReader::new(file));
        for _ in 0..layout.gzip {
            src = Box::new(GzDecoder::new(src));
        }
        let stream = if layout.tar { Stream::Tar(tar::Archive::new(src)) } else { Stream::Plain(src) };
        tracing::debug!(path = %path.display(), gzip = layout.gzip, tar = layout.tar, "reader opened");
        Ok(Self { path, stream: Some(stream) })
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn is_tar(&self) -> bool { matches!(self.stream, Some(Stream::Tar(_))) }

    /// Iterates the archive entries in order.
    ///
    /// GNU long names and PAX extensions are folded into the entry they
    /// describe. Entries must be consumed in order; the archive can be walked
    /// only once.
    ///
    /// # Errors
    ///
    /// [`Error::NotTar`] without a tar layer, [`Error::ReaderClosed`] after close.
    pub fn entries(&mut self) -> Result<Entries<'_>> {
        let archive = match self.stream.as_mut().ok_or(Error::ReaderClosed)? {
            Stream::Tar(archive) => archive,
            Stream::Plain(_) => return Err(Error::NotTar),
        };
        let inner = archive.entries().map_err(|e| Error::io("read tar entries from", &self.path, e))?;
        Ok(Entries { path: &self.path, inner })
    }

    /// Releases the source. Later reads fail with [`Error::ReaderClosed`];
    /// closing again is a no-op.
    pub fn close(&mut self) -> Result<()> {
        self.stream = None;
        Ok(())
    }
}

impl Read for Reader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.stream.as_mut().ok_or(Error::ReaderClosed)? {
            Stream::Plain(src) => src.read(buf),
            Stream::Tar(_) => Err(Error::TarStream.into()),
        }
    }
}

impl fmt::Debug for Reader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("path", &self.path)
            .field("tar", &self.is_tar())
            .field("closed", &self.stream.is_none())
            .finish()
    }
}

/// Entry iterator returned by [`Reader::entries`].
pub struct Entries<'a> {
    path:  &'a Path,
    inner: tar::Entries<'a, Source>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = Result<TarEntry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.path;
        self.inner.next().map(|entry| entry.map_err(|e| Error::io("read tar entry from", path, e)))
    }
}
