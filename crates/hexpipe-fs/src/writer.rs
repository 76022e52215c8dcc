use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Latch, Result};
use crate::ext::layout_of;
use crate::layer::{self, Layer, Tee};
use crate::options::{VerifyFn, WriteOptions};
use crate::tar_layer::TarLayer;

/// Everything below the client buffer.
enum Body {
    Plain(Box<dyn Layer>),
    Tar(TarLayer<Box<dyn Layer>>),
}

impl Body {
    fn close(&mut self, path: &Path, errs: &mut Vec<Error>) {
        match self {
            Self::Plain(l) => l.close(path, errs),
            Self::Tar(t) => t.close(path, errs),
        }
    }
}

impl Write for Body {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(l) => l.write(buf),
            Self::Tar(t) => t.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(l) => l.flush(),
            Self::Tar(t) => t.flush(),
        }
    }
}

/// The client end: the body, optionally behind a buffer.
enum Top {
    Direct(Body),
    Buffered(BufWriter<Body>),
}

impl Top {
    fn buffered(self, capacity: usize) -> Self {
        match self {
            Self::Direct(body) => Self::Buffered(BufWriter::with_capacity(capacity, body)),
            buffered => buffered,
        }
    }

    /// Pushes buffered bytes into the body without flushing the body itself.
    /// The body comes back even when that fails; the buffered bytes are lost.
    fn into_body(self) -> (Body, io::Result<()>) {
        match self {
            Self::Direct(body) => (body, Ok(())),
            Self::Buffered(w) => match w.into_inner() {
                Ok(body) => (body, Ok(())),
                Err(e) => {
                    let (err, w) = e.into_parts();
                    (w.into_parts().0, Err(err))
                }
            },
        }
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Direct(b) => b.write(buf),
            Self::Buffered(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Direct(b) => b.flush(),
            Self::Buffered(w) => w.flush(),
        }
    }
}

/// Layered file writer with commit-on-close semantics.
///
/// Bytes written by the client pass through an optional buffer, an optional
/// tar framing layer and any gzip encoders picked from the file extension,
/// then reach the file and every tee sink. [`close`](Self::close) finishes
/// the layers, runs the verification predicate and either commits (renames
/// the temp file in backup mode) or rolls back.
///
/// The first write failure is latched: every later write and the final
/// `close` report it.
///
/// # Examples
///
/// ```
/// use std::io::Write;
/// use hexpipe_fs::{Writer, WriteOptions};
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("notes.txt");
///
/// let mut w = Writer::open(&path, WriteOptions::new().backup(true)).unwrap();
/// w.write_all(b"draft").unwrap();
/// assert!(!path.exists());
/// w.close().unwrap();
/// assert_eq!(std::fs::read(&path).unwrap(), b"draft");
/// ```
pub struct Writer {
    path:             PathBuf,
    temp:             Option<PathBuf>,
    top:              Option<Top>,
    tar:              bool,
    buf_size:         usize,
    preserve_on_fail: bool,
    verify_fn:        Option<VerifyFn>,
    latch:            Latch,
    closed:           bool,
}

impl Writer {
    pub fn open(path: impl AsRef<Path>, opts: WriteOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if opts.mk_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                create_dirs(parent, opts.dir_perm())?;
            }
        }

        let (file, temp) = if opts.backup {
            let (file, temp) = open_temp(&path, &opts)?;
            (file, Some(temp))
        } else {
            (open_direct(&path, &opts)?, None)
        };

        let layout = if opts.raw { Default::default() } else { layout_of(&path) };
        let level = opts.compression();
        let lower = layer::stack(Tee::new(file, opts.tee), layout.gzip, level);
        let body = if layout.tar { Body::Tar(TarLayer::new(lower)) } else { Body::Plain(lower) };
        let mut top = Top::Direct(body);
        if opts.buf_open {
            top = top.buffered(opts.buf_size);
        }

        tracing::debug!(
            path = %path.display(),
            temp = ?temp,
            gzip = layout.gzip,
            tar = layout.tar,
            "writer opened"
        );
        Ok(Self {
            path,
            temp,
            top: Some(top),
            tar: layout.tar,
            buf_size: opts.buf_size,
            preserve_on_fail: opts.preserve_on_fail,
            verify_fn: opts.verify_fn,
            latch: Latch::default(),
            closed: false,
        })
    }

    /// Opens `path` with default options.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> { Self::open(path, WriteOptions::new()) }

    /// The destination.
    pub fn path(&self) -> &Path { &self.path }

    /// The file actually being written in backup mode, until close.
    pub fn temp_path(&self) -> Option<&Path> { self.temp.as_deref() }

    pub fn is_closed(&self) -> bool { self.closed }

    /// Starts a tar entry. The buffer is flushed first and keeps buffering
    /// the entry body afterwards.
    ///
    /// # Errors
    ///
    /// [`Error::NotTar`] when the destination has no tar layer;
    /// [`Error::TarEntryIncomplete`] when the previous entry is short.
    pub fn write_header(&mut self, header: &tar::Header) -> Result<()> {
        self.state()?;
        if !self.tar {
            return Err(Error::NotTar);
        }
        let top = self.top.take().ok_or(Error::WriterClosed)?;
        let rebuffer = matches!(top, Top::Buffered(_));
        let (mut body, flushed) = top.into_body();
        let res = flushed.and_then(|()| match &mut body {
            Body::Tar(t) => t.write_header(header),
            Body::Plain(_) => Ok(()),
        });
        self.top = Some(if rebuffer {
            Top::Buffered(BufWriter::with_capacity(self.buf_size, body))
        } else {
            Top::Direct(body)
        });
        res.map_err(|e| self.fail("write tar header to", e))
    }

    pub fn write_byte(&mut self, b: u8) -> io::Result<()> {
        self.state()?;
        self.ensure_buffer();
        self.write_all(&[b])
    }

    pub fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.state()?;
        self.ensure_buffer();
        self.write_all(s.as_bytes())
    }

    /// Copies `src` to EOF and returns the byte count.
    pub fn read_from<R: Read>(&mut self, mut src: R) -> io::Result<u64> {
        self.state()?;
        self.ensure_buffer();
        io::copy(&mut src, self)
    }

    /// Finishes the layers and commits or rolls back.
    ///
    /// The steps run in order, collecting errors: flush the buffer, close the
    /// layers top to bottom, run the verification predicate when nothing
    /// failed so far, then rename the temp file on success or remove the
    /// partial output on failure. Later operations fail with
    /// [`Error::WriterClosed`]; closing again succeeds without effect.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let latched = self.latch.take();
        let mut errs = Vec::new();

        if let Some(top) = self.top.take() {
            let (mut body, flushed) = top.into_body();
            if let Err(e) = flushed {
                errs.push(Error::io("flush buffer to", &self.path, e));
            }
            body.close(&self.path, &mut errs);
        }

        if latched.is_none() && errs.is_empty() {
            if let Some(verify) = self.verify_fn.take() {
                if !verify() {
                    tracing::warn!(path = %self.path.display(), "verification failed");
                    errs.push(Error::VerificationFailure { path: self.path.clone() });
                }
            }
        }

        let clean = latched.is_none() && errs.is_empty();
        self.settle(clean, &mut errs);
        Error::from_list(latched.into_iter().chain(errs).collect())
    }

    /// Renames or removes the output according to `clean`.
    fn settle(&mut self, clean: bool, errs: &mut Vec<Error>) {
        match self.temp.take() {
            Some(temp) if clean => match fs::rename(&temp, &self.path) {
                Ok(()) => tracing::debug!(path = %self.path.display(), "committed"),
                Err(e) => {
                    errs.push(Error::io("rename temp file to", &self.path, e));
                    remove(&temp, errs);
                }
            },
            Some(temp) => {
                tracing::warn!(temp = %temp.display(), "discarding temp file");
                remove(&temp, errs);
            }
            None if !clean && !self.preserve_on_fail => {
                tracing::warn!(path = %self.path.display(), "removing failed output");
                remove(&self.path, errs);
            }
            None => {}
        }
    }

    fn state(&self) -> Result<()> {
        if self.closed {
            return Err(Error::WriterClosed);
        }
        self.latch.get().map_or(Ok(()), Err)
    }

    fn ensure_buffer(&mut self) {
        if let Some(top) = self.top.take() {
            self.top = Some(top.buffered(self.buf_size));
        }
    }

    /// Latches `e`, adding the operation and path unless it already is one
    /// of ours.
    fn fail(&mut self, op: &'static str, e: io::Error) -> Error {
        let ours = e.get_ref().is_some_and(|inner| inner.is::<Error>());
        let e = if ours { e } else { io::Error::new(e.kind(), Error::io(op, &self.path, e)) };
        self.latch.set(e)
    }
}

impl Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.state()?;
        let res = match self.top.as_mut() {
            Some(top) => top.write(buf),
            None => return Err(Error::WriterClosed.into()),
        };
        res.map_err(|e| self.fail("write", e).into())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.state()?;
        let res = match self.top.as_mut() {
            Some(top) => top.flush(),
            None => return Err(Error::WriterClosed.into()),
        };
        res.map_err(|e| self.fail("flush", e).into())
    }
}

impl Drop for Writer {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.top = None;
        if let Some(temp) = self.temp.take() {
            tracing::warn!(path = %self.path.display(), "writer dropped without close, discarding temp file");
            let _ = fs::remove_file(temp);
        }
    }
}

impl fmt::Debug for Writer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer")
            .field("path", &self.path)
            .field("temp", &self.temp)
            .field("tar", &self.tar)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

fn remove(path: &Path, errs: &mut Vec<Error>) {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => errs.push(Error::io("remove", path, e)),
        _ => {}
    }
}

fn create_dirs(dir: &Path, mode: u32) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder.create(dir).map_err(|e| Error::io("create directory", dir, e))
}

fn open_direct(path: &Path, opts: &WriteOptions) -> Result<File> {
    let mut oo = OpenOptions::new();
    oo.write(true).create(true);
    if opts.append {
        oo.append(true);
    } else {
        oo.truncate(true);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        oo.mode(opts.perm);
    }
    oo.open(path).map_err(|e| Error::io("open", path, e))
}

/// Creates `<name>.<random>.tmp` beside `path` with mode `perm` (less the
/// umask, as in direct mode) and, when appending, seeds it with the current
/// destination content.
fn open_temp(path: &Path, opts: &WriteOptions) -> Result<(File, PathBuf)> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let base = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let prefix = format!("{base}.");
    let mut builder = tempfile::Builder::new();
    builder.prefix(&prefix).suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(opts.perm));
    }
    let (mut file, temp) = builder
        .tempfile_in(dir)
        .map_err(|e| Error::io("create temp file in", dir, e))?
        .keep()
        .map_err(|e| Error::io("keep temp file in", dir, e.error))?;

    if let Err(e) = seed_temp(&mut file, path, opts) {
        drop(file);
        let _ = fs::remove_file(&temp);
        return Err(e);
    }
    Ok((file, temp))
}

fn seed_temp(file: &mut File, path: &Path, opts: &WriteOptions) -> Result<()> {
    if !opts.append {
        return Ok(());
    }
    match File::open(path) {
        Ok(mut src) => {
            io::copy(&mut src, file).map_err(|e| Error::io("copy existing content of", path, e))?;
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io("open", path, e)),
    }
}
