use std::fmt;
use std::io::Write;

/// Default buffer size when buffering is enabled with size 0.
pub const DEFAULT_BUF_SIZE: usize = 8 * 1024;

/// Default file mode for created files.
pub const DEFAULT_PERM: u32 = 0o644;

/// Predicate run at close time, only when nothing else failed.
pub type VerifyFn = Box<dyn FnOnce() -> bool + Send>;

/// Extra sink receiving a copy of every byte written to the file.
pub type TeeSink = Box<dyn Write + Send>;

/// How a [`Writer`](crate::Writer) opens, layers and commits its destination.
///
/// Every field has a usable default; out-of-range values fall back to the
/// documented default instead of failing.
pub struct WriteOptions {
    pub(crate) append:           bool,
    pub(crate) raw:              bool,
    pub(crate) buf_size:         usize,
    pub(crate) buf_open:         bool,
    pub(crate) backup:           bool,
    pub(crate) preserve_on_fail: bool,
    pub(crate) mk_dirs:          bool,
    pub(crate) verify_fn:        Option<VerifyFn>,
    pub(crate) gzip_level:       Option<u32>,
    pub(crate) perm:             u32,
    pub(crate) tee:              Vec<TeeSink>,
}

impl Default for WriteOptions {
    fn default() -> Self { Self::new() }
}

impl WriteOptions {
    pub fn new() -> Self {
        Self {
            append:           false,
            raw:              false,
            buf_size:         DEFAULT_BUF_SIZE,
            buf_open:         false,
            backup:           false,
            preserve_on_fail: false,
            mk_dirs:          false,
            verify_fn:        None,
            gzip_level:       None,
            perm:             DEFAULT_PERM,
            tee:              Vec::new(),
        }
    }

    /// Keep existing content and write after it. With `backup`, the old
    /// content is copied into the temp file first.
    pub fn append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    /// Ignore the file extension: no gzip or tar layers.
    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Buffer size for the client end; 0 selects [`DEFAULT_BUF_SIZE`].
    pub fn buf_size(mut self, size: usize) -> Self {
        self.buf_size = if size == 0 { DEFAULT_BUF_SIZE } else { size };
        self
    }

    /// Create the buffer at open instead of on first byte/string/reader write.
    pub fn buf_open(mut self, buf_open: bool) -> Self {
        self.buf_open = buf_open;
        self
    }

    /// Write to `<name>.<random>.tmp` next to the destination and rename on
    /// a clean close.
    pub fn backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    /// Without `backup`, keep the destination when close fails.
    pub fn preserve_on_fail(mut self, preserve: bool) -> Self {
        self.preserve_on_fail = preserve;
        self
    }

    /// Create missing parent directories.
    pub fn mk_dirs(mut self, mk_dirs: bool) -> Self {
        self.mk_dirs = mk_dirs;
        self
    }

    pub fn verify_fn(mut self, f: impl FnOnce() -> bool + Send + 'static) -> Self {
        self.verify_fn = Some(Box::new(f));
        self
    }

    /// Gzip level 0..=9; anything else uses the flate2 default.
    pub fn gzip_level(mut self, level: i32) -> Self {
        self.gzip_level = u32::try_from(level).ok().filter(|l| *l <= 9);
        self
    }

    /// Mode bits for the file (and, with `mk_dirs`, its directories).
    /// Ignored off Unix.
    pub fn perm(mut self, perm: u32) -> Self {
        self.perm = perm;
        self
    }

    /// Adds a sink that sees the on-disk bytes, after compression.
    pub fn tee(mut self, sink: impl Write + Send + 'static) -> Self {
        self.tee.push(Box::new(sink));
        self
    }

    pub(crate) fn compression(&self) -> flate2::Compression {
        self.gzip_level.map(flate2::Compression::new).unwrap_or_default()
    }

    /// Directory mode: `perm` plus search permission wherever read is granted.
    pub(crate) fn dir_perm(&self) -> u32 { self.perm | ((self.perm & 0o444) >> 2) }
}

impl fmt::Debug for WriteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteOptions")
            .field("append", &self.append)
            .field("raw", &self.raw)
            .field("buf_size", &self.buf_size)
            .field("buf_open", &self.buf_open)
            .field("backup", &self.backup)
            .field("preserve_on_fail", &self.preserve_on_fail)
            .field("mk_dirs", &self.mk_dirs)
            .field("verify_fn", &self.verify_fn.is_some())
            .field("gzip_level", &self.gzip_level)
            .field("perm", &format_args!("{:#o}", self.perm))
            .field("tee", &self.tee.len())
            .finish()
    }
}

/// How a [`Reader`](crate::Reader) opens its source.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReadOptions {
    pub(crate) raw: bool,
}

impl ReadOptions {
    pub fn new() -> Self { Self::default() }

    /// Ignore the file extension: no gzip or tar layers.
    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }
}
