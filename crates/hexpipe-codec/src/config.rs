use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Produces the bytes written at the start of every dumped line.
pub type PrefixFn = Arc<dyn Fn() -> Vec<u8> + Send + Sync>;

/// Produces the bytes written at the end of a dumped line, given the source
/// bytes of that line.
pub type SuffixFn = Arc<dyn Fn(&[u8]) -> Vec<u8> + Send + Sync>;

/// Block formatting options.
///
/// A separator is only inserted when `block_len > 0` and `sep` is non-empty.
/// Any other combination encodes plainly, so every invalid config produces the
/// same output.
///
/// # Examples
///
/// ```
/// use hexpipe_codec::{FormatConfig, format_to_string};
///
/// let cfg = FormatConfig::new().sep(":").block_len(1).upper(true);
/// assert_eq!(format_to_string(b"\xde\xad", &cfg), "DE:AD");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormatConfig {
    pub sep:       String,
    pub block_len: usize,
    pub upper:     bool,
}

/// A [`FormatConfig`] with validity resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Layout {
    Plain,
    Blocked { block_len: NonZeroUsize, sep: Box<[u8]> },
}

impl FormatConfig {
    pub fn new() -> Self { Self::default() }

    pub fn sep(mut self, sep: impl Into<String>) -> Self {
        self.sep = sep.into();
        self
    }

    pub fn block_len(mut self, block_len: usize) -> Self {
        self.block_len = block_len;
        self
    }

    pub fn upper(mut self, upper: bool) -> Self {
        self.upper = upper;
        self
    }

    pub fn is_valid(&self) -> bool { self.block_len > 0 && !self.sep.is_empty() }

    pub fn layout(&self) -> Layout {
        match NonZeroUsize::new(self.block_len) {
            Some(block_len) if !self.sep.is_empty() => Layout::Blocked {
                block_len,
                sep: self.sep.as_bytes().into(),
            },
            _ => Layout::Plain,
        }
    }
}

/// Line framing options layered over a [`FormatConfig`].
///
/// Lines are framed only when `format.block_len > 0` and
/// `blocks_per_line > 0`; the separator may be empty. Otherwise the dump is a
/// single unframed run, identical to the formatter output.
#[derive(Clone, Default)]
pub struct DumpConfig {
    pub format:          FormatConfig,
    pub line_sep:        Vec<u8>,
    pub blocks_per_line: usize,
    pub prefix:          Option<PrefixFn>,
    pub suffix:          Option<SuffixFn>,
}

/// A [`DumpConfig`] with line validity resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lines {
    Single,
    Framed { bytes_per_line: NonZeroUsize },
}

impl fmt::Debug for DumpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DumpConfig")
            .field("format", &self.format)
            .field("line_sep", &String::from_utf8_lossy(&self.line_sep))
            .field("blocks_per_line", &self.blocks_per_line)
            .field("prefix", &self.prefix.is_some())
            .field("suffix", &self.suffix.is_some())
            .finish()
    }
}

impl DumpConfig {
    pub fn new(format: FormatConfig) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn line_sep(mut self, line_sep: impl Into<Vec<u8>>) -> Self {
        self.line_sep = line_sep.into();
        self
    }

    pub fn blocks_per_line(mut self, blocks_per_line: usize) -> Self {
        self.blocks_per_line = blocks_per_line;
        self
    }

    pub fn prefix(mut self, prefix: impl Fn() -> Vec<u8> + Send + Sync + 'static) -> Self {
        self.prefix = Some(Arc::new(prefix));
        self
    }

    pub fn suffix(mut self, suffix: impl Fn(&[u8]) -> Vec<u8> + Send + Sync + 'static) -> Self {
        self.suffix = Some(Arc::new(suffix));
        self
    }

    pub fn lines(&self) -> Lines {
        match self.format.block_len.checked_mul(self.blocks_per_line).and_then(NonZeroUsize::new) {
            Some(bytes_per_line) => Lines::Framed { bytes_per_line },
            None => Lines::Single,
        }
    }
}
