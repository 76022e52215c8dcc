use std::io;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("hex length is negative: {0}")]
    NegativeLength(i64),

    #[error("hex length is odd: {0}")]
    OddLength(i64),

    #[error("destination buffer too small: {required} bytes required, got {actual}")]
    DstTooSmall { required: usize, actual: usize },

    #[error("write to closed {0}")]
    Closed(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        let kind = match e {
            Error::Closed(_) => io::ErrorKind::BrokenPipe,
            _ => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, e)
    }
}

/// Single-slot error latch shared by the streaming types.
///
/// The first error stored wins; every later call observes an `io::Error`
/// with the same kind wrapping the original.
#[derive(Debug, Default)]
pub(crate) struct Latch(Option<Arc<io::Error>>);

impl Latch {
    pub(crate) fn check(&self) -> io::Result<()> {
        match &self.0 {
            Some(e) => Err(io::Error::new(e.kind(), Arc::clone(e))),
            None => Ok(()),
        }
    }

    /// Stores `err` unless an error is already latched, then returns the latched one.
    pub(crate) fn set(&mut self, err: io::Error) -> io::Error {
        let e = self.0.get_or_insert_with(|| Arc::new(err));
        io::Error::new(e.kind(), Arc::clone(e))
    }
}
