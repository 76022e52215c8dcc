use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("stream has no tar layer")]
    NotTar,

    #[error("tar stream is read entry by entry")]
    TarStream,

    #[error("writer is closed")]
    WriterClosed,

    #[error("reader is closed")]
    ReaderClosed,

    #[error("verification failed for {}", path.display())]
    VerificationFailure { path: PathBuf },

    #[error("tar entry overflow: {attempted} bytes written past the declared size")]
    TarEntryOverflow { attempted: usize },

    #[error("tar entry incomplete: {remaining} bytes missing")]
    TarEntryIncomplete { remaining: u64 },

    #[error("failed to {op} {}", path.display())]
    Io {
        op:     &'static str,
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    /// An earlier stream failure, reported again.
    #[error(transparent)]
    Latched(Arc<io::Error>),

    #[error("{} errors, first: {}", .0.len(), .0[0])]
    Multiple(Vec<Error>),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { op, path: path.into(), source }
    }

    /// Collapses collected errors: none is success, one is itself.
    pub(crate) fn from_list(mut errs: Vec<Error>) -> Result<()> {
        match errs.len() {
            0 => Ok(()),
            1 => Err(errs.remove(0)),
            _ => Err(Self::Multiple(errs)),
        }
    }

    /// Iterates this error and, for [`Error::Multiple`], every member.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &Error> + '_> {
        match self {
            Self::Multiple(errs) => Box::new(errs.iter().flat_map(|e| e.iter())),
            e => Box::new(std::iter::once(e)),
        }
    }

    pub fn is_verification_failure(&self) -> bool {
        self.iter().any(|e| matches!(e, Self::VerificationFailure { .. }))
    }

    fn kind(&self) -> io::ErrorKind {
        match self {
            Self::NotTar | Self::TarStream | Self::TarEntryOverflow { .. } => io::ErrorKind::InvalidInput,
            Self::WriterClosed | Self::ReaderClosed => io::ErrorKind::BrokenPipe,
            Self::VerificationFailure { .. } | Self::TarEntryIncomplete { .. } => io::ErrorKind::InvalidData,
            Self::Io { source, .. } => source.kind(),
            Self::Latched(e) => e.kind(),
            Self::Multiple(errs) => errs[0].kind(),
        }
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Latched(e) => io::Error::new(e.kind(), e),
            e => io::Error::new(e.kind(), e),
        }
    }
}

/// First-error-wins slot for stream failures.
#[derive(Debug, Default)]
pub(crate) struct Latch(Option<Arc<io::Error>>);

impl Latch {
    /// The latched error, if any, shared with the slot.
    pub(crate) fn get(&self) -> Option<Error> { self.0.as_ref().map(|e| Error::Latched(Arc::clone(e))) }

    /// Stores `err` unless an error is already latched, then returns the latched one.
    pub(crate) fn set(&mut self, err: io::Error) -> Error {
        Error::Latched(Arc::clone(self.0.get_or_insert_with(|| Arc::new(err))))
    }

    pub(crate) fn take(&mut self) -> Option<Error> { self.0.take().map(Error::Latched) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_list_collapses() {
        assert!(Error::from_list(vec![]).is_ok());
        assert!(matches!(Error::from_list(vec![Error::NotTar]), Err(Error::NotTar)));
        let many = Error::from_list(vec![Error::NotTar, Error::VerificationFailure { path: "a".into() }]);
        let err = many.unwrap_err();
        assert!(matches!(err, Error::Multiple(ref v) if v.len() == 2));
        assert!(err.is_verification_failure());
        assert!(err.to_string().starts_with("2 errors, first: "));
    }

    #[test]
    fn latch_keeps_first_error() {
        let mut latch = Latch::default();
        assert!(latch.get().is_none());
        let first: io::Error = latch.set(io::Error::new(io::ErrorKind::StorageFull, "disk")).into();
        let second: io::Error = latch.set(io::Error::other("ignored")).into();
        assert_eq!(first.kind(), io::ErrorKind::StorageFull);
        assert_eq!(second.kind(), io::ErrorKind::StorageFull);
        assert_eq!(latch.get().unwrap().to_string(), "disk");
        assert!(matches!(latch.take(), Some(Error::Latched(_))));
        assert!(latch.get().is_none());
    }

    #[test]
    fn io_conversion_keeps_kind() {
        let e: io::Error = Error::WriterClosed.into();
        assert_eq!(e.kind(), io::ErrorKind::BrokenPipe);
        let e: io::Error = Error::io("open", "/x", io::Error::from(io::ErrorKind::NotFound)).into();
        assert_eq!(e.kind(), io::ErrorKind::NotFound);
    }
}
