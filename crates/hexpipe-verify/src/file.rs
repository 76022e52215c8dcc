use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;

use crate::checksum::HashChecksum;
use crate::error::{Result, VerificationError};
use crate::verifier::HashVerifier;

/// Feeds every write to each verifier.
struct Fan<'a>(&'a [HashVerifier]);

impl Write for Fan<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for v in self.0 {
            v.update(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

/// Whether the file at `path` satisfies every checksum.
///
/// A missing file yields `Ok(false)`. An empty checksum list only asks that
/// the file exists.
///
/// # Errors
///
/// Invalid checksums fail as in [`HashChecksum::verifier`]; read failures
/// other than `NotFound` are returned as [`VerificationError::Io`].
pub fn verify_file(path: impl AsRef<Path>, checksums: &[HashChecksum]) -> Result<bool> {
    let path = path.as_ref();
    let verifiers = checksums.iter().map(HashChecksum::verifier).collect::<Result<Vec<_>>>()?;
    let io_err = |source| VerificationError::Io { path: path.to_path_buf(), source };

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "verify: file missing");
            return Ok(false);
        }
        Err(e) => return Err(io_err(e)),
    };

    // The fan never fails, so any copy error comes from the read side.
    io::copy(&mut BufReader::new(file), &mut Fan(&verifiers)).map_err(io_err)?;

    let ok = verifiers.iter().all(|v| v.matches());
    tracing::debug!(path = %path.display(), checksums = verifiers.len(), ok, "verify: file checked");
    Ok(ok)
}
