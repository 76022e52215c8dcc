pub mod app;
pub mod dump;
pub mod encode;
pub mod fetch;
pub mod int;

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use anyhow::Context;

/// Opens `file`, or stdin when it is absent or `-`.
pub(crate) fn input(file: Option<&Path>) -> anyhow::Result<Box<dyn Read>> {
    match file {
        Some(path) if path != Path::new("-") => {
            let f = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            Ok(Box::new(io::BufReader::new(f)))
        }
        _ => Ok(Box::new(io::stdin().lock())),
    }
}

pub(crate) fn output() -> BufWriter<io::StdoutLock<'static>> { BufWriter::new(io::stdout().lock()) }

/// Flushes stdout, treating a closed pipe as a normal end.
pub(crate) fn finish(out: &mut impl Write) -> anyhow::Result<()> {
    match out.flush() {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        r => r.context("failed to flush stdout"),
    }
}
