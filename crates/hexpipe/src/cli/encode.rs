use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use hexpipe_codec::HexEncoder;

#[derive(Clone, Debug, Args)]
pub struct EncodeArg {
    /// Input file, stdin when omitted
    pub file:  Option<PathBuf>,
    #[arg(short, long, help = "Use upper case digits")]
    pub upper: bool,
}

impl EncodeArg {
    pub fn run(self) -> anyhow::Result<()> {
        let src = super::input(self.file.as_deref())?;
        let mut enc = HexEncoder::new(super::output(), self.upper);
        let n = enc.read_from(src).context("failed to encode input")?;
        enc.close().context("failed to write output")?;
        tracing::debug!(bytes = n, "encoded");

        let mut out = enc.into_inner();
        writeln!(out).context("failed to write output")?;
        super::finish(&mut out)
    }
}
