use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use hexpipe_codec::{DumpConfig, FormatConfig, HexDumper, canonical};

#[derive(Clone, Debug, Args)]
pub struct DumpArg {
    /// Input file, stdin when omitted
    pub file:      Option<PathBuf>,
    #[arg(long, default_value = " ", conflicts_with = "canonical", help = "Separator between blocks")]
    pub sep:       String,
    #[arg(long, default_value_t = 2, conflicts_with = "canonical", help = "Bytes per block")]
    pub block:     usize,
    #[arg(long, default_value_t = 8, conflicts_with = "canonical", help = "Blocks per line")]
    pub line:      usize,
    #[arg(short, long, help = "Use upper case digits")]
    pub upper:     bool,
    #[arg(short = 'C', long, help = "hexdump -C layout with offsets and an ASCII gutter")]
    pub canonical: bool,
}

impl DumpArg {
    pub fn config(&self) -> DumpConfig {
        if self.canonical {
            return canonical(self.upper);
        }
        let format = FormatConfig::new().sep(self.sep.as_str()).block_len(self.block).upper(self.upper);
        DumpConfig::new(format).blocks_per_line(self.line).line_sep("\n")
    }

    pub fn run(self) -> anyhow::Result<()> {
        let src = super::input(self.file.as_deref())?;
        let mut dumper = HexDumper::new(super::output(), self.config());
        let n = dumper.read_from(src).context("failed to dump input")?;
        dumper.close().context("failed to write output")?;
        tracing::debug!(bytes = n, "dumped");
        super::finish(&mut dumper.into_inner())
    }
}
