use std::io::Write;

use anyhow::Context;
use clap::Args;
use hexpipe_codec::write_int64;

#[derive(Clone, Debug, Args)]
pub struct IntArg {
    #[arg(allow_negative_numbers = true, help = "Decimal value to render")]
    pub value:  i64,
    #[arg(short, long, default_value_t = 0, help = "Minimum number of digits, sign excluded")]
    pub digits: usize,
    #[arg(short, long, help = "Use upper case digits")]
    pub upper:  bool,
}

impl IntArg {
    pub fn run(self) -> anyhow::Result<()> {
        let mut out = super::output();
        write_int64(&mut out, self.value, self.upper, self.digits).context("failed to write output")?;
        writeln!(out).context("failed to write output")?;
        super::finish(&mut out)
    }
}
