use clap::{Parser, Subcommand};

use super::{dump, encode, fetch, int};

#[derive(Clone, Debug, Parser)]
#[command(name = "hexpipe", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "e", name = "encode", about = "Hex encode a file or stdin")]
    Encode(encode::EncodeArg),
    #[command(alias = "d", name = "dump", about = "Write a line oriented hex dump")]
    Dump(dump::DumpArg),
    #[command(name = "int", about = "Render a signed integer in fixed width hex")]
    Int(int::IntArg),
    #[command(alias = "f", name = "fetch", about = "Download a URL into a verified file")]
    Fetch(fetch::FetchArg),
}

impl App {
    pub fn run(self) -> anyhow::Result<()> {
        match self.cmd {
            Commands::Encode(arg) => arg.run(),
            Commands::Dump(arg) => arg.run(),
            Commands::Int(arg) => arg.run(),
            Commands::Fetch(arg) => arg.run(),
        }
    }
}
