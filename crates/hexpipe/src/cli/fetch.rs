use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use hexpipe_fetch::{FetchOptions, Fetcher, ReqwestClient, UpdateOutcome};
use hexpipe_verify::HashChecksum;

#[derive(Clone, Debug, Args)]
pub struct FetchArg {
    pub url:     String,
    pub dest:    PathBuf,
    #[arg(long, value_name = "HEX", help = "Expected SHA-256 digest, repeatable")]
    pub sha256:  Vec<String>,
    #[arg(long, value_name = "HEX", help = "Expected MD5 digest, repeatable")]
    pub md5:     Vec<String>,
    #[arg(long, help = "Skip the download when DEST already matches every checksum")]
    pub update:  bool,
    #[arg(long, help = "Create missing parent directories")]
    pub mk_dirs: bool,
}

impl FetchArg {
    pub fn checksums(&self) -> Vec<HashChecksum> {
        let sha256 = self.sha256.iter().map(|h| HashChecksum::sha256(h.as_str()));
        let md5 = self.md5.iter().map(|h| HashChecksum::md5(h.as_str()));
        sha256.chain(md5).collect()
    }

    pub fn run(self) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")?;
        runtime.block_on(self.fetch())
    }

    async fn fetch(self) -> anyhow::Result<()> {
        let fetcher = Fetcher::new(ReqwestClient::new());
        let checksums = self.checksums();
        let opts = FetchOptions::default().mk_dirs(self.mk_dirs);
        let ctx = || format!("failed to fetch {} into {}", self.url, self.dest.display());

        if self.update {
            let outcome = fetcher.update(&self.url, &self.dest, &checksums, &opts).await.with_context(ctx)?;
            match outcome {
                UpdateOutcome::UpToDate => eprintln!("{} is up to date", self.dest.display()),
                UpdateOutcome::Updated { bytes } => eprintln!("{} updated ({bytes} bytes)", self.dest.display()),
            }
        } else {
            let bytes = fetcher.download(&self.url, &self.dest, &checksums, &opts).await.with_context(ctx)?;
            eprintln!("{} written ({bytes} bytes)", self.dest.display());
        }
        Ok(())
    }
}
