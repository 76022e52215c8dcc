use std::io::Write;
use std::path::Path;

use futures_util::StreamExt;
use hexpipe_fs::{WriteOptions, Writer};
use hexpipe_verify::{HashChecksum, HashVerifier, VerificationError, verify_file};

use crate::error::{FetchError, Result};
use crate::http::HttpClient;
use crate::options::FetchOptions;

/// Result of [`Fetcher::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The destination was downloaded again.
    Updated { bytes: u64 },
    /// The destination already matched every checksum.
    UpToDate,
}

/// Downloads a URL into a file, verifying it before it becomes visible.
pub struct Fetcher<C: HttpClient> {
    client: C,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: C) -> Self { Self { client } }

    pub fn client(&self) -> &C { &self.client }

    /// GETs `url` into `dest` and returns the number of body bytes.
    ///
    /// The body goes to a temp file beside `dest` while every checksum's
    /// hash sees the same bytes. The temp file replaces `dest` only when the
    /// status was 200 and all checksums match; otherwise it is removed and
    /// `dest` is left as it was.
    pub async fn download(
        &self,
        url: &str,
        dest: &Path,
        checksums: &[HashChecksum],
        options: &FetchOptions,
    ) -> Result<u64> {
        let verifiers = checksums.iter().map(HashChecksum::verifier).collect::<std::result::Result<Vec<_>, _>>()?;

        tracing::info!(url, dest = %dest.display(), checksums = verifiers.len(), "fetch started");
        let network = |e: C::Error| FetchError::Network { url: url.to_string(), source: Box::new(e) };
        let response = self.client.get(url, &options.headers).await.map_err(network)?;
        tracing::debug!(url, status = response.status, "response received");
        if response.status != 200 {
            return Err(FetchError::HttpStatus {
                url:    url.to_string(),
                status: response.status,
                text:   response.reason,
            });
        }

        let mut write_opts = WriteOptions::new()
            .raw(true)
            .backup(true)
            .perm(options.perm)
            .mk_dirs(options.mk_dirs);
        for v in &verifiers {
            write_opts = write_opts.tee(v.clone());
        }
        let judged = verifiers.clone();
        write_opts = write_opts.verify_fn(move || judged.iter().all(HashVerifier::matches));

        // Dropping the writer on an early return discards the temp file.
        let mut writer = Writer::open(dest, write_opts)?;
        let mut body = response.body;
        let mut bytes = 0u64;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(network)?;
            writer
                .write_all(&chunk)
                .map_err(|source| FetchError::Body { path: dest.to_path_buf(), source })?;
            bytes += chunk.len() as u64;
        }

        match writer.close() {
            Ok(()) => {
                tracing::info!(url, bytes, "fetch committed");
                Ok(bytes)
            }
            Err(e) if e.is_verification_failure() => Err(mismatch(&verifiers).unwrap_or(FetchError::Write(e))),
            Err(e) => Err(e.into()),
        }
    }

    /// Downloads only when `dest` does not already satisfy `checksums`.
    ///
    /// With no checksums there is nothing to compare, so the download
    /// always happens.
    pub async fn update(
        &self,
        url: &str,
        dest: &Path,
        checksums: &[HashChecksum],
        options: &FetchOptions,
    ) -> Result<UpdateOutcome> {
        if !checksums.is_empty() && verify_file(dest, checksums)? {
            tracing::info!(dest = %dest.display(), "already up to date");
            return Ok(UpdateOutcome::UpToDate);
        }
        let bytes = self.download(url, dest, checksums, options).await?;
        Ok(UpdateOutcome::Updated { bytes })
    }
}

/// The first failing verifier, as a mismatch error.
fn mismatch(verifiers: &[HashVerifier]) -> Option<FetchError> {
    verifiers.iter().find_map(|v| match v.check() {
        Err(VerificationError::Mismatch { expected, actual }) => {
            tracing::warn!(%expected, %actual, "checksum mismatch");
            Some(FetchError::ChecksumMismatch { expected, actual })
        }
        _ => None,
    })
}
