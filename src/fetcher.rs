//! A core module to download, verify and persist images from the API data.
//!
//! See [`Fetcher`] for more information.
//!
//! Following is the low-level module wrapped by this module:
//! - [`crate::download`]
//! - [`crate::hash`]

use std::path::{Path, PathBuf};

use anyhow::Context;
use reqwest::Client;
use tracing::{error, info};

use crate::api::data::field::Image;
use crate::download::fetch_bytes;
use crate::hash::sha512_hex;

type ApiImageData = Vec<Image>;

/// The result of processing a single record.
enum SingleFetchResult {
    /// The file was downloaded, verified and written.
    Written,
    /// The file already existed.
    Skipped,
}

/// current download number status
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStatus {
    /// the number of files that were downloaded, verified and written
    pub written: u64,
    /// the number of files that already existed, which means no need to download
    pub skipped: u64,
    /// the number of records that failed to download or verify
    pub failed: u64,
}

/** The fetcher to download images from the API data.

- This struct will download each image of the API data to the `destdir`,
    one at a time, in the order the API returned them.

- Every downloaded body is hashed with SHA-512 and compared against the
    hash the API reported for that image. *Only a verified body is written
    to disk; a mismatching one is discarded.*

- *If the file already exists, the record is skipped without touching the
    network.* This is a presence check only, so interrupted runs can simply
    be re-invoked.

- A failure on one record never stops the run; it is logged with the
    record id and the next record is processed.

# Example
```no_run
use reqwest::Client;
use derpi_dl::api::BatchGetter;
use derpi_dl::config::SearchQuery;
use derpi_dl::fetcher::Fetcher;

#[tokio::main]
async fn main() {
    let client = Client::new();
    let search = SearchQuery::resolve(None, "cat".to_string(), 10);

    let images = BatchGetter::new(&client, &search)
        .run()
        .await
        .expect("failed to get data from API");

    let fetcher = Fetcher::build(client, "download_dir").await.unwrap();
    fetcher.run(images).await;
}
```
*/
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    destdir: PathBuf,
}

impl Fetcher {
    /// Create a new fetcher, making sure `destdir` exists.
    ///
    /// Only a single directory level is created; the parent must already
    /// exist.
    ///
    /// # Errors
    ///
    /// If `destdir` cannot be created, or the path exists but is not a
    /// directory, an error will be returned.
    pub async fn build(client: Client, destdir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let destdir = destdir.into();
        let is_dir = tokio::fs::metadata(&destdir)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !is_dir {
            tokio::fs::create_dir(&destdir).await?;
        }
        Ok(Self { client, destdir })
    }

    /// Whether a regular file already exists at `path`.
    #[inline]
    async fn is_file(path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    /// Process a single record: skip, or fetch, verify and write.
    ///
    /// The body only reaches the disk after its SHA-512 hash matched the
    /// record's expected hash.
    async fn process(&self, image: &Image) -> anyhow::Result<SingleFetchResult> {
        let filepath = self.destdir.join(&image.filename);

        if Self::is_file(&filepath).await {
            info!(id = image.id, "file already exists, skipping");
            return Ok(SingleFetchResult::Skipped);
        }

        info!(id = image.id, "now downloading image");
        let bytes = fetch_bytes(&self.client, image.full_url.as_str())
            .await
            .with_context(|| format!("download for {} did not complete", image.id))?;

        let digest = sha512_hex(&bytes);
        if !digest.eq_ignore_ascii_case(&image.sha512_hash) {
            anyhow::bail!("sha512 hashes for {} do not match", image.id);
        }

        tokio::fs::write(&filepath, &bytes)
            .await
            .with_context(|| format!("failed to write {}", filepath.display()))?;

        Ok(SingleFetchResult::Written)
    }

    /// Process all records in order and report how the run went.
    ///
    /// Per-record failures are logged with the record id and never
    /// interrupt the remaining records.
    pub async fn run(&self, images: ApiImageData) -> RunStatus {
        let mut status = RunStatus::default();
        for image in &images {
            match self.process(image).await {
                Ok(SingleFetchResult::Written) => status.written += 1,
                Ok(SingleFetchResult::Skipped) => status.skipped += 1,
                // why `{:#}`: https://docs.rs/anyhow/1.0.86/anyhow/struct.Error.html#display-representations
                Err(err) => {
                    status.failed += 1;
                    error!(id = image.id, "{err:#}");
                }
            }
        }
        status
    }
}
