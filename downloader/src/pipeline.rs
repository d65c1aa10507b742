/// Probe and download operations built on a [`CommandRunner`].
///
/// A download is two explicit steps. `fetch` asks the tool to write the
/// file, then `resolve_produced_file` probes again and renders the template
/// to find out which name the tool actually used.
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use ytrelay_shared::errors::{RelayError, RelayResult};
use ytrelay_shared::models::MediaMetadata;

use crate::command::{fetch_args, probe_args, resolve_args};
use crate::metadata::{parse_metadata, parse_produced_name};
use crate::runner::CommandRunner;
use crate::store::FileStore;

/// Parameters of one fetch.
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    pub url: &'a str,
    pub format: &'a str,
    pub template: &'a str,
    pub cookies: Option<&'a Path>,
}

/// Result of a completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The produced file was found in the download directory.
    Confirmed { filename: String, path: PathBuf },
    /// The tool succeeded but the produced file could not be located.
    Unconfirmed { output_path: PathBuf },
}

/// Runs yt-dlp against a single download directory.
pub struct Downloader {
    runner: Arc<dyn CommandRunner>,
    store: FileStore,
}

impl Downloader {
    pub fn new(runner: Arc<dyn CommandRunner>, store: FileStore) -> Self {
        Self { runner, store }
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Raw `--dump-json` output for `url`. Writes nothing to disk.
    pub async fn probe(&self, url: &str, cookies: Option<&Path>) -> RelayResult<String> {
        let out = self.runner.execute(&probe_args(url, cookies)).await?;
        Ok(out)
    }

    /// Probe and project to the stable metadata subset.
    pub async fn info(&self, url: &str, cookies: Option<&Path>) -> RelayResult<MediaMetadata> {
        let raw = self.probe(url, cookies).await?;
        parse_metadata(&raw)
    }

    /// Ask the tool to write the file. Returns the templated output path.
    pub async fn fetch(&self, req: &FetchRequest<'_>) -> RelayResult<PathBuf> {
        validate_template(req.template)?;
        let output = self.store.root().join(req.template);
        info!("Fetching {} (format={}) -> {}", req.url, req.format, output.display());
        self.runner
            .execute(&fetch_args(req.url, req.format, &output, req.cookies))
            .await?;
        Ok(output)
    }

    /// Re-probe with the fetch's format and output, then locate the file.
    ///
    /// Returns `Ok(None)` when the reported name is not in the directory.
    pub async fn resolve_produced_file(
        &self,
        req: &FetchRequest<'_>,
    ) -> RelayResult<Option<(String, PathBuf)>> {
        let output = self.store.root().join(req.template);
        let raw = self
            .runner
            .execute(&resolve_args(req.url, req.format, &output, req.cookies))
            .await?;
        let filename = parse_produced_name(&raw)?.file_name(req.template);
        if self.store.contains(&filename).await {
            let path = self.store.root().join(&filename);
            Ok(Some((filename, path)))
        } else {
            warn!("Expected download {} not found in {}", filename, self.store.root().display());
            Ok(None)
        }
    }

    /// Fetch, then resolve. A failed resolve only degrades the outcome.
    pub async fn download(&self, req: &FetchRequest<'_>) -> RelayResult<DownloadOutcome> {
        let output_path = self.fetch(req).await?;

        match self.resolve_produced_file(req).await {
            Ok(Some((filename, path))) => {
                info!("Download complete: {}", path.display());
                Ok(DownloadOutcome::Confirmed { filename, path })
            }
            Ok(None) => Ok(DownloadOutcome::Unconfirmed { output_path }),
            Err(e) => {
                warn!("Post-download probe failed for {}: {}", req.url, e);
                Ok(DownloadOutcome::Unconfirmed { output_path })
            }
        }
    }
}

/// Output templates must stay inside the flat download directory.
pub fn validate_template(template: &str) -> RelayResult<()> {
    if template.trim().is_empty() {
        return Err(RelayError::Validation("Filename template is empty".to_string()));
    }
    if template == ".." || template.contains(['/', '\\', '\0']) {
        return Err(RelayError::Validation(format!(
            "Filename template must not contain path separators: {:?}",
            template
        )));
    }
    Ok(())
}
