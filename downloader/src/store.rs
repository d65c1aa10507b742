/// The flat download directory: listing, opening and deleting files.
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use ytrelay_shared::errors::{RelayError, RelayResult};
use ytrelay_shared::models::StoredFile;

/// Files produced by downloads, addressed by bare file name.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory if it does not exist yet.
    pub async fn ensure_root(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Regular files directly inside the directory, sorted by name.
    pub async fn list(&self) -> RelayResult<Vec<StoredFile>> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            // Entries can vanish between read_dir and stat (temp cookie files,
            // dangling links); skip them.
            let meta = match tokio::fs::metadata(entry.path()).await {
                Ok(meta) => meta,
                Err(e) => {
                    warn!("Skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            };
            if !meta.is_file() {
                continue;
            }
            let modified = meta.modified()?;
            // Some filesystems do not record birth time.
            let created = meta.created().unwrap_or(modified);

            files.push(StoredFile {
                name: entry.file_name().to_string_lossy().to_string(),
                size: meta.len(),
                created: DateTime::<Utc>::from(created),
                modified: DateTime::<Utc>::from(modified),
            });
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Map a caller-supplied name to a path inside the directory.
    ///
    /// Names that could escape the directory are a validation error.
    pub fn resolve(&self, name: &str) -> RelayResult<PathBuf> {
        if !is_safe_name(name) {
            return Err(RelayError::Validation(format!("Invalid filename: {:?}", name)));
        }
        Ok(self.root.join(name))
    }

    /// Whether `name` is an existing regular file.
    pub async fn contains(&self, name: &str) -> bool {
        match self.resolve(name) {
            Ok(path) => tokio::fs::metadata(&path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Open a file for streaming. Returns the handle and its length.
    pub async fn open(&self, name: &str) -> RelayResult<(tokio::fs::File, u64)> {
        let path = self.resolve(name)?;
        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|_| RelayError::NotFound(name.to_string()))?;
        if !meta.is_file() {
            return Err(RelayError::NotFound(name.to_string()));
        }
        let file = tokio::fs::File::open(&path).await?;
        Ok((file, meta.len()))
    }

    /// Remove a file. Any removal failure is reported as not found.
    pub async fn delete(&self, name: &str) -> RelayResult<()> {
        let path = self.resolve(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted {}", path.display());
                Ok(())
            }
            Err(e) => {
                warn!("Failed to delete {}: {}", path.display(), e);
                Err(RelayError::NotFound(name.to_string()))
            }
        }
    }
}

/// A bare file name: no separators, no parent segments, no NUL.
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
