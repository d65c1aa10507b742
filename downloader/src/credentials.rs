/// Short-lived cookie files materialized from inline request content.
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Name prefix that marks cookie files in the download directory.
pub const COOKIE_FILE_PREFIX: &str = "cookies_";

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// A cookie file owned by a single request.
///
/// The file is removed when the guard is dropped, whichever way the request
/// ends. A failed removal is logged and otherwise ignored.
#[derive(Debug)]
pub struct TempCookieFile {
    path: PathBuf,
}

impl TempCookieFile {
    /// Write `content` to a fresh time-suffixed file inside `dir`.
    pub async fn create(dir: &Path, content: &str) -> std::io::Result<Self> {
        let name = format!(
            "{}{}_{}.txt",
            COOKIE_FILE_PREFIX,
            Utc::now().timestamp_millis(),
            SEQUENCE.fetch_add(1, Ordering::Relaxed)
        );
        let path = dir.join(name);
        tokio::fs::write(&path, content).await?;
        debug!("Created temp cookie file {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempCookieFile {
    fn drop(&mut self) {
        // Blocking unlink on the request's worker thread. The file is a few KB
        // and has to be gone before the handler's response is sent.
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed temp cookie file {}", self.path.display()),
            Err(e) => warn!("Failed to remove temp cookie file {}: {}", self.path.display(), e),
        }
    }
}

/// Cookies to hand to the tool for one request.
#[derive(Debug)]
pub enum Cookies {
    None,
    /// A cookie file the caller says already exists.
    Path(PathBuf),
    /// Inline content written to a file owned by this request.
    Temp(TempCookieFile),
}

impl Cookies {
    /// Pick the cookie source for a request. Inline content wins over a path;
    /// empty values count as absent.
    pub async fn prepare(
        dir: &Path,
        path: Option<&str>,
        content: Option<&str>,
    ) -> std::io::Result<Self> {
        if let Some(content) = content.filter(|c| !c.is_empty()) {
            return Ok(Cookies::Temp(TempCookieFile::create(dir, content).await?));
        }
        Ok(match path.filter(|p| !p.is_empty()) {
            Some(p) => Cookies::Path(PathBuf::from(p)),
            None => Cookies::None,
        })
    }

    /// Path to pass as `--cookies`, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Cookies::None => None,
            Cookies::Path(p) => Some(p.as_path()),
            Cookies::Temp(t) => Some(t.path()),
        }
    }
}
