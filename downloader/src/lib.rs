//! YtRelay downloader
//!
//! Drives the external yt-dlp binary and manages the flat download
//! directory it writes into:
//! - `runner`: the one seam where a subprocess is spawned
//! - `command`: argument lists for probe and fetch invocations
//! - `metadata`: projection of `--dump-json` output
//! - `credentials`: short-lived cookie files built from inline content
//! - `pipeline`: fetch, then resolve the produced file
//! - `store`: list, open and delete downloaded files
pub mod command;
pub mod credentials;
pub mod metadata;
pub mod pipeline;
pub mod runner;
pub mod store;

pub use credentials::{Cookies, TempCookieFile};
pub use pipeline::{DownloadOutcome, Downloader, FetchRequest};
pub use runner::{CommandRunner, YtDlpRunner};
pub use store::FileStore;
