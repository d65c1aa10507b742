//! Types shared by the YtRelay crates.
pub mod errors;
pub mod models;
