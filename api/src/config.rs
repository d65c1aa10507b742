/// Server configuration read once at startup.
use std::path::PathBuf;
use std::time::Duration;

/// Everything the server needs from its environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Shared secret for the request gate. `None` fails every gated request closed.
    pub api_key: Option<String>,
    pub download_dir: PathBuf,
    pub ytdlp_bin: String,
    pub ytdlp_timeout: Duration,
}

impl ServerConfig {
    /// Read from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary lookup. Unparsable numbers fall back to defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let host = get("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = get("PORT")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(3000);
        let api_key = get("API_KEY").filter(|k| !k.trim().is_empty());
        let download_dir = get("DOWNLOAD_DIR").unwrap_or_else(|| "./downloads".to_string());
        let ytdlp_bin = get("YTDLP_BIN").unwrap_or_else(|| "yt-dlp".to_string());
        let timeout_secs: u64 = get("YTDLP_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(600);

        Self {
            host,
            port,
            api_key,
            download_dir: PathBuf::from(download_dir),
            ytdlp_bin,
            ytdlp_timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:3000");
        assert_eq!(cfg.api_key, None);
        assert_eq!(cfg.download_dir, PathBuf::from("./downloads"));
        assert_eq!(cfg.ytdlp_bin, "yt-dlp");
        assert_eq!(cfg.ytdlp_timeout, Duration::from_secs(600));
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("PORT", "8080"),
            ("API_KEY", "s3cret"),
            ("DOWNLOAD_DIR", "/data"),
            ("YTDLP_BIN", "/usr/local/bin/yt-dlp"),
            ("YTDLP_TIMEOUT_SECS", "30"),
        ]);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.api_key.as_deref(), Some("s3cret"));
        assert_eq!(cfg.download_dir, PathBuf::from("/data"));
        assert_eq!(cfg.ytdlp_bin, "/usr/local/bin/yt-dlp");
        assert_eq!(cfg.ytdlp_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_empty_key_is_unset_and_bad_numbers_default() {
        let cfg = config(&[("API_KEY", "  "), ("PORT", "http"), ("YTDLP_TIMEOUT_SECS", "-1")]);
        assert_eq!(cfg.api_key, None);
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.ytdlp_timeout, Duration::from_secs(600));
    }
}
