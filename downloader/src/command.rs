/// Argument lists for yt-dlp invocations.
///
/// The URL always follows a `--` so a caller cannot smuggle in options.
use std::path::Path;

/// Format selector used when the caller does not pick one.
pub const DEFAULT_FORMAT: &str = "best";

/// Output filename template used when the caller does not pick one.
pub const DEFAULT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Build a metadata-only probe.
pub fn probe_args(url: &str, cookies: Option<&Path>) -> Vec<String> {
    let mut args = vec!["--dump-json".to_string(), "--no-playlist".to_string()];
    push_tail(&mut args, cookies, url);
    args
}

/// Build a metadata-only probe for the same format and output as a fetch.
///
/// The tool then reports the name it writes under `_filename`.
pub fn resolve_args(url: &str, format: &str, output: &Path, cookies: Option<&Path>) -> Vec<String> {
    let mut args = vec![
        "--dump-json".to_string(),
        "--no-playlist".to_string(),
        "-f".to_string(),
        format.to_string(),
        "-o".to_string(),
        output.display().to_string(),
    ];
    push_tail(&mut args, cookies, url);
    args
}

/// Build a fetch that writes the selected format to `output`.
pub fn fetch_args(url: &str, format: &str, output: &Path, cookies: Option<&Path>) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        format.to_string(),
        "-o".to_string(),
        output.display().to_string(),
        "--no-playlist".to_string(),
    ];
    push_tail(&mut args, cookies, url);
    args
}

fn push_tail(args: &mut Vec<String>, cookies: Option<&Path>, url: &str) {
    if let Some(path) = cookies {
        args.push("--cookies".to_string());
        args.push(path.display().to_string());
    }
    args.push("--".to_string());
    args.push(url.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_without_cookies() {
        let args = probe_args("https://youtu.be/abc", None);
        assert_eq!(args, vec!["--dump-json", "--no-playlist", "--", "https://youtu.be/abc"]);
    }

    #[test]
    fn test_probe_with_cookies() {
        let args = probe_args("https://youtu.be/abc", Some(Path::new("/tmp/c.txt")));
        assert_eq!(
            args,
            vec!["--dump-json", "--no-playlist", "--cookies", "/tmp/c.txt", "--", "https://youtu.be/abc"]
        );
    }

    #[test]
    fn test_fetch_args() {
        let out = Path::new("/data").join(DEFAULT_TEMPLATE);
        let args = fetch_args("https://youtu.be/abc", "bestaudio", &out, None);
        assert_eq!(args[0..2], ["-f", "bestaudio"]);
        assert_eq!(args[2], "-o");
        assert_eq!(args[3], "/data/%(title)s.%(ext)s");
        assert_eq!(args.last().map(String::as_str), Some("https://youtu.be/abc"));
        assert!(!args.iter().any(|a| a == "--cookies"));
    }

    #[test]
    fn test_resolve_carries_format_and_output() {
        let out = Path::new("/data").join(DEFAULT_TEMPLATE);
        let args = resolve_args("https://youtu.be/abc", "bestaudio", &out, None);
        assert_eq!(args[0], "--dump-json");
        assert_eq!(args[2..6], ["-f", "bestaudio", "-o", "/data/%(title)s.%(ext)s"]);
        assert_eq!(args[args.len() - 2..], ["--", "https://youtu.be/abc"]);
    }

    #[test]
    fn test_option_like_url_stays_positional() {
        let url = "--batch-file=/etc/hostname";
        let out = Path::new("/data").join(DEFAULT_TEMPLATE);
        for args in [
            probe_args(url, None),
            resolve_args(url, "best", &out, None),
            fetch_args(url, "best", &out, Some(Path::new("/tmp/c.txt"))),
        ] {
            let sep = args.iter().position(|a| a == "--").unwrap();
            assert_eq!(args[sep + 1..], [url]);
        }
    }
}
