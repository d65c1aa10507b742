/// Projection of yt-dlp `--dump-json` output.
use serde::Deserialize;
use std::path::Path;

use ytrelay_shared::errors::{RelayError, RelayResult};
use ytrelay_shared::models::MediaMetadata;

/// Parse probe output into the stable metadata subset.
///
/// Fails with [`RelayError::Parse`] on invalid JSON or when `title` or
/// `formats` is missing. Format order is kept as the tool reported it.
pub fn parse_metadata(raw: &str) -> RelayResult<MediaMetadata> {
    serde_json::from_str(raw.trim()).map_err(|e| RelayError::Parse(e.to_string()))
}

/// What a probe says about the file a fetch would write.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProducedName {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    pub ext: String,
    /// Output path as the tool itself renders it; present when `-o` was given.
    #[serde(rename = "_filename", default)]
    pub filename: Option<String>,
}

impl ProducedName {
    /// Bare file name the tool writes for `template`.
    ///
    /// Uses the tool's own `_filename` when reported, otherwise renders the
    /// template locally.
    pub fn file_name(&self, template: &str) -> String {
        self.filename
            .as_deref()
            .and_then(|f| Path::new(f).file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.render(template))
    }

    /// Render `template` from `%(title)s`, `%(ext)s` and `%(id)s` only. Path
    /// separators in values are swapped for the lookalike yt-dlp uses.
    pub fn render(&self, template: &str) -> String {
        let id = self.id.as_deref().unwrap_or_default();
        template
            .replace("%(title)s", &sanitize(&self.title))
            .replace("%(ext)s", &sanitize(&self.ext))
            .replace("%(id)s", &sanitize(id))
    }
}

fn sanitize(value: &str) -> String {
    value.replace('/', "\u{29F8}").replace('\\', "\u{29F9}")
}

/// Parse probe output into the fields needed to locate a produced file.
pub fn parse_produced_name(raw: &str) -> RelayResult<ProducedName> {
    serde_json::from_str(raw.trim()).map_err(|e| RelayError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROBE: &str = r#"{
        "id": "dQw4w9WgXcQ",
        "title": "Never Gonna Give You Up",
        "ext": "webm",
        "duration": 212,
        "uploader": "Rick Astley",
        "view_count": 1500000000,
        "like_count": 17000000,
        "thumbnail": "https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg",
        "description": "not part of the projection",
        "tags": ["music"],
        "formats": [
            {"format_id": "251", "ext": "webm", "resolution": "audio only", "fps": null,
             "filesize": 3437753, "vcodec": "none", "acodec": "opus", "tbr": 130.5, "url": "https://x"},
            {"format_id": "137", "ext": "mp4", "resolution": "1920x1080", "fps": 25,
             "filesize": null, "vcodec": "avc1.640028", "acodec": "none"},
            {"format_id": "18", "ext": "mp4", "resolution": "640x360", "fps": 25,
             "vcodec": "avc1.42001E", "acodec": "mp4a.40.2"}
        ]
    }"#;

    #[test]
    fn test_parse_projects_subset() {
        let meta = parse_metadata(PROBE).unwrap();
        assert_eq!(meta.title, "Never Gonna Give You Up");
        assert_eq!(meta.duration, Some(212.0));
        assert_eq!(meta.uploader.as_deref(), Some("Rick Astley"));
        assert_eq!(meta.view_count, Some(1_500_000_000));
        assert_eq!(meta.like_count, Some(17_000_000));

        let value = serde_json::to_value(&meta).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("description"));
        assert!(!obj.contains_key("tags"));
        assert_eq!(obj.len(), 7);
    }

    #[test]
    fn test_format_order_and_fields() {
        let meta = parse_metadata(PROBE).unwrap();
        let ids: Vec<&str> = meta.formats.iter().map(|f| f.format_id.as_str()).collect();
        assert_eq!(ids, vec!["251", "137", "18"]);

        assert_eq!(meta.formats[0].filesize, Some(3_437_753));
        assert_eq!(meta.formats[1].filesize, None);
        assert_eq!(meta.formats[1].fps, Some(25.0));

        let value = serde_json::to_value(&meta.formats[0]).unwrap();
        let mut keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["acodec", "ext", "filesize", "format_id", "fps", "resolution", "vcodec"]
        );
    }

    #[test]
    fn test_missing_title_or_formats() {
        assert!(matches!(
            parse_metadata(r#"{"formats": []}"#),
            Err(RelayError::Parse(_))
        ));
        assert!(matches!(
            parse_metadata(r#"{"title": "x"}"#),
            Err(RelayError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse_metadata("ERROR: nope"), Err(RelayError::Parse(_))));
        assert!(matches!(parse_metadata(""), Err(RelayError::Parse(_))));
    }

    #[test]
    fn test_render_default_template() {
        let name = parse_produced_name(PROBE).unwrap();
        assert_eq!(name.render("%(title)s.%(ext)s"), "Never Gonna Give You Up.webm");
        assert_eq!(name.render("%(id)s-%(title)s.%(ext)s"), "dQw4w9WgXcQ-Never Gonna Give You Up.webm");
    }

    #[test]
    fn test_render_keeps_name_flat() {
        let name = ProducedName {
            id: None,
            title: "AC/DC live".to_string(),
            ext: "mp4".to_string(),
            filename: None,
        };
        let rendered = name.render("%(title)s.%(ext)s");
        assert!(!rendered.contains('/'));
        assert!(rendered.ends_with(".mp4"));
    }

    #[test]
    fn test_file_name_prefers_tool_report() {
        let raw = r#"{"id":"q1","title":"Q: Why?","ext":"m4a",
            "_filename":"/data/Q\uff1a Why\uff1f.m4a","formats":[]}"#;
        let name = parse_produced_name(raw).unwrap();
        assert_eq!(name.file_name("%(title)s.%(ext)s"), "Q\u{FF1A} Why\u{FF1F}.m4a");
    }

    #[test]
    fn test_file_name_falls_back_to_render() {
        let name = parse_produced_name(PROBE).unwrap();
        assert_eq!(name.filename, None);
        assert_eq!(name.file_name("%(title)s.%(ext)s"), "Never Gonna Give You Up.webm");
    }
}
