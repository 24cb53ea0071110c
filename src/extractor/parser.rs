//! Parsing of yt-dlp JSON metadata into playlist and track values

use crate::error::{Error, Result};
use crate::types::{Playlist, Track, TrackProbe};
use serde_json::Value;
use std::str;

/// Exit status of an external command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// The command exited successfully (exit code 0)
    Success,
    /// The command exited with a non-zero exit code
    Failure,
}

impl ExitStatus {
    /// Returns `true` if the exit status represents success
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<bool> for ExitStatus {
    fn from(success: bool) -> Self {
        if success {
            Self::Success
        } else {
            Self::Failure
        }
    }
}

/// Parse the JSON document printed by `--dump-single-json`
///
/// With `tolerate_failure`, a non-zero exit is accepted as long as stdout
/// still holds a JSON document; yt-dlp exits 1 when `--ignore-errors` skipped
/// some playlist entries.
pub fn parse_info_output(
    stdout: &[u8],
    stderr: &[u8],
    exit_status: ExitStatus,
    tolerate_failure: bool,
) -> Result<Value> {
    if !exit_status.is_success() && !tolerate_failure {
        return Err(Error::ExternalTool(format!(
            "yt-dlp failed: {}",
            summarize_stderr(stderr)
        )));
    }

    let output = String::from_utf8_lossy(stdout);
    let output = output.trim();
    if output.is_empty() {
        return Err(Error::ExternalTool(format!(
            "yt-dlp returned no metadata: {}",
            summarize_stderr(stderr)
        )));
    }

    let value: Value = match serde_json::from_str(output) {
        Ok(v) => v,
        Err(e) if exit_status.is_success() => return Err(Error::Serialization(e)),
        Err(_) => {
            return Err(Error::ExternalTool(format!(
                "yt-dlp failed: {}",
                summarize_stderr(stderr)
            )));
        }
    };

    if !exit_status.is_success() {
        tracing::warn!(
            stderr = %summarize_stderr(stderr),
            "yt-dlp reported errors for some entries, continuing with partial metadata"
        );
    }

    Ok(value)
}

/// Reduce yt-dlp's stderr to the most useful single line
///
/// Prefers the last `ERROR:` line, then the last non-empty line.
pub fn summarize_stderr(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| lines.last())
        .map(|l| l.to_string())
        .unwrap_or_else(|| "no output".to_string())
}

/// Read a non-empty string field; numeric identifiers are accepted too
fn str_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Build a track from one playlist entry
///
/// Returns `None` for placeholders (`null`, non-objects) and for entries
/// missing a URL, title or id, which covers geo-restricted, deleted and
/// private tracks.
pub fn track_from_entry(entry: &Value) -> Option<Track> {
    if !entry.is_object() {
        return None;
    }

    let url = str_field(entry, "webpage_url").or_else(|| str_field(entry, "url"))?;
    let title = str_field(entry, "title")?;
    let id = str_field(entry, "id")?;
    let artist = str_field(entry, "uploader")
        .or_else(|| str_field(entry, "uploader_id"))
        .unwrap_or_default();

    Track::new(id, title, artist, url)
}

/// Build a playlist from the top-level metadata document
///
/// Malformed entries are dropped. A document without a top-level `id` or
/// `title` is an extraction error.
pub fn playlist_from_info(info: &Value) -> Result<Playlist> {
    let id = str_field(info, "id")
        .ok_or_else(|| Error::Extraction("playlist metadata has no id".to_string()))?;
    let title = str_field(info, "title")
        .ok_or_else(|| Error::Extraction("playlist metadata has no title".to_string()))?;

    let raw_entries = info
        .get("entries")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let tracks: Vec<Track> = raw_entries.iter().filter_map(track_from_entry).collect();

    let skipped = raw_entries.len() - tracks.len();
    if skipped > 0 {
        tracing::info!(
            playlist_id = %id,
            skipped,
            "Dropped unavailable or malformed playlist entries"
        );
    }

    Ok(Playlist { id, title, tracks })
}

/// Build a probe result from a single-track metadata document
///
/// The proposed filename comes from `filename` / `_filename` (present when an
/// output template was passed), falling back to the title. Any directory part
/// and a trailing `.<ext>` matching the media extension are removed.
pub fn probe_from_info(info: &Value) -> Result<TrackProbe> {
    let id = str_field(info, "id")
        .ok_or_else(|| Error::ExternalTool("track metadata has no id".to_string()))?;
    let title = str_field(info, "title")
        .ok_or_else(|| Error::ExternalTool("track metadata has no title".to_string()))?;
    let uploader = str_field(info, "uploader")
        .or_else(|| str_field(info, "uploader_id"))
        .unwrap_or_default();
    let ext = str_field(info, "ext");

    let raw_filename = str_field(info, "filename")
        .or_else(|| str_field(info, "_filename"))
        .unwrap_or_else(|| title.clone());

    let base = std::path::Path::new(&raw_filename)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| raw_filename.clone());

    let proposed_filename = match &ext {
        Some(ext) => base
            .strip_suffix(&format!(".{ext}"))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or(base),
        None => base,
    };

    Ok(TrackProbe {
        id,
        title,
        uploader,
        proposed_filename,
        ext,
    })
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -----------------------------------------------------------------------
    // track_from_entry / playlist_from_info
    // -----------------------------------------------------------------------

    #[test]
    fn playlist_keeps_well_formed_entries_in_order() {
        let info = json!({
            "id": "1001",
            "title": "Late Night",
            "entries": [
                {"id": "1", "title": "One", "uploader": "A", "webpage_url": "https://sc/a/one"},
                {"id": "2", "title": "Two", "uploader": "B", "webpage_url": "https://sc/b/two"}
            ]
        });

        let playlist = playlist_from_info(&info).unwrap();
        assert_eq!(playlist.id, "1001");
        assert_eq!(playlist.title, "Late Night");
        let ids: Vec<&str> = playlist.tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn playlist_drops_null_and_malformed_entries() {
        let info = json!({
            "id": "p",
            "title": "Mixed",
            "entries": [
                null,
                "not-an-object",
                {"id": "1", "title": "Good", "webpage_url": "https://sc/1"},
                {"id": "2", "title": "No url"},
                {"id": "3", "webpage_url": "https://sc/3"},
                {"title": "No id", "webpage_url": "https://sc/4"},
                {"id": "5", "title": "", "webpage_url": "https://sc/5"},
                {"id": "6", "title": "Also good", "url": "https://sc/6"}
            ]
        });

        let playlist = playlist_from_info(&info).unwrap();
        let ids: Vec<&str> = playlist.tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "6"]);
    }

    #[test]
    fn entry_prefers_webpage_url_over_url() {
        let entry = json!({
            "id": "1",
            "title": "T",
            "url": "https://cdn/stream.mp3",
            "webpage_url": "https://sc/a/t"
        });
        assert_eq!(track_from_entry(&entry).unwrap().url, "https://sc/a/t");
    }

    #[test]
    fn entry_artist_falls_back_to_uploader_id_then_empty() {
        let with_id = json!({"id": "1", "title": "T", "url": "u", "uploader_id": "dj-x"});
        assert_eq!(track_from_entry(&with_id).unwrap().artist, "dj-x");

        let bare = json!({"id": "1", "title": "T", "url": "u"});
        assert_eq!(track_from_entry(&bare).unwrap().artist, "");
    }

    #[test]
    fn entry_accepts_numeric_id() {
        let entry = json!({"id": 123456, "title": "T", "url": "u"});
        assert_eq!(track_from_entry(&entry).unwrap().id, "123456");
    }

    #[test]
    fn playlist_without_entries_is_empty() {
        let info = json!({"id": "p", "title": "Empty"});
        assert!(playlist_from_info(&info).unwrap().tracks.is_empty());

        let null_entries = json!({"id": "p", "title": "Empty", "entries": null});
        assert!(playlist_from_info(&null_entries).unwrap().tracks.is_empty());
    }

    #[test]
    fn playlist_without_title_is_an_extraction_error() {
        let info = json!({"id": "p", "entries": []});
        assert!(matches!(
            playlist_from_info(&info),
            Err(Error::Extraction(_))
        ));
    }

    #[test]
    fn playlist_without_id_is_an_extraction_error() {
        let info = json!({"title": "t", "entries": []});
        assert!(matches!(
            playlist_from_info(&info),
            Err(Error::Extraction(_))
        ));
    }

    // -----------------------------------------------------------------------
    // probe_from_info
    // -----------------------------------------------------------------------

    #[test]
    fn probe_uses_filename_field() {
        let info = json!({
            "id": "9",
            "title": "Night Drive",
            "uploader": "Synth",
            "ext": "mp3",
            "filename": "Night Drive"
        });
        let probe = probe_from_info(&info).unwrap();
        assert_eq!(probe.proposed_filename, "Night Drive");
        assert_eq!(probe.uploader, "Synth");
        assert_eq!(probe.ext.as_deref(), Some("mp3"));
    }

    #[test]
    fn probe_strips_directory_and_media_extension() {
        let info = json!({
            "id": "9",
            "title": "Night Drive",
            "ext": "opus",
            "_filename": "/tmp/work/Night Drive.opus"
        });
        let probe = probe_from_info(&info).unwrap();
        assert_eq!(probe.proposed_filename, "Night Drive");
    }

    #[test]
    fn probe_keeps_dots_that_are_not_the_extension() {
        let info = json!({
            "id": "9",
            "title": "Mix vol.2",
            "ext": "mp3",
            "filename": "Mix vol.2"
        });
        assert_eq!(probe_from_info(&info).unwrap().proposed_filename, "Mix vol.2");
    }

    #[test]
    fn probe_falls_back_to_title() {
        let info = json!({"id": "9", "title": "Only Title"});
        let probe = probe_from_info(&info).unwrap();
        assert_eq!(probe.proposed_filename, "Only Title");
        assert!(probe.ext.is_none());
    }

    #[test]
    fn probe_without_id_fails() {
        let info = json!({"title": "x"});
        assert!(matches!(probe_from_info(&info), Err(Error::ExternalTool(_))));
    }

    // -----------------------------------------------------------------------
    // parse_info_output / summarize_stderr
    // -----------------------------------------------------------------------

    #[test]
    fn parse_accepts_successful_json() {
        let value = parse_info_output(br#"{"id":"1"}"#, b"", ExitStatus::Success, false).unwrap();
        assert_eq!(value["id"], "1");
    }

    #[test]
    fn parse_decodes_invalid_utf8_lossily() {
        let stdout = b"{\"id\":\"1\",\"title\":\"Caf\xe9\"}";
        let value = parse_info_output(stdout, b"", ExitStatus::Success, false).unwrap();
        assert_eq!(value["id"], "1");
        assert_eq!(value["title"], "Caf\u{FFFD}");
    }

    #[test]
    fn parse_rejects_failure_when_not_tolerated() {
        let result = parse_info_output(
            br#"{"id":"1"}"#,
            b"ERROR: [soundcloud] 1: track removed\n",
            ExitStatus::Failure,
            false,
        );
        match result {
            Err(Error::ExternalTool(msg)) => assert!(msg.contains("track removed")),
            other => panic!("expected ExternalTool error, got {other:?}"),
        }
    }

    #[test]
    fn parse_tolerates_failure_with_json_output() {
        let value = parse_info_output(
            br#"{"id":"p","entries":[null]}"#,
            b"ERROR: [soundcloud] 2: geo restricted\n",
            ExitStatus::Failure,
            true,
        )
        .unwrap();
        assert_eq!(value["id"], "p");
    }

    #[test]
    fn parse_failure_without_json_is_external_tool_error() {
        let result = parse_info_output(
            b"",
            b"ERROR: Unable to download JSON metadata: HTTP Error 404\n",
            ExitStatus::Failure,
            true,
        );
        match result {
            Err(Error::ExternalTool(msg)) => assert!(msg.contains("HTTP Error 404")),
            other => panic!("expected ExternalTool error, got {other:?}"),
        }
    }

    #[test]
    fn parse_invalid_json_on_success_is_serialization_error() {
        let result = parse_info_output(b"not json", b"", ExitStatus::Success, false);
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn summarize_prefers_last_error_line() {
        let stderr = b"WARNING: something\nERROR: first\n[info] noise\nERROR: second\nfooter\n";
        assert_eq!(summarize_stderr(stderr), "ERROR: second");
    }

    #[test]
    fn summarize_falls_back_to_last_line_or_placeholder() {
        assert_eq!(summarize_stderr(b"one\ntwo\n\n"), "two");
        assert_eq!(summarize_stderr(b""), "no output");
    }
}
