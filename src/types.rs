//! Data transfer objects exchanged with the server API.
//!
//! The server is lenient about numeric vs. string identifiers, so identity fields accept
//! both and are normalized to strings on ingest.

use serde::{Deserialize, Deserializer, Serialize};

/// One media item as listed by `/api/list` or `/api/library/list`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct FileEntry {
    /// Server-relative URL path of the file; the primary identity.
    pub filename: String,
    #[serde(default, deserialize_with = "lenient_id")]
    pub uid: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Subfolder relative to the videos/library root; empty for the root itself.
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Creation timestamp, epoch seconds.
    #[serde(default)]
    pub created: Option<f64>,
    #[serde(default)]
    pub download_date: Option<f64>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub download_id: Option<String>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub partial: bool,
    #[serde(default)]
    pub unknown: bool,
    #[serde(default, deserialize_with = "lenient_id")]
    pub stereo: Option<String>,
    /// Human readable duplicate hint, one candidate per line.
    #[serde(default)]
    pub may_exist: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub preview: Option<String>,
    #[serde(default)]
    pub mimetype: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Client-only: whether the preview clip is currently playing.
    #[serde(skip)]
    pub show_preview: bool,
}

impl FileEntry {
    /// Title if present, else the file name without directory and extension.
    pub fn display_title(&self) -> String {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => basename_stem(&self.filename).to_string(),
        }
    }
}

/// `"/videos/sub/clip.final.mp4"` -> `"clip.final"`. Names without a dot stay whole.
pub fn basename_stem(filename: &str) -> &str {
    let base = filename.rsplit('/').next().unwrap_or(filename);
    match base.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => base,
    }
}

/// Accepts a JSON string, number or bool and keeps it as a string.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

/// Accepts a number or a numeric string; anything else reads as absent.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Which list endpoint feeds the shared view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    #[default]
    Downloads,
    Library,
    Bookmarks,
    /// Previously streamed URLs tracked by the server; listed by `/api/onlines`.
    Online,
}

impl ViewKind {
    /// Path segment used by the browser routes (`""`, `"library"`, `"bookmarks"`, `"online"`).
    pub fn from_path(path: &str) -> Self {
        match path.trim_matches('/') {
            "library" => ViewKind::Library,
            "bookmarks" => ViewKind::Bookmarks,
            "online" => ViewKind::Online,
            _ => ViewKind::Downloads,
        }
    }

    pub fn list_path(self) -> Option<&'static str> {
        match self {
            ViewKind::Downloads => Some("/api/list"),
            ViewKind::Library => Some("/api/library/list"),
            ViewKind::Bookmarks | ViewKind::Online => None,
        }
    }

    pub fn is_library(self) -> bool {
        matches!(self, ViewKind::Library)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Bookmark {
    #[serde(default)]
    pub title: Option<String>,
    pub url: String,
}

/// A streamed URL remembered by the server.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct OnlineEntry {
    pub url: String,
    #[serde(default)]
    pub original_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Last time it was streamed, epoch seconds.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date: Option<f64>,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub stream_count: Option<u64>,
}

impl OnlineEntry {
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => "Online Video",
        }
    }
}

/// One hit of `/api/similar`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SimilarVideo {
    pub score: f64,
    #[serde(default)]
    pub file: Option<FileEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoPathRequest<'a> {
    pub video_path: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MoveFileRequest<'a> {
    pub video_path: &'a str,
    pub subfolder: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenameRequest<'a> {
    pub video_path: &'a str,
    #[serde(rename = "newName")]
    pub new_name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimilarRequest<'a> {
    pub video_path: &'a str,
    pub threshold: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoUrlRequest<'a> {
    #[serde(rename = "sourceUrl")]
    pub source_url: &'a str,
    pub url: &'a str,
}

/// What `/stream` hands back for playback.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub video_url: String,
    pub audio_url: Option<String>,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StreamResponse {
    #[serde(default, rename = "videoUrl")]
    pub video_url: Option<String>,
    #[serde(default, rename = "audioUrl")]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl StreamResponse {
    pub(crate) fn into_stream_info(self) -> Option<StreamInfo> {
        let video = self.video_url?;
        let video_url = video.trim_end_matches('/').to_string();
        if video_url.is_empty() {
            return None;
        }
        Some(StreamInfo {
            video_url,
            audio_url: self.audio_url,
            title: self
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Video Streaming...".to_string()),
        })
    }
}
