// Data models for yt-dlp metadata and download results

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use super::humanize::{format_duration, format_file_size};

/// yt-dlp `live_status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LiveStatus {
    NotLive,
    IsLive,
    IsUpcoming,
    WasLive,
    PostLive,
    Other(String),
}

impl LiveStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::NotLive => "not_live",
            Self::IsLive => "is_live",
            Self::IsUpcoming => "is_upcoming",
            Self::WasLive => "was_live",
            Self::PostLive => "post_live",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for LiveStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "not_live" => Self::NotLive,
            "is_live" => Self::IsLive,
            "is_upcoming" => Self::IsUpcoming,
            "was_live" => Self::WasLive,
            "post_live" => Self::PostLive,
            _ => Self::Other(s),
        }
    }
}

impl From<LiveStatus> for String {
    fn from(status: LiveStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for LiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One downloadable stream combination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingDescriptor {
    pub format_id: String,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub format_note: Option<String>,
}

impl EncodingDescriptor {
    pub const SEPARATOR: char = '#';

    fn has_video(&self) -> bool {
        self.vcodec.as_deref() != Some("none")
    }

    fn has_audio(&self) -> bool {
        self.acodec.as_deref() != Some("none")
    }

    fn is_storyboard(&self) -> bool {
        self.ext.as_deref() == Some("mhtml")
            || self
                .format_note
                .as_deref()
                .map_or(false, |note| note.contains("storyboard"))
    }

    /// `<download-format>#<recode-target>`.
    /// Video-only streams request the best audio track alongside.
    pub fn value(&self) -> String {
        match &self.ext {
            Some(ext) if !self.format_id.contains(Self::SEPARATOR) => {
                let audio = if self.has_audio() { "" } else { "+bestaudio" };
                format!("{}{}{}{}", self.format_id, audio, Self::SEPARATOR, ext)
            }
            _ => self.format_id.clone(),
        }
    }
}

/// Descriptors grouped by category, best first within each category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormatCatalog {
    categories: BTreeMap<String, Vec<EncodingDescriptor>>,
}

impl FormatCatalog {
    pub const VIDEO: &'static str = "Video";
    pub const AUDIO_ONLY: &'static str = "Audio Only";

    pub fn from_groups(categories: BTreeMap<String, Vec<EncodingDescriptor>>) -> Self {
        Self { categories }
    }

    /// Group yt-dlp's flat `formats` array. yt-dlp lists worst first, so the
    /// order is reversed to put the best entry at the head of each category.
    pub fn from_flat(formats: Vec<EncodingDescriptor>) -> Self {
        let mut video = Vec::new();
        let mut audio_only = Vec::new();

        for format in formats.into_iter().rev() {
            if format.is_storyboard() {
                continue;
            }
            if format.has_video() {
                video.push(format);
            } else if format.has_audio() {
                audio_only.push(format);
            }
        }

        let mut categories = BTreeMap::new();
        categories.insert(Self::VIDEO.to_string(), video);
        categories.insert(Self::AUDIO_ONLY.to_string(), audio_only);
        Self { categories }
    }

    pub fn category(&self, name: &str) -> &[EncodingDescriptor] {
        self.categories.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.categories.values().all(Vec::is_empty)
    }
}

impl<'de> Deserialize<'de> for FormatCatalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawFormats {
            Grouped(BTreeMap<String, Vec<EncodingDescriptor>>),
            Flat(Vec<EncodingDescriptor>),
        }

        Ok(match Option::<RawFormats>::deserialize(deserializer)? {
            Some(RawFormats::Grouped(groups)) => Self::from_groups(groups),
            Some(RawFormats::Flat(list)) => Self::from_flat(list),
            None => Self::default(),
        })
    }
}

/// Parsed `--dump-json` output. `title` is the only required field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawVideo")]
pub struct VideoMetadata {
    pub title: String,
    /// Whole seconds
    pub duration: u64,
    pub live_status: Option<LiveStatus>,
    /// Exact size when known, otherwise yt-dlp's estimate
    pub filesize: Option<u64>,
    pub thumbnail: Option<String>,
    pub formats: FormatCatalog,
}

impl VideoMetadata {
    /// Anything with a live status other than `not_live` cannot be downloaded
    pub fn is_live(&self) -> bool {
        matches!(&self.live_status, Some(status) if *status != LiveStatus::NotLive)
    }
}

#[derive(Deserialize)]
struct RawVideo {
    title: String,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    live_status: Option<LiveStatus>,
    #[serde(default)]
    filesize: Option<f64>,
    #[serde(default)]
    filesize_approx: Option<f64>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    formats: FormatCatalog,
}

impl From<RawVideo> for VideoMetadata {
    fn from(raw: RawVideo) -> Self {
        let positive = |v: Option<f64>| v.filter(|n| *n > 0.0);
        Self {
            title: raw.title,
            duration: raw.duration.map_or(0, |d| d.max(0.0).floor() as u64),
            live_status: raw.live_status,
            filesize: positive(raw.filesize)
                .or_else(|| positive(raw.filesize_approx))
                .map(|n| n as u64),
            thumbnail: raw.thumbnail.filter(|t| !t.is_empty()),
            formats: raw.formats,
        }
    }
}

/// What the details view shows after the display query
#[derive(Debug, Clone, Serialize)]
pub struct VideoDetails {
    pub title: String,
    pub duration: String,
    pub file_size: String,
    pub thumbnail: String,
    #[serde(skip)]
    pub metadata: VideoMetadata,
}

impl From<VideoMetadata> for VideoDetails {
    fn from(metadata: VideoMetadata) -> Self {
        Self {
            title: metadata.title.clone(),
            duration: format_duration(metadata.duration),
            file_size: format_file_size(metadata.filesize),
            thumbnail: metadata
                .thumbnail
                .clone()
                .unwrap_or_else(|| "No thumbnail available".to_string()),
            metadata,
        }
    }
}

/// A finished, verified download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadResult {
    pub downloaded_path: PathBuf,
    pub file_name: String,
    pub title: String,
    /// Raw seconds, not the formatted string
    pub duration: u64,
}
