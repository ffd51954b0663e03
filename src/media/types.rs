use crate::error::FetchError;
use std::{fmt, path::PathBuf, str::FromStr};
use tracing::warn;
use url::Url;

pub const DEFAULT_MAX_WORKERS: u32 = 5;

const VIDEO_HOSTS: [&str; 6] = [
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtube-nocookie.com",
    "youtu.be",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Avi,
    Flv,
    #[default]
    Mkv,
    Mov,
    Mp4,
    Webm,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Avi => "avi",
            OutputFormat::Flv => "flv",
            OutputFormat::Mkv => "mkv",
            OutputFormat::Mov => "mov",
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Webm => "webm",
        }
    }

    /// Unknown or missing values fall back to mkv.
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw {
            None => Self::default(),
            Some(value) => value.parse().unwrap_or_else(|_| {
                warn!(
                    "Unsupported output format '{}', falling back to {}",
                    value,
                    Self::default()
                );
                Self::default()
            }),
        }
    }

    pub fn embeds_thumbnail(&self) -> bool {
        matches!(self, OutputFormat::Mkv | OutputFormat::Mp4 | OutputFormat::Mov)
    }

    pub fn embeds_metadata(&self) -> bool {
        !matches!(self, OutputFormat::Avi)
    }

    pub fn embeds_chapters(&self) -> bool {
        matches!(
            self,
            OutputFormat::Mkv | OutputFormat::Mp4 | OutputFormat::Mov | OutputFormat::Webm
        )
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "avi" => Ok(OutputFormat::Avi),
            "flv" => Ok(OutputFormat::Flv),
            "mkv" => Ok(OutputFormat::Mkv),
            "mov" => Ok(OutputFormat::Mov),
            "mp4" => Ok(OutputFormat::Mp4),
            "webm" => Ok(OutputFormat::Webm),
            other => Err(format!("unsupported output format: {other}")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses `raw` and checks it points at a known video host.
pub fn parse_video_url(raw: &str) -> Result<Url, FetchError> {
    let invalid = || FetchError::InvalidUrl(raw.to_string());
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    let host = url.host_str().ok_or_else(invalid)?.to_ascii_lowercase();
    if VIDEO_HOSTS.contains(&host.as_str()) {
        Ok(url)
    } else {
        Err(invalid())
    }
}

pub fn is_video_url(raw: &str) -> bool {
    parse_video_url(raw).is_ok()
}

/// A URL carrying a non-empty `list` query parameter targets a playlist.
pub fn is_playlist_url(url: &Url) -> bool {
    url.query_pairs()
        .any(|(key, value)| key == "list" && !value.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: Url,
    pub output_format: OutputFormat,
    pub download_path: PathBuf,
    pub is_playlist: bool,
    pub is_id_needed: bool,
    pub concurrency: u32,
}

impl DownloadRequest {
    pub fn new(
        url: Url,
        output_format: OutputFormat,
        download_path: PathBuf,
        is_id_needed: bool,
        concurrency: u32,
    ) -> Self {
        let is_playlist = is_playlist_url(&url);
        Self {
            url,
            output_format,
            download_path,
            is_playlist,
            is_id_needed,
            concurrency,
        }
    }
}
