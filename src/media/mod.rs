mod downloader;
mod types;
mod ytdlp;

pub use downloader::Downloader;
pub use types::{
    is_video_url, parse_video_url, DownloadRequest, OutputFormat, DEFAULT_MAX_WORKERS,
};
pub use ytdlp::YtDlpDownloader;
