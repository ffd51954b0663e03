use super::{downloader::Downloader, types::DownloadRequest};
use crate::{
    platform::ResolvedTools,
    utils::process::{CommandRunner, Invocation},
};
use anyhow::Result;
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

// aria2c refuses more than 16 connections per server
const ARIA2C_MAX_CONNECTIONS: u32 = 16;

pub struct YtDlpDownloader {
    tools: ResolvedTools,
    runner: Arc<dyn CommandRunner>,
    timeout: Option<Duration>,
}

impl YtDlpDownloader {
    pub fn new(
        tools: ResolvedTools,
        runner: Arc<dyn CommandRunner>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            tools,
            runner,
            timeout,
        }
    }

    /// Output template relative to the download directory.
    pub fn output_template(request: &DownloadRequest) -> String {
        let ext = request.output_format.as_str();
        let item = if request.is_id_needed {
            "%(title)s-%(id)s"
        } else {
            "%(title)s"
        };

        if request.is_playlist {
            format!("playlists/%(playlist_title)s[_id_]%(playlist_id)s/%(playlist_index)s-{item}.{ext}")
        } else {
            format!("individual_downloads/{item}.{ext}")
        }
    }

    pub fn build_invocation(&self, request: &DownloadRequest) -> Invocation {
        let format = request.output_format;
        let workers = request.concurrency.max(1);

        let mut invocation = Invocation::new(self.tools.ytdlp.clone())
            .args(["--format", "bestvideo*+bestaudio/best"])
            .args(["--merge-output-format", format.as_str()])
            .arg("--paths")
            .arg(request.download_path.to_string_lossy())
            .arg("--output")
            .arg(Self::output_template(request));

        if format.embeds_thumbnail() {
            invocation = invocation.arg("--embed-thumbnail");
        }
        if format.embeds_metadata() {
            invocation = invocation.arg("--embed-metadata");
        }
        if format.embeds_chapters() {
            invocation = invocation.arg("--embed-chapters");
        }

        if let Some(ffmpeg) = &self.tools.ffmpeg {
            invocation = invocation
                .arg("--ffmpeg-location")
                .arg(ffmpeg.to_string_lossy());
        }

        invocation = invocation
            .arg("--concurrent-fragments")
            .arg(workers.to_string());

        if let Some(aria2c) = &self.tools.aria2c {
            let connections = workers.min(ARIA2C_MAX_CONNECTIONS);
            invocation = invocation
                .arg("--downloader")
                .arg(aria2c.to_string_lossy())
                .arg("--downloader-args")
                .arg(format!(
                    "aria2c:--max-connection-per-server={connections} --split={workers} --max-concurrent-downloads={workers} --min-split-size=1M"
                ));
        }

        invocation
            .arg(if request.is_playlist {
                "--yes-playlist"
            } else {
                "--no-playlist"
            })
            .arg(request.url.as_str())
    }
}

#[async_trait]
impl Downloader for YtDlpDownloader {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn download(&self, request: &DownloadRequest) -> Result<i32> {
        let kind = if request.is_playlist {
            "playlist"
        } else {
            "video"
        };
        info!(
            "Downloading {} {} as {} into {}",
            kind,
            request.url,
            request.output_format,
            request.download_path.display()
        );

        let invocation = self.build_invocation(request);
        debug!("yt-dlp command: {}", invocation.display());

        self.runner.run(&invocation, self.timeout).await
    }
}
