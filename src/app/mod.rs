use crate::{
    cli::Args,
    config::Config,
    error::FetchError,
    media::{
        is_video_url, parse_video_url, DownloadRequest, Downloader, OutputFormat,
        YtDlpDownloader, DEFAULT_MAX_WORKERS,
    },
    platform::{ensure_dependencies, EnsureMode, PlatformProfile, ToolLocator, WhichLocator},
    utils::{
        ensure_dir, expand_home,
        process::{CommandRunner, DryRunRunner, SystemRunner},
    },
};
use anyhow::Result;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tracing::{debug, info, warn};
use url::Url;

pub async fn run(args: Args, config: Config) -> Result<i32> {
    let locator = WhichLocator;
    let profile = PlatformProfile::detect(&locator);
    let runner: Arc<dyn CommandRunner> = if args.dry_run {
        Arc::new(DryRunRunner)
    } else {
        Arc::new(SystemRunner)
    };

    run_with(&args, &config, &profile, &locator, runner).await
}

/// URL check, dependency check, directory setup, then a single download.
pub async fn run_with(
    args: &Args,
    config: &Config,
    profile: &PlatformProfile,
    locator: &dyn ToolLocator,
    runner: Arc<dyn CommandRunner>,
) -> Result<i32> {
    let url = resolve_url(args)?;

    let mode = if args.dry_run || args.skip_deps {
        EnsureMode::CheckOnly
    } else {
        EnsureMode::Install
    };
    let tools = ensure_dependencies(profile, locator, runner.as_ref(), mode).await?;

    let request = build_request(args, config, profile, url);
    if args.dry_run {
        debug!(
            "Dry run, not creating {}",
            request.download_path.display()
        );
    } else {
        ensure_dir(&request.download_path)?;
    }

    let timeout = resolve_timeout(args.timeout.or(config.download.timeout_secs));
    let downloader = YtDlpDownloader::new(tools, runner, timeout);
    let code = downloader.download(&request).await?;

    if code == 0 {
        info!("Download finished");
    } else {
        warn!("{} exited with code {}", downloader.name(), code);
    }
    Ok(code)
}

fn resolve_url(args: &Args) -> Result<Url, FetchError> {
    match (args.url.as_deref(), args.target.as_deref()) {
        (Some(_), Some(extra)) => Err(FetchError::Usage(format!(
            "unexpected argument '{extra}'"
        ))),
        (Some(url), None) => parse_video_url(url),
        (None, Some(target)) if is_video_url(target) => parse_video_url(target),
        (None, Some(target)) if target.starts_with("http://") || target.starts_with("https://") => {
            Err(FetchError::InvalidUrl(target.to_string()))
        }
        (None, Some(target)) => Err(FetchError::Usage(format!(
            "unexpected argument '{target}'"
        ))),
        (None, None) => Err(FetchError::MissingUrl),
    }
}

fn resolve_workers(requested: Option<u32>) -> u32 {
    match requested {
        Some(0) => {
            warn!(
                "max_workers must be at least 1, using {}",
                DEFAULT_MAX_WORKERS
            );
            DEFAULT_MAX_WORKERS
        }
        Some(n) => n,
        None => DEFAULT_MAX_WORKERS,
    }
}

fn resolve_timeout(requested: Option<u64>) -> Option<Duration> {
    match requested {
        Some(0) => {
            warn!("timeout must be at least 1s, running without a timeout");
            None
        }
        other => other.map(Duration::from_secs),
    }
}

fn resolve_download_path(
    requested: Option<&Path>,
    config: &Config,
    profile: &PlatformProfile,
) -> PathBuf {
    let fallback = config
        .download
        .default_path
        .as_deref()
        .map(expand_home)
        .unwrap_or_else(|| profile.default_download_dir().clone());

    let Some(requested) = requested else {
        return fallback;
    };
    if requested.as_os_str().is_empty() {
        warn!("Empty download path, using {}", fallback.display());
        return fallback;
    }

    let requested = expand_home(requested);
    if requested.exists() && !requested.is_dir() {
        warn!(
            "{} is not a directory, using {}",
            requested.display(),
            fallback.display()
        );
        return fallback;
    }
    requested
}

fn build_request(
    args: &Args,
    config: &Config,
    profile: &PlatformProfile,
    url: Url,
) -> DownloadRequest {
    let output_format = OutputFormat::resolve(
        args.output_format
            .as_deref()
            .or(config.download.output_format.as_deref()),
    );
    let concurrency = resolve_workers(args.max_workers.or(config.download.max_workers));
    let download_path = resolve_download_path(args.path.as_deref(), config, profile);

    DownloadRequest::new(
        url,
        output_format,
        download_path,
        args.is_id_needed.unwrap_or(true),
        concurrency,
    )
}
