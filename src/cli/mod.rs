use clap::{CommandFactory, Parser};
use std::{ffi::OsString, path::PathBuf};

/// Multi-letter short flags clap cannot express, mapped to their long forms.
const LEGACY_SHORT_FLAGS: [(&str, &str); 3] = [
    ("-of", "--output_format"),
    ("-id", "--is_id_needed"),
    ("-mw", "--max_workers"),
];

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "ytfetch",
    author,
    version,
    about = "Download YouTube videos and playlists with yt-dlp",
    long_about = None,
    after_help = "Short forms: -of <FORMAT>, -id <0|1>, -mw <N>"
)]
pub struct Args {
    /// Target directory [default: platform download folder]
    #[arg(short = 'p', long = "path", visible_alias = "download_path", value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Video or playlist URL
    #[arg(short = 'u', long = "url", visible_alias = "youtube_url", value_name = "URL")]
    pub url: Option<String>,

    /// Container format: avi, flv, mkv, mov, mp4, webm [default: mkv]
    #[arg(long = "output_format", value_name = "FORMAT")]
    pub output_format: Option<String>,

    /// Append the video id to file names (1/0) [default: 1]
    #[arg(long = "is_id_needed", value_name = "0|1", value_parser = parse_toggle)]
    pub is_id_needed: Option<bool>,

    /// Downloader concurrency hint [default: 5]
    #[arg(long = "max_workers", value_name = "N")]
    pub max_workers: Option<u32>,

    /// Path to the config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the yt-dlp command instead of running it
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Only check for yt-dlp, ffmpeg and aria2c; never install them
    #[arg(long = "skip-deps")]
    pub skip_deps: bool,

    /// Kill the download after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Same as -u
    #[arg(value_name = "URL")]
    pub target: Option<String>,
}

impl Args {
    /// Parses process arguments, accepting the legacy `-of`/`-id`/`-mw` flags.
    pub fn try_parse_normalized<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_args(args))
    }
}

fn parse_toggle(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected 1 or 0, got '{other}'")),
    }
}

fn rewrite_legacy_flag(arg: &str) -> Option<String> {
    LEGACY_SHORT_FLAGS.iter().find_map(|(short, long)| {
        if arg == *short {
            return Some(long.to_string());
        }
        arg.strip_prefix(short)
            .and_then(|rest| rest.strip_prefix('='))
            .map(|value| format!("{long}={value}"))
    })
}

/// Rewrites legacy short flags up to a `--` terminator.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut terminated = false;
    args.into_iter()
        .map(|arg| {
            let arg: OsString = arg.into();
            if terminated {
                return arg;
            }
            if arg == "--" {
                terminated = true;
                return arg;
            }
            match arg.to_str().and_then(rewrite_legacy_flag) {
                Some(long) => OsString::from(long),
                None => arg,
            }
        })
        .collect()
}

pub fn usage() -> String {
    Args::command().render_usage().to_string()
}
