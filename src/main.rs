use clap::error::ErrorKind;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

mod app;
mod cli;
mod config;
mod error;
mod media;
mod platform;
mod utils;

use cli::Args;
use config::{Config, LogFormat};
use error::FetchError;

fn init_logging(format: LogFormat) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    // stdout belongs to yt-dlp
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map(ExitCode::from).unwrap_or(ExitCode::FAILURE)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match Args::try_parse_normalized(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => {
            // clap renders usage itself; only the exit code differs from its default
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(config.logging.format);
    info!("Starting ytfetch {}", env!("CARGO_PKG_VERSION"));

    match app::run(args, config).await {
        Ok(code) => exit_code(code),
        Err(e) => {
            error!("{:#}", e);
            if e.downcast_ref::<FetchError>().is_some_and(FetchError::shows_usage) {
                eprintln!("\n{}", cli::usage());
                eprintln!("For more information, try '--help'.");
            }
            ExitCode::FAILURE
        }
    }
}
