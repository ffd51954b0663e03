use super::{OsKind, PlatformProfile};
use crate::{
    error::FetchError,
    utils::process::{CommandRunner, Invocation},
};
use anyhow::Result;
use std::{collections::HashMap, path::PathBuf};
use tracing::{debug, info, warn};

pub trait ToolLocator: Send + Sync {
    /// Absolute path of `binary` if it is on the execution path.
    fn locate(&self, binary: &str) -> Option<PathBuf>;
}

pub struct WhichLocator;

impl ToolLocator for WhichLocator {
    fn locate(&self, binary: &str) -> Option<PathBuf> {
        which::which(binary).ok()
    }
}

struct Dependency {
    binary: &'static str,
    required: bool,
}

// python3 comes first: Termux installs yt-dlp through pip.
const DEPENDENCIES: [Dependency; 4] = [
    Dependency {
        binary: "python3",
        required: true,
    },
    Dependency {
        binary: "yt-dlp",
        required: true,
    },
    Dependency {
        binary: "ffmpeg",
        required: true,
    },
    Dependency {
        binary: "aria2c",
        required: false,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureMode {
    /// Install anything missing; a missing required tool is fatal.
    Install,
    /// Only report what is missing.
    CheckOnly,
}

/// Paths of the tools the download invoker hands to yt-dlp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTools {
    pub ytdlp: PathBuf,
    pub ffmpeg: Option<PathBuf>,
    pub aria2c: Option<PathBuf>,
}

fn package_name(os_kind: OsKind, binary: &str) -> &'static str {
    match (os_kind, binary) {
        (OsKind::Android | OsKind::MacOs, "python3") => "python",
        (_, "python3") => "python3",
        (_, "aria2c") => "aria2",
        (_, "ffmpeg") => "ffmpeg",
        _ => "yt-dlp",
    }
}

fn install_invocation(
    profile: &PlatformProfile,
    binary: &str,
    python: Option<&PathBuf>,
) -> Option<Invocation> {
    // The Termux repository lags behind, pip tracks yt-dlp releases.
    if profile.os_kind == OsKind::Android && binary == "yt-dlp" {
        let python = python.cloned().unwrap_or_else(|| PathBuf::from("python3"));
        return Some(Invocation::new(python).args(["-m", "pip", "install", "-U", "yt-dlp"]));
    }
    profile.install_invocation(package_name(profile.os_kind, binary))
}

async fn install(
    profile: &PlatformProfile,
    locator: &dyn ToolLocator,
    runner: &dyn CommandRunner,
    binary: &str,
    python: Option<&PathBuf>,
) -> Result<PathBuf, FetchError> {
    let invocation =
        install_invocation(profile, binary, python).ok_or_else(|| FetchError::ToolMissing {
            tool: binary.to_string(),
            hint: format!(
                "no package manager known for platform '{}', install it manually",
                profile.os_kind
            ),
        })?;

    info!("Installing {} with `{}`", binary, invocation.display());
    let code = runner
        .run(&invocation, None)
        .await
        .map_err(|e| FetchError::ToolInstall {
            tool: binary.to_string(),
            reason: format!("{e:#}"),
        })?;
    if code != 0 {
        return Err(FetchError::ToolInstall {
            tool: binary.to_string(),
            reason: format!("installer exited with code {code}"),
        });
    }

    locator.locate(binary).ok_or_else(|| FetchError::ToolMissing {
        tool: binary.to_string(),
        hint: "still not on PATH after installing".to_string(),
    })
}

/// Makes sure yt-dlp and its helpers are present, installing what is missing.
///
/// Tools already on the path are never reinstalled. A required tool that
/// cannot be installed aborts with [`FetchError::ToolInstall`] or
/// [`FetchError::ToolMissing`]; an optional one only logs a warning.
pub async fn ensure_dependencies(
    profile: &PlatformProfile,
    locator: &dyn ToolLocator,
    runner: &dyn CommandRunner,
    mode: EnsureMode,
) -> Result<ResolvedTools> {
    let mut found: HashMap<&'static str, PathBuf> = HashMap::new();

    for dep in &DEPENDENCIES {
        if let Some(path) = locator.locate(dep.binary) {
            debug!("{} found at {}", dep.binary, path.display());
            found.insert(dep.binary, path);
            continue;
        }

        if mode == EnsureMode::CheckOnly {
            warn!("{} not found on PATH", dep.binary);
            continue;
        }

        let outcome = install(profile, locator, runner, dep.binary, found.get("python3")).await;
        match outcome {
            Ok(path) => {
                info!("{} installed at {}", dep.binary, path.display());
                found.insert(dep.binary, path);
            }
            Err(e) if dep.required => return Err(e.into()),
            Err(e) => warn!("Optional tool unavailable, continuing without it: {}", e),
        }
    }

    Ok(ResolvedTools {
        ytdlp: found
            .remove("yt-dlp")
            .unwrap_or_else(|| PathBuf::from("yt-dlp")),
        ffmpeg: found.remove("ffmpeg"),
        aria2c: found.remove("aria2c"),
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::{collections::HashSet, sync::Mutex};

    /// PATH stand-in backed by a set of binary names.
    pub struct FakeLocator {
        pub present: Mutex<HashSet<String>>,
    }

    impl FakeLocator {
        pub fn with(binaries: &[&str]) -> Self {
            Self {
                present: Mutex::new(binaries.iter().map(|b| b.to_string()).collect()),
            }
        }

        pub fn all() -> Self {
            Self::with(&["python3", "yt-dlp", "ffmpeg", "aria2c"])
        }

        pub fn add(&self, binary: &str) {
            self.present.lock().unwrap().insert(binary.to_string());
        }
    }

    impl ToolLocator for FakeLocator {
        fn locate(&self, binary: &str) -> Option<PathBuf> {
            self.present
                .lock()
                .unwrap()
                .contains(binary)
                .then(|| PathBuf::from("/usr/bin").join(binary))
        }
    }
}
