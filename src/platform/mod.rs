mod deps;

pub use deps::{ensure_dependencies, EnsureMode, ResolvedTools, ToolLocator, WhichLocator};

#[cfg(test)]
pub(crate) use deps::testing;

use crate::utils::process::Invocation;
use std::{ffi::OsString, fmt, path::PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsKind {
    Android,
    Linux,
    MacOs,
    Unsupported,
}

impl OsKind {
    /// Maps a kernel/platform identifier (`uname -s`, `uname -o`,
    /// `std::env::consts::OS`) to a platform. Never fails.
    pub fn from_identifier(identifier: &str) -> Self {
        match identifier.trim().to_ascii_lowercase().as_str() {
            "android" | "termux" => OsKind::Android,
            "darwin" | "macos" | "osx" => OsKind::MacOs,
            "linux" | "gnu/linux" => OsKind::Linux,
            _ => OsKind::Unsupported,
        }
    }
}

impl fmt::Display for OsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OsKind::Android => "android",
            OsKind::Linux => "linux",
            OsKind::MacOs => "macos",
            OsKind::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// Identifier of the running host. Termux reports a Linux kernel, so its
/// environment markers are checked first.
pub fn host_identifier() -> String {
    host_identifier_from(
        std::env::var_os("TERMUX_VERSION"),
        std::env::var("PREFIX").ok(),
        std::env::consts::OS,
    )
}

pub fn host_identifier_from(
    termux_version: Option<OsString>,
    prefix: Option<String>,
    os: &str,
) -> String {
    let termux_prefix = prefix.is_some_and(|p| p.contains("com.termux"));
    if termux_version.is_some() || termux_prefix {
        return "android".to_string();
    }
    os.to_string()
}

/// Everything that differs between hosts, resolved once at start-up.
#[derive(Debug, Clone)]
pub struct PlatformProfile {
    pub os_kind: OsKind,
    use_sudo: bool,
    default_download_dir: PathBuf,
}

impl PlatformProfile {
    pub fn new(os_kind: OsKind, use_sudo: bool, default_download_dir: PathBuf) -> Self {
        Self {
            os_kind,
            use_sudo: use_sudo && os_kind == OsKind::Linux,
            default_download_dir,
        }
    }

    pub fn detect(locator: &dyn ToolLocator) -> Self {
        let identifier = host_identifier();
        let os_kind = OsKind::from_identifier(&identifier);
        match os_kind {
            OsKind::Unsupported => warn!(
                "Unsupported platform '{}', continuing with best-effort defaults",
                identifier
            ),
            _ => info!("Detected platform: {}", os_kind),
        }

        let use_sudo = locator.locate("sudo").is_some();
        let default_dir =
            default_download_dir_for(os_kind, dirs::home_dir(), dirs::download_dir());
        Self::new(os_kind, use_sudo, default_dir)
    }

    pub fn default_download_dir(&self) -> &PathBuf {
        &self.default_download_dir
    }

    /// Package manager prefix, or `None` where nothing can be installed.
    pub fn package_manager_command(&self) -> Option<Vec<&'static str>> {
        let mut command = match self.os_kind {
            OsKind::Android => vec!["pkg", "install", "-y"],
            OsKind::Linux => vec!["apt-get", "install", "-y"],
            OsKind::MacOs => vec!["brew", "install"],
            OsKind::Unsupported => return None,
        };
        if self.use_sudo {
            command.insert(0, "sudo");
        }
        Some(command)
    }

    /// Installs a package through the platform package manager.
    pub fn install_invocation(&self, package: &str) -> Option<Invocation> {
        let command = self.package_manager_command()?;
        let (program, rest) = command.split_first()?;
        Some(Invocation::new(*program).args(rest.iter().copied()).arg(package))
    }
}

pub fn default_download_dir_for(
    os_kind: OsKind,
    home: Option<PathBuf>,
    downloads: Option<PathBuf>,
) -> PathBuf {
    match os_kind {
        // termux-setup-storage links shared storage here
        OsKind::Android => home
            .map(|h| h.join("storage").join("downloads").join("youtube"))
            .unwrap_or_else(|| PathBuf::from("/sdcard/Download/youtube")),
        OsKind::Linux | OsKind::MacOs => downloads
            .or_else(|| home.map(|h| h.join("Downloads")))
            .map(|d| d.join("youtube"))
            .unwrap_or_else(|| PathBuf::from("downloads")),
        OsKind::Unsupported => PathBuf::from("downloads"),
    }
}
