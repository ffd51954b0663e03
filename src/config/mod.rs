use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

/// Defaults for flags left off the command line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Replaces the platform default download directory.
    pub default_path: Option<PathBuf>,
    pub output_format: Option<String>,
    pub max_workers: Option<u32>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub download: DownloadConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Loads the first config file found, or built-in defaults when there is none.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env_file = std::env::var_os("CONFIG_FILE").map(PathBuf::from);
        let xdg = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
        match find_config_path(explicit, env_file, xdg, dirs::home_dir()) {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Search order: explicit flag, `$CONFIG_FILE`, `$XDG_CONFIG_HOME/ytfetch`,
/// `~/.config/ytfetch`. The first two are returned even if missing so that a
/// typo surfaces as an error instead of silently using defaults.
pub fn find_config_path(
    explicit: Option<&Path>,
    env_file: Option<PathBuf>,
    xdg_config_home: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(path) = env_file {
        return Some(path);
    }

    let candidates = [
        xdg_config_home.map(|d| d.join("ytfetch").join("config.toml")),
        home.map(|h| h.join(".config").join("ytfetch").join("config.toml")),
    ];
    candidates.into_iter().flatten().find(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(config.download.default_path.is_none());
        assert!(config.download.timeout_secs.is_none());
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml(
            r#"
            [logging]
            format = "json"

            [download]
            default_path = "/media/me/sda2/youtube"
            output_format = "mp4"
            max_workers = 8
            timeout_secs = 3600
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(
            config.download.default_path,
            Some(PathBuf::from("/media/me/sda2/youtube"))
        );
        assert_eq!(config.download.output_format.as_deref(), Some("mp4"));
        assert_eq!(config.download.max_workers, Some(8));
        assert_eq!(config.download.timeout_secs, Some(3600));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(Config::from_toml("[logging]\nformat = \"xml\"").is_err());
        assert!(Config::from_toml("[download]\nmax_workers = \"many\"").is_err());
    }

    #[test]
    fn test_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[download]\nmax_workers = 3\n").unwrap();
        assert_eq!(Config::from_file(&path).unwrap().download.max_workers, Some(3));
        assert!(Config::from_file(&tmp.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_find_config_path_order() {
        let tmp = tempfile::tempdir().unwrap();
        let xdg = tmp.path().join("xdg");
        let home = tmp.path().join("home");
        let xdg_file = xdg.join("ytfetch").join("config.toml");
        let home_file = home.join(".config").join("ytfetch").join("config.toml");

        assert_eq!(
            find_config_path(None, None, Some(xdg.clone()), Some(home.clone())),
            None
        );

        std::fs::create_dir_all(home_file.parent().unwrap()).unwrap();
        std::fs::write(&home_file, "").unwrap();
        assert_eq!(
            find_config_path(None, None, Some(xdg.clone()), Some(home.clone())),
            Some(home_file.clone())
        );

        std::fs::create_dir_all(xdg_file.parent().unwrap()).unwrap();
        std::fs::write(&xdg_file, "").unwrap();
        assert_eq!(
            find_config_path(None, None, Some(xdg.clone()), Some(home.clone())),
            Some(xdg_file)
        );

        let env_file = PathBuf::from("/etc/ytfetch.toml");
        assert_eq!(
            find_config_path(None, Some(env_file.clone()), Some(xdg.clone()), None),
            Some(env_file)
        );

        let explicit = PathBuf::from("cli.toml");
        assert_eq!(
            find_config_path(Some(&explicit), None, Some(xdg), Some(home)),
            Some(explicit)
        );
    }
}
