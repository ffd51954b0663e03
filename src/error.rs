use std::path::PathBuf;

/// Fatal conditions that end a run with exit code 1.
///
/// Anything else bubbling up as an `anyhow::Error` is treated the same way,
/// but only these variants decide whether the usage line gets printed.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("no URL given; pass one with --url or as a positional argument")]
    MissingUrl,

    #[error("not a recognised video URL: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Usage(String),

    #[error("could not create download directory {}: {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to install required tool `{tool}`: {reason}")]
    ToolInstall { tool: String, reason: String },

    #[error("required tool `{tool}` is not available ({hint})")]
    ToolMissing { tool: String, hint: String },

    #[error("download timed out after {0}s")]
    Timeout(u64),
}

impl FetchError {
    pub fn shows_usage(&self) -> bool {
        matches!(
            self,
            FetchError::MissingUrl | FetchError::InvalidUrl(_) | FetchError::Usage(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_show_usage() {
        assert!(FetchError::MissingUrl.shows_usage());
        assert!(FetchError::InvalidUrl("x".into()).shows_usage());
        assert!(FetchError::Usage("unexpected argument".into()).shows_usage());
        assert!(!FetchError::Timeout(5).shows_usage());
        assert!(!FetchError::ToolInstall {
            tool: "ffmpeg".into(),
            reason: "exit code 100".into(),
        }
        .shows_usage());
    }

    #[test]
    fn test_messages_name_the_tool() {
        let err = FetchError::ToolMissing {
            tool: "yt-dlp".into(),
            hint: "no package manager on this platform".into(),
        };
        assert!(err.to_string().contains("`yt-dlp`"));
    }
}
