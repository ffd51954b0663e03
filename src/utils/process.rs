use crate::error::FetchError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::{path::PathBuf, process::Stdio, time::Duration};
use tracing::{debug, info, warn};

/// A fully-specified external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Shell-style rendering, for logs and `--dry-run`.
    pub fn display(&self) -> String {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .map(|part| shell_quote(&part))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
impl Invocation {
    /// Value following `flag`, if the flag is present.
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }
}

fn shell_quote(part: &str) -> String {
    let plain = !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,+@%".contains(c));
    if plain {
        part.to_string()
    } else {
        format!("'{}'", part.replace('\'', r"'\''"))
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion and return its exit code.
    async fn run(&self, invocation: &Invocation, timeout: Option<Duration>) -> Result<i32>;
}

/// Spawns real processes with the terminal inherited.
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation, timeout: Option<Duration>) -> Result<i32> {
        debug!("Running: {}", invocation.display());

        let mut child = tokio::process::Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn {}", invocation.program.display()))?;

        let status = match timeout {
            Some(limit) => {
                let waited = tokio::time::timeout(limit, child.wait()).await;
                match waited {
                    Ok(status) => status,
                    Err(_) => {
                        warn!(
                            "{} exceeded {}s, killing it",
                            invocation.program.display(),
                            limit.as_secs()
                        );
                        child
                            .kill()
                            .await
                            .context("Failed to kill timed out process")?;
                        return Err(FetchError::Timeout(limit.as_secs()).into());
                    }
                }
            }
            None => child.wait().await,
        }
        .with_context(|| format!("Failed to wait for {}", invocation.program.display()))?;

        // Killed by a signal: no code to mirror.
        let code = status.code().unwrap_or(1);
        if code != 0 {
            warn!("{} exited with code {}", invocation.program.display(), code);
        }
        Ok(code)
    }
}

/// Prints commands instead of running them.
pub struct DryRunRunner;

#[async_trait]
impl CommandRunner for DryRunRunner {
    async fn run(&self, invocation: &Invocation, _timeout: Option<Duration>) -> Result<i32> {
        info!("Dry run, not executing command");
        println!("{}", invocation.display());
        Ok(0)
    }
}
