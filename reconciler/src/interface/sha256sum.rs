use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use stakesign_defs::{Config, ContentHasher};
use stakesign_utils::{find_executable, stream_command};
use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;

const UNAVAILABLE: &str =
    "`sha256sum` utility unavailable; ensure coreutils is installed and PATH is configured";

/// Content hasher delegating to a sha256sum-compatible executable.
pub struct Sha256sum {
    exe: Option<PathBuf>,
}

impl Sha256sum {
    pub fn new(exe: Option<PathBuf>) -> Self {
        Sha256sum { exe }
    }

    /// Uses the configured executable, else the first `sha256sum` on `PATH`.
    pub fn from_config(config: &Config) -> Self {
        let exe = config
            .sha256sum
            .clone()
            .or_else(|| find_executable("sha256sum"));
        if exe.is_none() {
            warn!("No sha256sum executable found");
        }
        Sha256sum::new(exe)
    }

    fn exe(&self) -> Result<&PathBuf> {
        match &self.exe {
            Some(exe) => Ok(exe),
            None => bail!(UNAVAILABLE),
        }
    }
}

#[async_trait]
impl ContentHasher for Sha256sum {
    fn describe(&self) -> String {
        match &self.exe {
            Some(exe) => exe.display().to_string(),
            None => "sha256sum (unavailable)".to_string(),
        }
    }

    async fn check(&self, manifest: &[u8], ignore_missing: bool) -> Result<bool, anyhow::Error> {
        let exe = self.exe()?;
        let mut file = tempfile::NamedTempFile::new().context("Failed to create temp file")?;
        file.write_all(manifest)?;
        file.flush()?;

        let mut exec = tokio::process::Command::new(exe);
        exec.arg("--check").arg("--strict");
        if ignore_missing {
            exec.arg("--ignore-missing");
        }
        exec.arg(file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        debug!("Running {:?}", exec);

        let status = exec
            .status()
            .await
            .with_context(|| format!("Failed to run {}", exe.display()))?;
        Ok(status.success())
    }

    async fn digest(&self, files: &[String]) -> Result<Vec<u8>, anyhow::Error> {
        let exe = self.exe()?;
        let mut exec = tokio::process::Command::new(exe);
        exec.arg("--").args(files);
        let result = stream_command(&mut exec)
            .await
            .with_context(|| format!("Failed to run {}", exe.display()))?;
        if !result.success {
            bail!("`sha256sum` utility failed: {}", result.stderr.trim());
        }
        Ok(result.stdout)
    }
}
