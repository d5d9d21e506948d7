use anyhow::{bail, Result};
use async_trait::async_trait;
use log::debug;
use stakesign_defs::{GitObject, GitReference, RepositoryIndex, Resolution, ResolvedRevision};
use stakesign_utils::{run_command, CommandResult};
use std::path::PathBuf;

/// Repository index backed by the `git` executable, run inside `repo_dir`.
pub struct GitCli {
    repo_dir: PathBuf,
}

impl GitCli {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        GitCli {
            repo_dir: repo_dir.into(),
        }
    }

    async fn git(&self, args: &[&str]) -> Result<CommandResult> {
        debug!("git {}", args.join(" "));
        let mut exec = tokio::process::Command::new("git");
        exec.arg("-C").arg(&self.repo_dir).args(args);
        match run_command(&mut exec).await {
            Ok(result) => Ok(result),
            Err(e) => bail!("Failed to run git: {}", e),
        }
    }

    async fn object_type(&self, id: &str) -> Result<Option<String>> {
        let result = self.git(&["cat-file", "-t", id]).await?;
        Ok(result.success.then(|| result.stdout_text()))
    }

    async fn peel_to_commit(&self, id: &str) -> Result<Option<String>> {
        let result = self
            .git(&["rev-parse", "--verify", &format!("{}^{{commit}}", id)])
            .await?;
        Ok(result.success.then(|| result.stdout_text()))
    }

    async fn tag_name(&self, id: &str) -> Result<Option<String>> {
        let result = self.git(&["cat-file", "tag", id]).await?;
        if !result.success {
            return Ok(None);
        }
        Ok(result
            .stdout_text()
            .lines()
            .take_while(|line| !line.is_empty())
            .find_map(|line| line.strip_prefix("tag "))
            .map(str::to_string))
    }
}

fn is_ambiguous(stderr: &str) -> bool {
    stderr.contains("is ambiguous")
}

#[async_trait]
impl RepositoryIndex for GitCli {
    async fn resolve(&self, name: &str) -> Result<Resolution, anyhow::Error> {
        if name.is_empty() || name.starts_with('-') {
            return Ok(Resolution::Unresolved);
        }

        let parsed = self.git(&["rev-parse", "--verify", name]).await?;
        if is_ambiguous(&parsed.stderr) {
            return Ok(Resolution::Ambiguous);
        }
        if !parsed.success {
            return Ok(Resolution::Unresolved);
        }
        let id = parsed.stdout_text();

        let symbolic = self.git(&["rev-parse", "--symbolic-full-name", name]).await?;
        let reference = Some(symbolic.stdout_text())
            .filter(|full| symbolic.success && full.starts_with("refs/"))
            .map(GitReference::new);

        let kind = match self.object_type(&id).await? {
            Some(kind) => kind,
            None => return Ok(Resolution::Unresolved),
        };
        let object = match kind.as_str() {
            "commit" => GitObject::Commit { id },
            "tag" => {
                let target = self.peel_to_commit(&id).await?;
                let tag_name = self.tag_name(&id).await?;
                match (target, tag_name) {
                    (Some(target), Some(tag_name)) => GitObject::Tag {
                        id,
                        name: tag_name,
                        target,
                    },
                    // Exists, but never reaches a commit.
                    _ => GitObject::Other { id, kind },
                }
            }
            _ => GitObject::Other { id, kind },
        };
        Ok(Resolution::Resolved(ResolvedRevision { object, reference }))
    }

    async fn head(&self) -> Result<String, anyhow::Error> {
        let result = self.git(&["rev-parse", "--verify", "HEAD"]).await?;
        if !result.success {
            bail!("Failed to `git rev-parse HEAD`: {}", result.stderr.trim());
        }
        Ok(result.stdout_text())
    }

    async fn is_dirty(&self) -> Result<bool, anyhow::Error> {
        let result = self.git(&["status", "--porcelain"]).await?;
        if !result.success {
            bail!("Failed to `git status`: {}", result.stderr.trim());
        }
        Ok(!result.stdout_text().is_empty())
    }
}
