//! Git publisher. Stages, commits and pushes the rewritten documents.
//!
//! Shells out to `git` in an existing working copy; clone/checkout is the job
//! runner's responsibility. The access token is only ever placed in the push
//! URL and is redacted from every error message.

use crate::domain::DomainError;
use crate::ports::Publisher;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Everything the publisher needs to know about the working copy.
#[derive(Debug, Clone)]
pub struct GitSettings {
    pub repo_dir: PathBuf,
    pub remote: String,
    /// Branch to push; `None` pushes the currently checked-out branch.
    pub branch: Option<String>,
    pub author_name: String,
    pub author_email: String,
    pub token: Option<String>,
}

pub struct GitPublisher {
    settings: GitSettings,
}

impl GitPublisher {
    pub fn new(settings: GitSettings) -> Self {
        Self { settings }
    }

    async fn git(&self, args: &[&str]) -> Result<Output, DomainError> {
        debug!(args = ?args, "git");
        Command::new("git")
            .arg("-C")
            .arg(&self.settings.repo_dir)
            .args(args)
            .output()
            .await
            .map_err(|e| DomainError::Publish(format!("cannot run git: {}", e)))
    }

    /// Run git and require success; returns trimmed stdout.
    async fn git_ok(&self, args: &[&str]) -> Result<String, DomainError> {
        let out = self.git(args).await?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(DomainError::Publish(self.redact(&format!(
                "git {} failed: {}",
                args.first().copied().unwrap_or_default(),
                stderr.trim()
            ))));
        }
        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    }

    fn redact(&self, text: &str) -> String {
        redact_token(text, self.settings.token.as_deref())
    }

    /// Paths handed to us are built from `repo_dir`; git wants them repo-relative.
    fn repo_relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.settings.repo_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }

    async fn branch(&self) -> Result<String, DomainError> {
        match &self.settings.branch {
            Some(b) => Ok(b.clone()),
            None => self.git_ok(&["rev-parse", "--abbrev-ref", "HEAD"]).await,
        }
    }

    /// Push target: the remote name, or its HTTPS URL with the token embedded.
    async fn push_target(&self) -> Result<String, DomainError> {
        let Some(token) = &self.settings.token else {
            return Ok(self.settings.remote.clone());
        };
        let url = self
            .git_ok(&["remote", "get-url", &self.settings.remote])
            .await?;
        match authenticated_url(&url, token) {
            Some(authed) => Ok(authed),
            None => {
                warn!(remote = %self.settings.remote, "remote is not HTTPS; pushing without token");
                Ok(self.settings.remote.clone())
            }
        }
    }
}

#[async_trait::async_trait]
impl Publisher for GitPublisher {
    async fn has_pending(&self, path: &Path) -> Result<bool, DomainError> {
        let rel = self.repo_relative(path);
        let status = self.git_ok(&["status", "--porcelain", "--", &rel]).await?;
        if !status.is_empty() {
            return Ok(true);
        }

        let branch = self.branch().await?;
        let range = format!("{}/{}..HEAD", self.settings.remote, branch);
        let out = self.git(&["log", "--oneline", &range, "--", &rel]).await?;
        if !out.status.success() {
            // No remote-tracking ref yet: nothing we can compare against.
            debug!(range = %range, "no upstream to compare with");
            return Ok(false);
        }
        Ok(!String::from_utf8_lossy(&out.stdout).trim().is_empty())
    }

    async fn publish(&self, paths: &[PathBuf], message: &str) -> Result<(), DomainError> {
        let rel: Vec<String> = paths.iter().map(|p| self.repo_relative(p)).collect();
        let rel_refs: Vec<&str> = rel.iter().map(String::as_str).collect();

        let mut add = vec!["add", "--"];
        add.extend_from_slice(&rel_refs);
        self.git_ok(&add).await?;

        let mut diff = vec!["diff", "--cached", "--quiet", "--"];
        diff.extend_from_slice(&rel_refs);
        let staged = self.git(&diff).await?;
        match staged.status.code() {
            Some(0) => info!("nothing staged; pushing existing commits"),
            Some(1) => {
                let name = format!("user.name={}", self.settings.author_name);
                let email = format!("user.email={}", self.settings.author_email);
                let mut commit = vec![
                    "-c",
                    name.as_str(),
                    "-c",
                    email.as_str(),
                    "commit",
                    "-m",
                    message,
                    "--",
                ];
                commit.extend_from_slice(&rel_refs);
                self.git_ok(&commit).await?;
                info!(files = ?rel, "committed");
            }
            _ => {
                return Err(DomainError::Publish(self.redact(&format!(
                    "git diff failed: {}",
                    String::from_utf8_lossy(&staged.stderr).trim()
                ))));
            }
        }

        let branch = self.branch().await?;
        let target = self.push_target().await?;
        let refspec = format!("HEAD:refs/heads/{}", branch);
        self.git_ok(&["push", &target, &refspec]).await?;

        if target != self.settings.remote {
            // Pushing to a URL does not move the tracking ref; keep has_pending honest.
            let tracking = format!("refs/remotes/{}/{}", self.settings.remote, branch);
            self.git_ok(&["update-ref", &tracking, "HEAD"]).await?;
        }

        info!(remote = %self.settings.remote, branch = %branch, "pushed");
        Ok(())
    }
}

/// Embed `token` into an HTTPS remote URL. Returns `None` for other schemes.
fn authenticated_url(remote_url: &str, token: &str) -> Option<String> {
    let mut url = url::Url::parse(remote_url).ok()?;
    if url.scheme() != "https" {
        return None;
    }
    url.set_username("x-access-token").ok()?;
    url.set_password(Some(token)).ok()?;
    Some(url.to_string())
}

fn redact_token(text: &str, token: Option<&str>) -> String {
    match token {
        Some(t) if !t.is_empty() => text.replace(t, "***"),
        _ => text.to_string(),
    }
}
