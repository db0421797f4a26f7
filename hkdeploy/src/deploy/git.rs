//! Git collaborator: remote setup and branch push

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::HelperError;

/// Version-control operations the deploy sequence depends on
#[async_trait]
pub trait GitRemote: Send + Sync {
    /// Point a named remote at `url`, replacing any stale registration
    /// under the same name. Idempotent.
    async fn prepare_remote(&self, remote: &str, url: &str) -> Result<(), HelperError>;

    /// Push a local ref to the remote's master line
    async fn push(&self, remote: &str, branch: &str) -> Result<(), HelperError>;
}

/// `GitRemote` backed by the git CLI in a local working copy
pub struct GitCli {
    work_dir: PathBuf,
}

impl GitCli {
    pub fn new(work_dir: impl AsRef<Path>) -> Self {
        Self {
            work_dir: work_dir.as_ref().to_path_buf(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<(), HelperError> {
        debug!("git {}", args.join(" "));
        let status = Command::new("git")
            .current_dir(&self.work_dir)
            .args(args)
            .status()
            .await
            .map_err(|e| HelperError::GitError(format!("Failed to run git: {}", e)))?;

        if !status.success() {
            return Err(HelperError::GitError(format!(
                "git {} failed",
                args.join(" ")
            )));
        }
        Ok(())
    }

    async fn list_remotes(&self) -> Result<Vec<String>, HelperError> {
        let output = Command::new("git")
            .current_dir(&self.work_dir)
            .arg("remote")
            .output()
            .await
            .map_err(|e| HelperError::GitError(format!("Failed to run git: {}", e)))?;

        if !output.status.success() {
            return Err(HelperError::GitError(
                "git remote listing failed".to_string(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|line| line.trim().to_string())
            .collect())
    }
}

#[async_trait]
impl GitRemote for GitCli {
    async fn prepare_remote(&self, remote: &str, url: &str) -> Result<(), HelperError> {
        let remotes = self.list_remotes().await?;
        if remotes.iter().any(|name| name == remote) {
            info!("Resetting remote: {}", remote);
            self.run(&["remote", "remove", remote]).await?;
        }

        // -f fetches immediately, -t tracks only the master line
        self.run(&["remote", "add", "-t", "master", "-f", remote, url])
            .await
    }

    async fn push(&self, remote: &str, branch: &str) -> Result<(), HelperError> {
        info!("Pushing {} to {}/master", branch, remote);
        let refspec = format!("{}:master", branch);
        self.run(&["push", remote, &refspec]).await
    }
}
