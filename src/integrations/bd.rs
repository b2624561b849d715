//! Client for the `bd` (beads) command-line tool.
//!
//! Every call spawns `bd ... --json` in the project directory and parses
//! stdout. Calls are bounded by a timeout and never retried; the caller
//! decides what a failure means (a failed refresh keeps the old view, a
//! failed comment fetch marks the node "unavailable").

use crate::config::BeadsConfig;
use crate::data::{Comment, Digest, Graph, IssueRecord, SortMode};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct BdClient {
    command: String,
    list_args: Vec<String>,
    comments_args: Vec<String>,
    workdir: Option<PathBuf>,
    timeout: Duration,
}

impl BdClient {
    pub fn from_config(config: &BeadsConfig) -> Self {
        Self {
            command: config.command.clone(),
            list_args: config.list_args.clone(),
            comments_args: config.comments_args.clone(),
            workdir: config.workdir.clone(),
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
        }
    }

    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }

    /// The `.beads/` directory the watcher observes
    pub fn beads_dir(&self) -> PathBuf {
        self.workdir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".beads")
    }

    async fn run(&self, args: &[String]) -> Result<Vec<u8>> {
        let mut cmd = Command::new(&self.command);
        cmd.args(args).kill_on_drop(true);
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }

        let label = format!("{} {}", self.command, args.join(" "));
        tracing::trace!("running {}", label);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .with_context(|| format!("`{}` timed out after {:?}", label, self.timeout))?
            .with_context(|| format!("Failed to run `{}`", label))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("`{}` failed ({}): {}", label, output.status, stderr.trim());
        }

        Ok(output.stdout)
    }

    /// `bd list --json`, parsed.
    pub async fn list_records(&self) -> Result<Vec<IssueRecord>> {
        let mut args = vec!["list".to_string(), "--json".to_string()];
        args.extend(self.list_args.iter().cloned());

        let stdout = self.run(&args).await?;
        parse_issues(&stdout)
    }

    /// Fetch every issue and build a fresh graph plus its digest.
    pub async fn fetch_tree(&self, sort_mode: SortMode) -> Result<(Graph, Digest)> {
        let records = self.list_records().await?;
        let graph = Graph::from_records(&records, sort_mode)?;
        let digest = graph.digest();
        Ok((graph, digest))
    }

    /// `bd comments <id> --json`, parsed.
    pub async fn fetch_comments(&self, id: &str) -> Result<Vec<Comment>> {
        let mut args = vec!["comments".to_string(), id.to_string(), "--json".to_string()];
        args.extend(self.comments_args.iter().cloned());

        let stdout = self.run(&args).await?;
        parse_comments(&stdout).with_context(|| format!("Bad comment data for {}", id))
    }

    /// `bd delete <id> --force`
    pub async fn delete_issue(&self, id: &str) -> Result<()> {
        let args = ["delete".to_string(), id.to_string(), "--force".to_string()];
        self.run(&args).await?;
        tracing::info!(id, "deleted issue");
        Ok(())
    }
}

/// Parse `bd list --json` output. Empty output means no issues.
pub fn parse_issues(stdout: &[u8]) -> Result<Vec<IssueRecord>> {
    if is_blank(stdout) {
        return Ok(Vec::new());
    }
    let records: Option<Vec<IssueRecord>> =
        serde_json::from_slice(stdout).context("Failed to parse bd list output")?;
    Ok(records.unwrap_or_default())
}

/// Parse `bd comments --json` output; `null` and empty output mean none.
pub fn parse_comments(stdout: &[u8]) -> Result<Vec<Comment>> {
    if is_blank(stdout) {
        return Ok(Vec::new());
    }
    let comments: Option<Vec<Comment>> =
        serde_json::from_slice(stdout).context("Failed to parse bd comments output")?;
    Ok(comments.unwrap_or_default())
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}
