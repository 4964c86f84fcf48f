//! GitHub access via the `gh` CLI.
//!
//! The [`Forge`] trait is the seam between orchestration logic and the
//! external world; [`GhCli`] implements it by shelling out to `gh` and
//! decoding its `--json` output. Nothing else in the crate talks to GitHub.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::{
    runner::{CommandRunner, RunnerError},
    types::{PullRequest, Repo, RepoError, Stability},
};

pub const GH: &str = "gh";

/// Substring `gh` emits when auto-merge cannot be enabled yet. Treated as a
/// transient condition worth retrying.
const TRANSIENT_MERGE_MARKER: &str = "not in the correct state to enable auto-merge";

/// External tool failure, surfaced as data rather than a panic or abort.
#[derive(Debug, thiserror::Error)]
pub enum GhError {
    #[error("gh reported: {stderr}")]
    Tool { status: Option<i32>, stderr: String },
    #[error(transparent)]
    Runner(#[from] RunnerError),
    #[error("could not decode gh output: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Outcome of one merge attempt, before any retrying.
#[derive(Debug, thiserror::Error)]
pub enum MergeAttemptError {
    #[error("pull request is not yet in a state to enable auto-merge")]
    NotReady,
    #[error("merge failed: {0}")]
    Failed(String),
}

/// The operations this tool needs from a code forge.
#[async_trait]
pub trait Forge: Send + Sync {
    /// Enumerates every repository accessible to the authenticated account.
    async fn list_repos(&self) -> Result<Vec<Repo>, GhError>;

    /// Lists open, mergeable pull requests in `repo` authored by `author`
    /// whose merge state matches `stability`.
    async fn list_prs(
        &self,
        repo: &Repo,
        author: &str,
        stability: Stability,
    ) -> Result<Vec<PullRequest>, GhError>;

    /// Requests auto-merge with branch deletion for one pull request.
    /// One attempt only; retrying is the caller's concern.
    async fn merge_pr(&self, repo: &Repo, number: u64) -> Result<(), MergeAttemptError>;
}

#[derive(Deserialize)]
struct RepoEntry {
    url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrEntry {
    number: u64,
    author: PrAuthor,
    state: String,
    mergeable: String,
    merge_state_status: String,
    url: String,
    created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct PrAuthor {
    login: String,
}

/// [`Forge`] implementation backed by the `gh` CLI.
pub struct GhCli<R> {
    runner: R,
}

impl<R: CommandRunner> GhCli<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Enforces the shared error contract: non-zero exit OR anything on
    /// stderr means the invocation failed and the raw stderr is the error.
    fn check(output: &crate::runner::CmdOutput) -> Result<(), GhError> {
        let stderr = output.stderr_str();
        if !output.success() || !stderr.trim().is_empty() {
            return Err(GhError::Tool {
                status: output.status,
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl<R: CommandRunner> Forge for GhCli<R> {
    async fn list_repos(&self) -> Result<Vec<Repo>, GhError> {
        // High limit: the default page size would silently truncate accounts
        // with many repositories.
        let output = self
            .runner
            .run(GH, &["repo", "list", "--json", "url", "--limit", "1000"])
            .await?;
        Self::check(&output)?;

        let entries: Vec<RepoEntry> = serde_json::from_slice(&output.stdout)?;
        let repos = entries
            .iter()
            .map(|entry| Repo::from_url(&entry.url))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = repos.len(), "listed repositories");
        Ok(repos)
    }

    async fn list_prs(
        &self,
        repo: &Repo,
        author: &str,
        stability: Stability,
    ) -> Result<Vec<PullRequest>, GhError> {
        let repo_arg = repo.to_string();
        let output = self
            .runner
            .run(
                GH,
                &[
                    "pr",
                    "-R",
                    &repo_arg,
                    "list",
                    "--json",
                    "number,author,state,mergeable,mergeStateStatus,url,createdAt",
                    "--limit",
                    "200",
                ],
            )
            .await?;
        Self::check(&output)?;

        let entries: Vec<PrEntry> = serde_json::from_slice(&output.stdout)?;
        let prs = entries
            .into_iter()
            .filter(|pr| {
                pr.author.login == author
                    && pr.mergeable == "MERGEABLE"
                    && pr.state == "OPEN"
                    && pr.merge_state_status == stability.as_str()
            })
            .map(|pr| PullRequest {
                repo: repo.clone(),
                number: pr.number,
                author_login: pr.author.login,
                url: pr.url,
                created_at: pr.created_at,
            })
            .collect();
        Ok(prs)
    }

    async fn merge_pr(&self, repo: &Repo, number: u64) -> Result<(), MergeAttemptError> {
        let repo_arg = repo.to_string();
        let number_arg = number.to_string();
        let output = self
            .runner
            .run(
                GH,
                &[
                    "pr",
                    "-R",
                    &repo_arg,
                    "merge",
                    &number_arg,
                    "--auto",
                    "--delete-branch",
                    "--merge",
                ],
            )
            .await
            .map_err(|err| MergeAttemptError::Failed(err.to_string()))?;

        let stderr = output.stderr_str();
        if output.success() && stderr.trim().is_empty() {
            return Ok(());
        }
        if stderr.contains(TRANSIENT_MERGE_MARKER) {
            return Err(MergeAttemptError::NotReady);
        }
        Err(MergeAttemptError::Failed(stderr.trim().to_string()))
    }
}

/// Runs `gh auth login` on the user's terminal.
///
/// Interactive by design; streams are inherited rather than captured, and
/// the exit status is handed back so the CLI can propagate it.
pub async fn auth_login() -> anyhow::Result<std::process::ExitStatus> {
    auth(&["auth", "login"]).await
}

/// Runs `gh auth logout` on the user's terminal.
pub async fn auth_logout() -> anyhow::Result<std::process::ExitStatus> {
    auth(&["auth", "logout"]).await
}

async fn auth(args: &[&str]) -> anyhow::Result<std::process::ExitStatus> {
    use anyhow::Context;

    tokio::process::Command::new(GH)
        .args(args)
        .status()
        .await
        .with_context(|| format!("failed to run '{GH} {}'", args.join(" ")))
}
