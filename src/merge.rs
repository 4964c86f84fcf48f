//! Merge execution with bounded retry.
//!
//! The external tool occasionally reports a PR as not yet ready for
//! auto-merge even though it qualifies; that condition is transient and
//! worth waiting out. Everything else fails fast.

use std::time::Duration;

use tracing::{debug, warn};

use crate::{
    github::{Forge, MergeAttemptError},
    report::Report,
    types::{AccountStats, PullRequest, Repo},
};

/// Knobs for the bounded retry loop around one merge.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the initial attempt; 5 means at most 6 attempts total.
    pub max_retries: u32,
    /// Fixed delay between attempts.
    pub backoff: Duration,
}

pub const MERGE_BACKOFF: Duration = Duration::from_secs(30);

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff: MERGE_BACKOFF,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("pull request never became ready for auto-merge ({attempts} attempts)")]
    Exhausted { attempts: u32 },
    #[error("merge failed: {0}")]
    Failed(String),
}

/// Merges one pull request, retrying transient not-ready failures with a
/// fixed backoff.
///
/// Iterative with an explicit attempt counter; terminates within
/// `max_retries + 1` attempts. Permanent failures are returned immediately
/// without retrying.
pub async fn merge_one<F>(
    forge: &F,
    repo: &Repo,
    number: u64,
    policy: RetryPolicy,
) -> Result<(), MergeError>
where
    F: Forge + ?Sized,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match forge.merge_pr(repo, number).await {
            Ok(()) => {
                debug!(%repo, number, attempt, "auto-merge enabled");
                return Ok(());
            }
            Err(MergeAttemptError::NotReady) => {
                if attempt > policy.max_retries {
                    return Err(MergeError::Exhausted { attempts: attempt });
                }
                debug!(%repo, number, attempt, "not ready for auto-merge, backing off");
                tokio::time::sleep(policy.backoff).await;
            }
            Err(MergeAttemptError::Failed(reason)) => {
                return Err(MergeError::Failed(reason));
            }
        }
    }
}

/// What one merge round did.
#[derive(Debug, Default)]
pub struct MergeRoundOutcome {
    pub merged: Vec<PullRequest>,
    pub failed: Vec<(PullRequest, MergeError)>,
}

impl MergeRoundOutcome {
    pub fn attempted(&self) -> usize {
        self.merged.len() + self.failed.len()
    }
}

/// Merges every currently-stable PR in the aggregate, repository by
/// repository.
///
/// Failures are isolated per PR: one permanent failure is reported and
/// recorded but never blocks the remaining candidates in the round.
pub async fn merge_round<F>(
    forge: &F,
    stats: &AccountStats,
    policy: RetryPolicy,
    report: &dyn Report,
) -> MergeRoundOutcome
where
    F: Forge + ?Sized,
{
    let mut outcome = MergeRoundOutcome::default();

    for (repo, repo_stats) in stats.iter() {
        if repo_stats.stable_prs.is_empty() {
            report.no_candidates(repo);
            continue;
        }

        report.merging(repo, repo_stats.stable_prs.len());
        for pr in &repo_stats.stable_prs {
            match merge_one(forge, repo, pr.number, policy).await {
                Ok(()) => {
                    report.merged(pr);
                    outcome.merged.push(pr.clone());
                }
                Err(err) => {
                    warn!(repo = %repo, number = pr.number, error = %err, "merge failed");
                    report.merge_failed(pr, &err);
                    outcome.failed.push((pr.clone(), err));
                }
            }
        }
    }

    outcome
}
