//! One-shot and continuous polling orchestration.

use std::{collections::BTreeMap, time::Duration};

use tracing::info;

use crate::{
    github::{Forge, GhError},
    merge::{MergeRoundOutcome, RetryPolicy, merge_round},
    notify::Notifier,
    report::Report,
    stats::compute_stats,
    types::Repo,
};

/// Author whose pull requests are merged when none is given explicitly.
/// This is the login the forge reports for dependabot-created PRs.
pub const DEFAULT_AUTHOR: &str = "app/dependabot";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Whether a run is a single round or a loop that drains the account.
///
/// An explicit configuration choice: `Once` performs exactly one
/// aggregate-and-merge pass, `WatchUntilEmpty` repeats until an aggregation
/// reports zero stable PRs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollMode {
    #[default]
    Once,
    WatchUntilEmpty,
}

#[derive(Debug, Clone)]
pub struct PollConfig {
    pub mode: PollMode,
    pub interval: Duration,
    pub retry: RetryPolicy,
    pub author: String,
    /// Non-empty restricts polling to these repositories.
    pub repos: Vec<Repo>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            mode: PollMode::default(),
            interval: DEFAULT_POLL_INTERVAL,
            retry: RetryPolicy::default(),
            author: DEFAULT_AUTHOR.to_string(),
            repos: Vec::new(),
        }
    }
}

/// Drives aggregate → report → merge rounds according to `config`.
///
/// Aggregation failures end the current round: reported, notified, and in
/// watch mode waited out for a full interval rather than hot-looping. In
/// `Once` mode the failure is also returned so the process can exit
/// non-zero. All presentation goes through `report`; per-repo merge
/// outcomes are pushed to `notifier` when one is configured.
pub async fn run<F>(
    forge: &F,
    config: &PollConfig,
    report: &dyn Report,
    notifier: Option<&Notifier>,
) -> Result<(), GhError>
where
    F: Forge + ?Sized,
{
    loop {
        let stats = match compute_stats(forge, &config.repos, &config.author).await {
            Ok(stats) => stats,
            Err(err) => {
                report.aggregation_error(&err);
                if let Some(notifier) = notifier {
                    notifier.notify("Automerge", &format!("error: {err}")).await;
                }
                match config.mode {
                    PollMode::Once => return Err(err),
                    PollMode::WatchUntilEmpty => {
                        report.resting(config.interval);
                        tokio::time::sleep(config.interval).await;
                        continue;
                    }
                }
            }
        };

        report.account(&stats);

        if stats.total_stable() == 0 {
            info!("no stable pull requests, nothing to merge");
            return Ok(());
        }

        let outcome = merge_round(forge, &stats, config.retry, report).await;
        if let Some(notifier) = notifier {
            notify_round(notifier, &outcome).await;
        }

        if config.mode == PollMode::Once {
            return Ok(());
        }

        report.resting(config.interval);
        tokio::time::sleep(config.interval).await;
    }
}

/// Sends one webhook message per repository that saw merges, plus one per
/// failed PR.
async fn notify_round(notifier: &Notifier, outcome: &MergeRoundOutcome) {
    let mut merged_by_repo: BTreeMap<&Repo, Vec<u64>> = BTreeMap::new();
    for pr in &outcome.merged {
        merged_by_repo.entry(&pr.repo).or_default().push(pr.number);
    }

    for (repo, numbers) in merged_by_repo {
        notifier
            .notify(
                "Automerge",
                &format!("Merged {numbers:?} PRs ({} total) in {repo}", numbers.len()),
            )
            .await;
    }

    for (pr, err) in &outcome.failed {
        notifier
            .notify(
                "Automerge",
                &format!("Failed to merge #{} in {}: {err}", pr.number, pr.repo),
            )
            .await;
    }
}
