//! Account-wide aggregation of qualifying pull requests.

use tracing::debug;

use crate::{
    github::{Forge, GhError},
    types::{AccountStats, Repo, RepoStats, Stability},
};

/// Builds a fresh [`AccountStats`] for one polling round.
///
/// Lists repositories once, then fetches the clean and unstable PR sets for
/// each. Any listing or fetch failure aborts the whole aggregation and
/// propagates verbatim; a partial report is never returned. A non-empty
/// `filter` restricts aggregation to the repositories it names.
pub async fn compute_stats<F>(
    forge: &F,
    filter: &[Repo],
    author: &str,
) -> Result<AccountStats, GhError>
where
    F: Forge + ?Sized,
{
    let mut repos = forge.list_repos().await?;
    if !filter.is_empty() {
        repos.retain(|repo| filter.contains(repo));
    }

    let mut stats = AccountStats::default();
    for repo in repos {
        let stable_prs = forge.list_prs(&repo, author, Stability::Clean).await?;
        let unstable_prs = forge.list_prs(&repo, author, Stability::Unstable).await?;
        debug!(
            repo = %repo,
            stable = stable_prs.len(),
            unstable = unstable_prs.len(),
            "fetched pull requests"
        );
        stats.push(
            repo,
            RepoStats {
                stable_prs,
                unstable_prs,
            },
        );
    }

    Ok(stats)
}
