//! Console reporting for the automerge binary.
//!
//! Pure formatting lives in functions that take `&mut impl Write` so it can
//! be unit tested; [`ConsoleReport`] wires them to stdout/stderr for the
//! library's reporting seam.

use std::{
    io::{self, Write},
    time::Duration,
};

use automerge::{AccountStats, GhError, MergeError, PullRequest, Repo, Report};
use chrono_humanize::HumanTime;

const LIST_COLUMNS: usize = 2;

fn write_columns<W: Write>(out: &mut W, items: &[String]) -> io::Result<()> {
    let width = items.iter().map(String::len).max().unwrap_or(0);
    for row in items.chunks(LIST_COLUMNS) {
        let line = row
            .iter()
            .map(|item| format!("{item:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(out, "  {}", line.trim_end())?;
    }
    Ok(())
}

fn write_bucket<W: Write>(
    out: &mut W,
    label: &str,
    repos: &[&Repo],
    prs: &[&PullRequest],
    verbose: bool,
) -> io::Result<()> {
    writeln!(out, "{label} REPO(s): {}", repos.len())?;
    if verbose && !repos.is_empty() {
        let names: Vec<String> = repos.iter().map(|repo| repo.to_string()).collect();
        write_columns(out, &names)?;
    }
    writeln!(out, "{label} PR(s): {}", prs.len())?;
    if verbose {
        for pr in prs {
            writeln!(out, "  {} ({})", pr.url, HumanTime::from(pr.created_at))?;
        }
    }
    Ok(())
}

/// Renders the account summary: totals, the stable/unstable/neutral
/// partition, and the round's outcome line.
pub fn write_account<W: Write>(out: &mut W, stats: &AccountStats, verbose: bool) -> io::Result<()> {
    writeln!(out, "TOTAL: {} repo(s)", stats.len())?;
    if verbose && !stats.is_empty() {
        let names: Vec<String> = stats.iter().map(|(repo, _)| repo.to_string()).collect();
        write_columns(out, &names)?;
    }
    let neutral_repos = stats.neutral_repos();
    writeln!(out, "NEUTRAL: {} repo(s)", neutral_repos.len())?;
    if verbose && !neutral_repos.is_empty() {
        let names: Vec<String> = neutral_repos.iter().map(|repo| repo.to_string()).collect();
        write_columns(out, &names)?;
    }
    writeln!(out)?;

    let unstable_repos = stats.unstable_repos();
    let unstable_prs: Vec<&PullRequest> = stats.unstable_prs().collect();

    if stats.total_stable() == 0 {
        write_bucket(out, "UNSTABLE", &unstable_repos, &unstable_prs, verbose)?;
        writeln!(out)?;
        writeln!(out, "OUTCOME: no pull requests ready for auto-merge")?;
    } else {
        let stable_repos = stats.stable_repos();
        let stable_prs: Vec<&PullRequest> = stats.stable_prs().collect();
        write_bucket(out, "STABLE", &stable_repos, &stable_prs, verbose)?;
        write_bucket(out, "UNSTABLE", &unstable_repos, &unstable_prs, verbose)?;
        writeln!(out)?;
        writeln!(
            out,
            "OUTCOME: {} pull request(s) ready for auto-merge",
            stats.total_stable()
        )?;
    }

    Ok(())
}

/// Console implementation of the library's reporting seam.
pub struct ConsoleReport {
    verbose: bool,
}

impl ConsoleReport {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Report for ConsoleReport {
    fn account(&self, stats: &AccountStats) {
        let mut stdout = io::stdout();
        let _ = write_account(&mut stdout, stats, self.verbose);
    }

    fn merging(&self, repo: &Repo, count: usize) {
        println!("automerging {count} PR(s) in {repo}");
    }

    fn no_candidates(&self, repo: &Repo) {
        if self.verbose {
            println!("no PRs found in {repo}");
        }
    }

    fn merged(&self, pr: &PullRequest) {
        println!("merged #{} in {}", pr.number, pr.repo);
    }

    fn merge_failed(&self, pr: &PullRequest, err: &MergeError) {
        eprintln!("error merging #{} in {}: {err}", pr.number, pr.repo);
    }

    fn aggregation_error(&self, err: &GhError) {
        eprintln!("error: {err}");
    }

    fn resting(&self, interval: Duration) {
        println!("resting for {}s", interval.as_secs());
    }
}

#[cfg(test)]
mod tests {
    use automerge::RepoStats;
    use chrono::Utc;

    use super::*;

    fn repo(name: &str) -> Repo {
        Repo::parse(name).unwrap()
    }

    fn pr(repo_name: &str, number: u64) -> PullRequest {
        PullRequest {
            repo: repo(repo_name),
            number,
            author_login: "app/dependabot".to_string(),
            url: format!("https://github.com/{repo_name}/pull/{number}"),
            created_at: Utc::now(),
        }
    }

    fn render(stats: &AccountStats, verbose: bool) -> String {
        let mut out = Vec::new();
        write_account(&mut out, stats, verbose).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_empty_account_reports_no_candidates() {
        let stats = AccountStats::default();
        let rendered = render(&stats, false);

        assert!(rendered.contains("TOTAL: 0 repo(s)"));
        assert!(rendered.contains("OUTCOME: no pull requests ready for auto-merge"));
    }

    #[test]
    fn test_stable_account_reports_candidate_count() {
        let mut stats = AccountStats::default();
        stats.push(
            repo("octo/widgets"),
            RepoStats {
                stable_prs: vec![pr("octo/widgets", 7), pr("octo/widgets", 8)],
                unstable_prs: vec![],
            },
        );
        stats.push(
            repo("octo/flaky"),
            RepoStats {
                stable_prs: vec![],
                unstable_prs: vec![pr("octo/flaky", 3)],
            },
        );
        let rendered = render(&stats, false);

        assert!(rendered.contains("TOTAL: 2 repo(s)"));
        assert!(rendered.contains("STABLE REPO(s): 1"));
        assert!(rendered.contains("STABLE PR(s): 2"));
        assert!(rendered.contains("UNSTABLE REPO(s): 1"));
        assert!(rendered.contains("UNSTABLE PR(s): 1"));
        assert!(rendered.contains("OUTCOME: 2 pull request(s) ready for auto-merge"));
    }

    #[test]
    fn test_unstable_only_account_hides_stable_bucket() {
        let mut stats = AccountStats::default();
        stats.push(
            repo("octo/flaky"),
            RepoStats {
                stable_prs: vec![],
                unstable_prs: vec![pr("octo/flaky", 3)],
            },
        );
        let rendered = render(&stats, false);

        assert!(!rendered.contains("STABLE REPO(s):"), "{rendered}");
        assert!(rendered.contains("UNSTABLE REPO(s): 1"));
        assert!(rendered.contains("OUTCOME: no pull requests ready for auto-merge"));
    }

    #[test]
    fn test_verbose_lists_repo_names_and_pr_urls() {
        let mut stats = AccountStats::default();
        stats.push(
            repo("octo/widgets"),
            RepoStats {
                stable_prs: vec![pr("octo/widgets", 7)],
                unstable_prs: vec![],
            },
        );
        stats.push(repo("octo/quiet"), RepoStats::default());
        let rendered = render(&stats, true);

        assert!(rendered.contains("octo/widgets"));
        assert!(rendered.contains("octo/quiet"));
        assert!(rendered.contains("https://github.com/octo/widgets/pull/7"));
    }

    #[test]
    fn test_columns_pad_to_widest_entry() {
        let mut out = Vec::new();
        write_columns(
            &mut out,
            &[
                "a/short".to_string(),
                "owner/much-longer-name".to_string(),
                "b/odd".to_string(),
            ],
        )
        .unwrap();
        let rendered = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("a/short"));
        assert!(lines[0].contains("owner/much-longer-name"));
        assert_eq!(lines[1].trim(), "b/odd");
    }
}
