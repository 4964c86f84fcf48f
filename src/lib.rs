//! Automerge: automatically merge GitHub pull requests that pass all checks.
//!
//! Polls an account's repositories through the `gh` CLI, aggregates open
//! mergeable pull requests into stable/unstable stats, and enables
//! auto-merge on the stable ones with a bounded retry loop. Supports a
//! single pass or a watch loop that drains the account, with optional
//! webhook notification of merge outcomes.

pub mod cli;
pub mod github;
pub mod merge;
pub mod notify;
pub mod poll;
pub mod report;
pub mod runner;
pub mod stats;
pub mod types;

pub use cli::{Cli, Command};
pub use github::{Forge, GhCli, GhError, MergeAttemptError};
pub use merge::{MergeError, MergeRoundOutcome, RetryPolicy, merge_one, merge_round};
pub use notify::Notifier;
pub use poll::{DEFAULT_AUTHOR, PollConfig, PollMode};
pub use report::{NullReport, Report};
pub use runner::{CmdOutput, CommandRunner, ProcessRunner, RunnerError};
pub use stats::compute_stats;
pub use types::{
    AccountStats, PullRequest, Repo, RepoClass, RepoError, RepoStats, Stability,
};
