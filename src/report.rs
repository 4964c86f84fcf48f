//! Presentation seam.
//!
//! The poll loop and merge executor report progress through this trait and
//! never print; the binary supplies the console implementation.

use std::time::Duration;

use crate::{
    github::GhError,
    merge::MergeError,
    types::{AccountStats, PullRequest, Repo},
};

pub trait Report: Send + Sync {
    /// A fresh aggregation finished; show the account summary.
    fn account(&self, stats: &AccountStats);

    /// A merge round is starting on `count` PRs in `repo`.
    fn merging(&self, repo: &Repo, count: usize);

    /// A repository had no qualifying PRs this round.
    fn no_candidates(&self, repo: &Repo);

    fn merged(&self, pr: &PullRequest);

    fn merge_failed(&self, pr: &PullRequest, err: &MergeError);

    fn aggregation_error(&self, err: &GhError);

    /// The poll loop is sleeping before its next round.
    fn resting(&self, interval: Duration);
}

/// Reporter that swallows everything. Useful in tests and for callers that
/// only want the returned values.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReport;

impl Report for NullReport {
    fn account(&self, _stats: &AccountStats) {}
    fn merging(&self, _repo: &Repo, _count: usize) {}
    fn no_candidates(&self, _repo: &Repo) {}
    fn merged(&self, _pr: &PullRequest) {}
    fn merge_failed(&self, _pr: &PullRequest, _err: &MergeError) {}
    fn aggregation_error(&self, _err: &GhError) {}
    fn resting(&self, _interval: Duration) {}
}
