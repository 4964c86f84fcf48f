//! Command-line surface.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::{
    merge::RetryPolicy,
    poll::{DEFAULT_AUTHOR, DEFAULT_POLL_INTERVAL, PollConfig, PollMode},
    types::{Repo, RepoError},
};

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

#[derive(Parser, Debug)]
#[command(name = "automerge")]
#[command(about = "Automatically merge GitHub pull requests that pass all checks, driven by the gh CLI")]
#[command(long_version = BUILD_INFO_HUMAN)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in to GitHub (delegates to 'gh auth login')
    Login,
    /// Log out of the current GitHub account (delegates to 'gh auth logout')
    Logout,
    /// Show stable/unstable pull request stats for the account
    Info(InfoArgs),
    /// Merge every currently-stable pull request
    Merge(MergeArgs),
}

#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    /// Only include these repositories (can specify multiple)
    #[arg(short = 'r', long = "repos", value_name = "OWNER/NAME")]
    pub repos: Vec<String>,

    /// Display more detailed information
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Only merge in these repositories (can specify multiple)
    #[arg(short = 'r', long = "repos", value_name = "OWNER/NAME")]
    pub repos: Vec<String>,

    /// Only merge pull requests from this author
    #[arg(short = 'a', long, value_name = "LOGIN", default_value = DEFAULT_AUTHOR)]
    pub author: String,

    /// Display more detailed information
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Keep polling until no stable pull requests remain
    #[arg(long)]
    pub watch: bool,

    /// Seconds to sleep between polling rounds (with --watch)
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
    pub interval: u64,
}

fn parse_repo_filter(repos: &[String]) -> Result<Vec<Repo>, RepoError> {
    repos.iter().map(|repo| Repo::parse(repo)).collect()
}

impl InfoArgs {
    pub fn repo_filter(&self) -> Result<Vec<Repo>, RepoError> {
        parse_repo_filter(&self.repos)
    }
}

impl MergeArgs {
    pub fn poll_config(&self) -> Result<PollConfig, RepoError> {
        Ok(PollConfig {
            mode: if self.watch {
                PollMode::WatchUntilEmpty
            } else {
                PollMode::Once
            },
            interval: Duration::from_secs(self.interval),
            retry: RetryPolicy::default(),
            author: self.author.clone(),
            repos: parse_repo_filter(&self.repos)?,
        })
    }
}
