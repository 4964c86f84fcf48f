use std::fmt;

use chrono::{DateTime, Utc};
use url::Url;

/// Error raised when a repository identifier cannot be derived.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepoError {
    #[error("repository must be in 'owner/name' format, got '{0}'")]
    Format(String),
    #[error("cannot derive 'owner/name' from URL '{0}'")]
    Url(String),
}

/// A validated `owner/name` repository identifier.
///
/// This is the canonical handle used both as the `-R` argument to the
/// external tool and as the key in aggregated stats.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Repo {
    owner: String,
    name: String,
}

impl Repo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, RepoError> {
        let owner = owner.into();
        let name = name.into();
        if owner.is_empty() || name.is_empty() || owner.contains('/') || name.contains('/') {
            return Err(RepoError::Format(format!("{owner}/{name}")));
        }
        Ok(Self { owner, name })
    }

    /// Parses an `owner/name` string.
    pub fn parse(s: &str) -> Result<Self, RepoError> {
        match s.split('/').collect::<Vec<_>>().as_slice() {
            [owner, name] => Self::new(*owner, *name),
            _ => Err(RepoError::Format(s.to_string())),
        }
    }

    /// Derives the identifier from a repository URL by taking the last two
    /// path segments, e.g. `https://github.com/octocat/hello` becomes
    /// `octocat/hello`.
    pub fn from_url(url: &str) -> Result<Self, RepoError> {
        let parsed = Url::parse(url).map_err(|_| RepoError::Url(url.to_string()))?;
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        match segments.as_slice() {
            [.., owner, name] => {
                Self::new(*owner, *name).map_err(|_| RepoError::Url(url.to_string()))
            }
            _ => Err(RepoError::Url(url.to_string())),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Merge-state buckets a pull request can land in.
///
/// The external tool reports `mergeStateStatus` as an open string set; only
/// `CLEAN` and `UNSTABLE` are of interest here, anything else matches
/// neither bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    Clean,
    Unstable,
}

impl Stability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stability::Clean => "CLEAN",
            Stability::Unstable => "UNSTABLE",
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot of a pull request taken at fetch time.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
    pub repo: Repo,
    pub number: u64,
    pub author_login: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Per-repository buckets of qualifying pull requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoStats {
    pub stable_prs: Vec<PullRequest>,
    pub unstable_prs: Vec<PullRequest>,
}

/// Classification of a repository for the account-level partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoClass {
    Stable,
    Unstable,
    Neutral,
}

impl RepoStats {
    pub fn num_stable(&self) -> usize {
        self.stable_prs.len()
    }

    pub fn num_unstable(&self) -> usize {
        self.unstable_prs.len()
    }

    /// Total classification function: any unstable PR marks the repository
    /// unstable, otherwise any stable PR marks it stable, otherwise it is
    /// neutral. Every repository lands in exactly one class.
    pub fn classify(&self) -> RepoClass {
        if self.num_unstable() > 0 {
            RepoClass::Unstable
        } else if self.num_stable() > 0 {
            RepoClass::Stable
        } else {
            RepoClass::Neutral
        }
    }
}

/// Aggregate view over all repositories, rebuilt wholesale on every polling
/// round and never mutated in place.
///
/// Repositories keep the order the external tool returned them in.
#[derive(Debug, Clone, Default)]
pub struct AccountStats {
    repos: Vec<(Repo, RepoStats)>,
}

impl AccountStats {
    pub fn push(&mut self, repo: Repo, stats: RepoStats) {
        self.repos.push((repo, stats));
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Repo, RepoStats)> {
        self.repos.iter()
    }

    pub fn total_stable(&self) -> usize {
        self.repos.iter().map(|(_, s)| s.num_stable()).sum()
    }

    pub fn total_unstable(&self) -> usize {
        self.repos.iter().map(|(_, s)| s.num_unstable()).sum()
    }

    fn repos_in_class(&self, class: RepoClass) -> Vec<&Repo> {
        self.repos
            .iter()
            .filter(|(_, s)| s.classify() == class)
            .map(|(repo, _)| repo)
            .collect()
    }

    pub fn stable_repos(&self) -> Vec<&Repo> {
        self.repos_in_class(RepoClass::Stable)
    }

    pub fn unstable_repos(&self) -> Vec<&Repo> {
        self.repos_in_class(RepoClass::Unstable)
    }

    pub fn neutral_repos(&self) -> Vec<&Repo> {
        self.repos_in_class(RepoClass::Neutral)
    }

    /// All stable PRs across the account, flattened in repository order.
    pub fn stable_prs(&self) -> impl Iterator<Item = &PullRequest> {
        self.repos.iter().flat_map(|(_, s)| s.stable_prs.iter())
    }

    /// All unstable PRs across the account, flattened in repository order.
    pub fn unstable_prs(&self) -> impl Iterator<Item = &PullRequest> {
        self.repos.iter().flat_map(|(_, s)| s.unstable_prs.iter())
    }
}

impl FromIterator<(Repo, RepoStats)> for AccountStats {
    fn from_iter<I: IntoIterator<Item = (Repo, RepoStats)>>(iter: I) -> Self {
        Self {
            repos: iter.into_iter().collect(),
        }
    }
}
