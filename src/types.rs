use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::{config::RunConfig, error::FetchError};

/// Errors produced when building a [`Repo`] from user-supplied identifiers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepoError {
    #[error("repository owner must not be empty")]
    EmptyOwner,
    #[error("repository name must not be empty")]
    EmptyName,
    #[error("repository must be in format 'owner/repo', got: '{0}'")]
    InvalidFormat(String),
}

/// A GitHub repository identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
    pub owner: String,
    pub name: String,
}

impl Repo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, RepoError> {
        let owner = owner.into();
        let name = name.into();
        if owner.trim().is_empty() {
            return Err(RepoError::EmptyOwner);
        }
        if name.trim().is_empty() {
            return Err(RepoError::EmptyName);
        }
        Ok(Self { owner, name })
    }

    /// Parses an `owner/repo` string such as the one found in
    /// `GITHUB_REPOSITORY`.
    pub fn parse(repo: &str) -> Result<Self, RepoError> {
        match repo.trim().split_once('/') {
            Some((owner, name)) if !name.contains('/') => Self::new(owner, name),
            _ => Err(RepoError::InvalidFormat(repo.to_string())),
        }
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// An open pull request as observed when its page was fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub labels: Vec<String>,
}

impl PullRequest {
    pub fn new<I, S>(number: u64, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            number,
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact, case-sensitive label lookup.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// One batch of open pull requests plus the cursor needed to continue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub pull_requests: Vec<PullRequest>,
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

/// Source of open pull request pages.
///
/// `after` is `None` for the first request and the previous page's
/// `end_cursor` for every request after that.
#[async_trait]
pub trait GraphClient {
    async fn fetch_page(&self, repo: &Repo, after: Option<&str>) -> Result<Page, FetchError>;
}

/// The external per-pull-request preview operation.
///
/// Implementations must honour `config.dry_run` by suppressing any
/// mutating side effect.
#[async_trait]
pub trait Preview {
    async fn preview(&self, number: u64, config: &RunConfig) -> anyhow::Result<()>;
}

/// Summary of a run that completed every step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub open_prs: usize,
    pub previewed: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse {
    pub data: Option<RepositoryData>,
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLError {
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryData {
    pub repository: Option<GraphQLRepository>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLRepository {
    pub open_prs: PullRequestConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestConnection {
    pub nodes: Vec<GraphQLPullRequest>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLPullRequest {
    pub number: u64,
    pub labels: GraphQLLabelConnection,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLLabelConnection {
    pub nodes: Vec<GraphQLLabel>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLLabel {
    pub name: String,
}
