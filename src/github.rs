use std::process::Command;

use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::debug;

use crate::{
    error::FetchError,
    graphql::{convert_graphql_response, create_graphql_query},
    types::{GraphClient, GraphQLResponse, Page, Repo},
};

pub const REPOSITORY_VAR: &str = "GITHUB_REPOSITORY";

/// Resolves a GitHub token from the environment, falling back to the `gh`
/// CLI.
pub fn get_github_token() -> Result<String> {
    for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
        if let Some(token) = std::env::var(var).ok().filter(|t| !t.trim().is_empty()) {
            debug!("Using GitHub token from {var}");
            return Ok(token);
        }
    }

    let output = Command::new("gh")
        .args(["auth", "token"])
        .output()
        .context("Failed to run 'gh auth token'")?;

    if !output.status.success() {
        anyhow::bail!("Failed to get GitHub token from gh CLI. Please run 'gh auth login' first");
    }

    let token = String::from_utf8(output.stdout)?.trim().to_string();
    if token.is_empty() {
        anyhow::bail!("Empty token returned from gh CLI");
    }

    Ok(token)
}

/// Resolves the target repository from `GITHUB_REPOSITORY`.
pub fn resolve_repo<F>(lookup: F) -> Result<Repo>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(REPOSITORY_VAR)
        .with_context(|| format!("{REPOSITORY_VAR} must be set to 'owner/repo'"))?;
    Repo::parse(&value).with_context(|| format!("Invalid {REPOSITORY_VAR} value: '{value}'"))
}

fn is_network_error(error: &octocrab::Error) -> bool {
    matches!(
        error,
        octocrab::Error::Http { .. }
            | octocrab::Error::Hyper { .. }
            | octocrab::Error::Service { .. }
    )
}

fn is_rate_limit_error(source: &octocrab::GitHubError) -> bool {
    let status = source.status_code.as_u16();
    let message_indicates_rate_limit = source.message.to_lowercase().contains("rate limit")
        || source
            .documentation_url
            .as_deref()
            .is_some_and(|url| url.contains("rate-limit"));

    matches!(status, 403 | 429) && message_indicates_rate_limit
}

/// Classifies an octocrab failure. Only errors GitHub described with a
/// status and message are recognised; transport failures and anything else
/// pass through unchanged.
pub fn map_octocrab_error(error: octocrab::Error) -> FetchError {
    if let octocrab::Error::GitHub { source, .. } = &error {
        let status = source.status_code;
        if is_rate_limit_error(source) {
            return FetchError::RateLimited {
                message: source.message.clone(),
            };
        }
        if status.as_u16() == 401 {
            return FetchError::Authentication {
                message: source.message.clone(),
            };
        }
        return FetchError::Api {
            message: format!("GitHub returned {status}: {}", source.message),
        };
    }

    if is_network_error(&error) {
        debug!("Network error talking to GitHub: {error}");
    }
    FetchError::Unrecognized(error.into())
}

/// Octocrab-backed [`GraphClient`].
pub struct GitHub {
    octocrab: Octocrab,
}

impl GitHub {
    /// Creates an authenticated client against `api_url`; the GraphQL
    /// endpoint is `<api_url>/graphql`.
    pub fn new(token: String, api_url: &str) -> Result<Self> {
        debug!("Creating GitHub client for {api_url}");
        let octocrab = Octocrab::builder()
            .personal_token(token)
            .base_uri(api_url)
            .with_context(|| format!("Invalid GitHub API URL: '{api_url}'"))?
            .build()
            .context("Failed to create GitHub client")?;
        Ok(Self { octocrab })
    }

    pub fn from_octocrab(octocrab: Octocrab) -> Self {
        Self { octocrab }
    }
}

#[async_trait]
impl GraphClient for GitHub {
    async fn fetch_page(&self, repo: &Repo, after: Option<&str>) -> Result<Page, FetchError> {
        let query = create_graphql_query(repo, after);
        let response: GraphQLResponse = self
            .octocrab
            .graphql(&query)
            .await
            .map_err(map_octocrab_error)?;
        convert_graphql_response(response)
    }
}
