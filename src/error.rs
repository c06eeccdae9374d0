//! Errors raised while paging through open pull requests.

use thiserror::Error;

/// Failure while fetching a page of open pull requests.
///
/// The first three variants are structured errors returned by GitHub.
/// Everything else GitHub did not describe ends up in `Unrecognized`
/// untouched.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The credential was missing, invalid, or lacked the required scope.
    #[error("GitHub rejected the credential: {message}")]
    Authentication { message: String },

    /// Primary or secondary rate limit exhausted.
    #[error("GitHub API rate limit exceeded: {message}")]
    RateLimited { message: String },

    /// Any other structured GitHub failure (malformed query, unknown
    /// repository, missing data).
    #[error("GitHub API error: {message}")]
    Api { message: String },

    /// The response violated the pagination contract.
    #[error("unexpected GraphQL response: {message}")]
    UnexpectedShape { message: String },

    #[error("fetch cancelled")]
    Cancelled,

    #[error(transparent)]
    Unrecognized(#[from] anyhow::Error),
}

impl FetchError {
    /// Returns true for errors GitHub reported in a structured form.
    pub fn is_api_error(&self) -> bool {
        matches!(
            self,
            FetchError::Authentication { .. }
                | FetchError::RateLimited { .. }
                | FetchError::Api { .. }
        )
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimited { .. })
    }
}
