use std::time::SystemTime;

use reqwest_retry::{RetryDecision, RetryPolicy};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::{
    config::RetryConfig,
    error::FetchError,
    types::{GraphClient, Page, PullRequest, Repo},
};

/// Fetches every open pull request in `repo`, newest first.
///
/// Pages are requested one at a time, each carrying the previous page's end
/// cursor, until GitHub reports no further pages. Any failure discards the
/// pages accumulated so far; callers never see a partial list.
pub async fn fetch_open_prs<C>(
    client: &C,
    repo: &Repo,
    retry: &RetryConfig,
    cancel: &CancellationToken,
) -> Result<Vec<PullRequest>, FetchError>
where
    C: GraphClient + Sync,
{
    let mut open_prs = Vec::new();
    let mut end_cursor: Option<String> = None;
    let mut page_count = 0usize;

    loop {
        let page = match fetch_page_with_retry(client, repo, end_cursor.as_deref(), retry, cancel)
            .await
        {
            Ok(page) => page,
            Err(err) => {
                if err.is_api_error() {
                    error!("Could not retrieve open pull requests using GraphQL: {err}");
                }
                return Err(err);
            }
        };
        page_count += 1;
        debug!(
            "Fetched page {page_count} of open pull requests for {repo} ({} entries)",
            page.pull_requests.len()
        );

        open_prs.extend(page.pull_requests);

        if !page.has_next_page {
            break;
        }

        match page.end_cursor {
            Some(cursor) => end_cursor = Some(cursor),
            None => {
                return Err(FetchError::UnexpectedShape {
                    message: format!("page {page_count} reports more pages but has no end cursor"),
                });
            }
        }
    }

    Ok(open_prs)
}

/// Requests a single page, retrying rate-limit errors within `retry`'s
/// bounds. Other errors return immediately.
///
/// `cancel` is checked before every request, retries included, and cuts a
/// pending backoff short.
async fn fetch_page_with_retry<C>(
    client: &C,
    repo: &Repo,
    after: Option<&str>,
    retry: &RetryConfig,
    cancel: &CancellationToken,
) -> Result<Page, FetchError>
where
    C: GraphClient + Sync,
{
    let policy = retry.policy();
    let started = SystemTime::now();
    let mut past_retries = 0u32;

    loop {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        match client.fetch_page(repo, after).await {
            Err(err) if err.is_rate_limited() => {
                let RetryDecision::Retry { execute_after } =
                    policy.should_retry(started, past_retries)
                else {
                    return Err(err);
                };
                let delay = execute_after
                    .duration_since(SystemTime::now())
                    .unwrap_or_default();
                past_retries += 1;
                warn!(
                    "Rate limited fetching open pull requests (attempt {past_retries}), retrying in {delay:?}: {err}"
                );
                tokio::select! {
                    _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            result => return result,
        }
    }
}
