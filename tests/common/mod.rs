#![allow(dead_code)]

use std::{collections::VecDeque, sync::Mutex, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use prsweep::{FetchError, GraphClient, Page, Preview, PullRequest, Repo, RetryConfig, RunConfig};
use tokio_util::sync::CancellationToken;

/// Mock GraphQL client replaying a fixed sequence of page results.
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Result<Page, FetchError>>>,
    requests: Mutex<Vec<Option<String>>>,
    cancel_on: Option<(usize, CancellationToken)>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<Result<Page, FetchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            cancel_on: None,
        }
    }

    /// Cancels `token` while serving the `request`-th request (1-based).
    pub fn cancelling_on(mut self, request: usize, token: CancellationToken) -> Self {
        self.cancel_on = Some((request, token));
        self
    }

    /// Cursors sent with each request, in order.
    pub fn requests(&self) -> Vec<Option<String>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GraphClient for ScriptedClient {
    async fn fetch_page(&self, _repo: &Repo, after: Option<&str>) -> Result<Page, FetchError> {
        let served = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(after.map(str::to_string));
            requests.len()
        };
        if let Some((request, token)) = &self.cancel_on {
            if *request == served {
                token.cancel();
            }
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("more page requests than scripted responses")
    }
}

/// Mock preview recording every invocation and failing on chosen numbers.
#[derive(Default)]
pub struct RecordingPreview {
    pub fail_on: Vec<u64>,
    calls: Mutex<Vec<(u64, bool)>>,
    cancel_on_first: Option<CancellationToken>,
}

impl RecordingPreview {
    pub fn failing_on(fail_on: Vec<u64>) -> Self {
        Self {
            fail_on,
            ..Self::default()
        }
    }

    /// Cancels `token` during the first invocation, which itself succeeds.
    pub fn cancelling(token: CancellationToken) -> Self {
        Self {
            cancel_on_first: Some(token),
            ..Self::default()
        }
    }

    pub fn numbers(&self) -> Vec<u64> {
        self.calls.lock().unwrap().iter().map(|(n, _)| *n).collect()
    }

    /// Dry-run flag observed by each invocation.
    pub fn dry_run_flags(&self) -> Vec<bool> {
        self.calls.lock().unwrap().iter().map(|(_, d)| *d).collect()
    }
}

#[async_trait]
impl Preview for RecordingPreview {
    async fn preview(&self, number: u64, config: &RunConfig) -> Result<()> {
        let first = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((number, config.dry_run));
            calls.len() == 1
        };
        if let (true, Some(token)) = (first, &self.cancel_on_first) {
            token.cancel();
        }
        // Yield so overlapping invocations would be observable.
        tokio::task::yield_now().await;
        if self.fail_on.contains(&number) {
            anyhow::bail!("preview script crashed on #{number}");
        }
        Ok(())
    }
}

pub fn test_repo() -> Repo {
    Repo::new("owner", "repo").unwrap()
}

pub fn page(prs: Vec<PullRequest>, end_cursor: Option<&str>, has_next_page: bool) -> Page {
    Page {
        pull_requests: prs,
        end_cursor: end_cursor.map(str::to_string),
        has_next_page,
    }
}

pub fn pr(number: u64, labels: &[&str]) -> PullRequest {
    PullRequest::new(number, labels.iter().copied())
}

pub fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig {
        max_retries,
        min_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(2),
    }
}

pub fn test_config() -> RunConfig {
    let mut config = RunConfig::new(vec!["preview".to_string()]);
    config.retry = fast_retry(2);
    config
}

pub fn rate_limited() -> FetchError {
    FetchError::RateLimited {
        message: "API rate limit exceeded".to_string(),
    }
}
