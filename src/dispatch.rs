use std::fmt;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    config::RunConfig,
    paginate::fetch_open_prs,
    select::{pr_numbers, pulls_with_label},
    types::{GraphClient, Preview, Repo, RunReport},
};

/// Lifecycle of a single sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    FetchingOpenPrs,
    Filtering,
    /// Zero-based index into the worklist.
    Dispatching(usize),
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::FetchingOpenPrs => write!(f, "fetching open pull requests"),
            RunState::Filtering => write!(f, "filtering"),
            RunState::Dispatching(i) => write!(f, "dispatching #{i}"),
            RunState::Done => write!(f, "done"),
            RunState::Failed => write!(f, "failed"),
        }
    }
}

fn transition(state: &mut RunState, next: RunState) {
    debug!("Run state: {state} -> {next}");
    *state = next;
}

/// Fetches every open pull request, keeps those labelled `config.label`
/// and previews each one in fetch order.
///
/// Stops at the first error. A fetch failure means no preview runs; a
/// preview failure leaves the rest of the worklist untouched.
pub async fn run<C, P>(
    client: &C,
    preview: &P,
    repo: &Repo,
    config: &RunConfig,
    cancel: &CancellationToken,
) -> Result<RunReport>
where
    C: GraphClient + Sync,
    P: Preview + Sync,
{
    let mut state = RunState::Idle;
    let result = run_inner(client, preview, repo, config, cancel, &mut state).await;
    match &result {
        Ok(_) => transition(&mut state, RunState::Done),
        Err(_) => transition(&mut state, RunState::Failed),
    }
    result
}

async fn run_inner<C, P>(
    client: &C,
    preview: &P,
    repo: &Repo,
    config: &RunConfig,
    cancel: &CancellationToken,
    state: &mut RunState,
) -> Result<RunReport>
where
    C: GraphClient + Sync,
    P: Preview + Sync,
{
    if config.dry_run {
        info!("Dry run enabled; previews will not mutate anything");
    }

    transition(state, RunState::FetchingOpenPrs);
    debug!("Retrieving all '{}' pull requests for {repo}", config.label);
    let open_prs = fetch_open_prs(client, repo, &config.retry, cancel).await?;

    transition(state, RunState::Filtering);
    let matching = pulls_with_label(&open_prs, &config.label);
    let worklist = pr_numbers(&matching);
    info!(
        "{} of {} open pull requests carry '{}'",
        worklist.len(),
        open_prs.len(),
        config.label
    );

    for (index, &number) in worklist.iter().enumerate() {
        if cancel.is_cancelled() {
            anyhow::bail!("run cancelled before previewing pull request #{number}");
        }
        transition(state, RunState::Dispatching(index));
        debug!("Running preview for pull request #{number}");
        preview
            .preview(number, config)
            .await
            .with_context(|| format!("preview failed for pull request #{number}"))?;
    }

    Ok(RunReport {
        open_prs: open_prs.len(),
        previewed: worklist,
    })
}
