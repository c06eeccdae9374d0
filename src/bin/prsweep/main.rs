use std::process::ExitCode;

use anyhow::Result;
use prsweep::{
    CommandPreview, GitHub, Repo, RunReport, get_github_token, parse_args, resolve_repo, run,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Progress lines go to stderr; `RUST_LOG` overrides the `info` default.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; stopping at the next boundary");
            token.cancel();
        }
    });
    cancel
}

async fn sweep() -> Result<(Repo, RunReport)> {
    let config = match parse_args(std::env::args_os(), env_lookup) {
        Ok(config) => config,
        // Help, version and usage errors print themselves and exit.
        Err(err) => match err.downcast::<clap::Error>() {
            Ok(clap_err) => clap_err.exit(),
            Err(err) => return Err(err),
        },
    };

    let token = get_github_token()?;
    let repo = resolve_repo(env_lookup)?;
    let client = GitHub::new(token, &config.api_url)?;
    let cancel = cancel_on_ctrl_c();

    let report = run(&client, &CommandPreview, &repo, &config, &cancel).await?;
    Ok((repo, report))
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match sweep().await {
        Ok((repo, report)) => {
            info!(
                "Previewed {} of {} open pull requests in {repo}",
                report.previewed.len(),
                report.open_prs
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
