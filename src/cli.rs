use anyhow::Result;
use clap::Parser;

use crate::config::RunConfig;

/// The sweep takes no flags; clap only provides `--help` and `--version`.
#[derive(Parser, Debug)]
#[command(name = "prsweep")]
#[command(version)]
#[command(
    about = "Runs the theme preview for every open pull request labelled 'themes'",
    long_about = "Runs the theme preview for every open pull request labelled 'themes'.\n\n\
        Environment:\n  \
        PREVIEW_COMMAND    command run once per pull request, number appended\n  \
        GITHUB_REPOSITORY  target repository as owner/repo\n  \
        GITHUB_TOKEN       token (falls back to GH_TOKEN, then 'gh auth token')\n  \
        GITHUB_API_URL     API base URL (default https://api.github.com)"
)]
struct CliArgs {}

/// Validates the command line, then loads the run configuration through
/// `lookup`.
pub fn parse_args<I, T, F>(args: I, lookup: F) -> Result<RunConfig>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    F: Fn(&str) -> Option<String>,
{
    CliArgs::try_parse_from(args)?;
    RunConfig::from_lookup(lookup)
}
