//! Prsweep: run a preview for every open pull request carrying a label.
//!
//! Pages through a repository's open pull requests with the GitHub GraphQL
//! API, keeps those labelled `themes` and invokes an external preview
//! command for each one, strictly in fetch order. A dry-run setting is
//! passed to every preview so it can suppress its side effects.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod github;
pub mod graphql;
pub mod paginate;
pub mod preview;
pub mod select;
pub mod types;

pub use cli::parse_args;
pub use config::{DRY_RUN, RetryConfig, RunConfig, THEME_LABEL};
pub use dispatch::{RunState, run};
pub use error::FetchError;
pub use github::{GitHub, get_github_token, resolve_repo};
pub use paginate::fetch_open_prs;
pub use preview::CommandPreview;
pub use select::{pr_numbers, pulls_with_label};
pub use types::{GraphClient, Page, Preview, PullRequest, Repo, RepoError, RunReport};
