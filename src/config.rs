use std::time::Duration;

use anyhow::{Context, Result};
use reqwest_retry::policies::ExponentialBackoff;

/// When true, previews run without mutating anything.
pub const DRY_RUN: bool = true;

/// Label carried by theme pull requests.
pub const THEME_LABEL: &str = "themes";

pub const DEFAULT_API_URL: &str = "https://api.github.com";

pub const PREVIEW_COMMAND_VAR: &str = "PREVIEW_COMMAND";
pub const API_URL_VAR: &str = "GITHUB_API_URL";

/// Bounds for retrying rate-limited page requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub min_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryConfig {
    /// Disables retries entirely; the first rate-limit error is returned.
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            min_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    pub fn policy(&self) -> ExponentialBackoff {
        ExponentialBackoff::builder()
            .retry_bounds(self.min_backoff, self.max_backoff)
            .build_with_max_retries(self.max_retries)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
        }
    }
}

/// Settings for one sweep, passed explicitly to every stage that needs
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub dry_run: bool,
    pub label: String,
    /// Program and leading arguments; the pull request number is appended.
    pub preview_command: Vec<String>,
    pub api_url: String,
    pub retry: RetryConfig,
}

impl RunConfig {
    pub fn new(preview_command: Vec<String>) -> Self {
        Self {
            dry_run: DRY_RUN,
            label: THEME_LABEL.to_string(),
            preview_command,
            api_url: DEFAULT_API_URL.to_string(),
            retry: RetryConfig::default(),
        }
    }

    /// Builds the configuration from a variable lookup; the binary passes
    /// one backed by `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let command = lookup(PREVIEW_COMMAND_VAR)
            .filter(|c| !c.trim().is_empty())
            .with_context(|| format!("{PREVIEW_COMMAND_VAR} must name the preview command"))?;
        let preview_command = command.split_whitespace().map(str::to_string).collect();

        let mut config = Self::new(preview_command);
        if let Some(api_url) = lookup(API_URL_VAR).filter(|u| !u.trim().is_empty()) {
            config.api_url = api_url.trim_end_matches('/').to_string();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_uses_build_time_defaults() {
        let config =
            RunConfig::from_lookup(lookup_from(&[("PREVIEW_COMMAND", "node preview.js")]))
                .unwrap();
        assert_eq!(config.dry_run, DRY_RUN);
        assert_eq!(config.label, "themes");
        assert_eq!(config.preview_command, vec!["node", "preview.js"]);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.retry, RetryConfig::default());
    }

    #[test]
    fn test_from_lookup_requires_preview_command() {
        let err = RunConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("PREVIEW_COMMAND"));

        let blank = RunConfig::from_lookup(lookup_from(&[("PREVIEW_COMMAND", "   ")]));
        assert!(blank.is_err());
    }

    #[test]
    fn test_from_lookup_reads_api_url() {
        let config = RunConfig::from_lookup(lookup_from(&[
            ("PREVIEW_COMMAND", "preview"),
            ("GITHUB_API_URL", "https://ghe.example.com/api/"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://ghe.example.com/api");
    }
}
