use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Bounded-retry settings for a single request.
///
/// Passed into the fetcher explicitly (never hidden defaults) so tests can run
/// with a zero delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first failed attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before the first retry; doubles on every subsequent one.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
        }
    }
}

impl RetryPolicy {
    /// Policy with no waiting between attempts (unit tests).
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay_ms: 0,
        }
    }
}

/// Configuration for one ingestion source.
///
/// Validated by the hosting collaborator before a run starts; `validate()` is
/// the structural part, `SourceEngine::check()` adds the reachability probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the Docebo instance, without a trailing slash.
    pub base_url: String,
    /// Catalogs to aggregate. An empty list yields an aborted run.
    #[serde(default)]
    pub catalog_ids: Vec<String>,
    /// Page size for the related-courses endpoint.
    #[serde(default = "default_related_links")]
    pub related_links: usize,
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_related_links() -> usize {
    5
}

impl SourceConfig {
    pub fn new(base_url: impl Into<String>, catalog_ids: Vec<String>) -> Result<Self> {
        let config = Self {
            base_url: normalize_base_url(base_url.into()),
            catalog_ids,
            related_links: default_related_links(),
            retry: RetryPolicy::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::InvalidInput(
                "you must provide your Docebo url".to_string(),
            ));
        }
        if self.related_links == 0 {
            return Err(Error::InvalidInput(
                "related_links must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
