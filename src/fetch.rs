//! The sole network primitive: a GET with bounded retry and doubling backoff.
//!
//! Deliberately minimal — no jitter, no circuit breaker, no rate limiting.

use crate::config::RetryPolicy;
use crate::{Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

/// Runs `op` up to `max_retries + 1` times, sleeping
/// `initial_delay_ms * 2^attempt` between failed attempts. The final error is
/// surfaced to the caller once the budget is exhausted.
pub(crate) async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt >= policy.max_retries {
                    return Err(e);
                }
                // Shift capped so a large retry budget cannot overflow the delay.
                let delay_ms = policy
                    .initial_delay_ms
                    .saturating_mul(1u64 << attempt.min(16));
                if delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                attempt += 1;
            }
        }
    }
}

#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    retry: RetryPolicy,
}

impl Fetcher {
    pub fn new(retry: RetryPolicy) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .expect("reqwest client");
        Self { client, retry }
    }

    /// GET `url` and decode the JSON body. Any non-2xx status is a failure and
    /// consumes retry budget like a transport error.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        with_retry(&self.retry, || {
            let client = self.client.clone();
            let url = url.to_string();
            async move {
                let resp = client
                    .get(&url)
                    .send()
                    .await
                    .map_err(Error::backend_reqwest)?;
                let resp = resp.error_for_status().map_err(Error::backend_reqwest)?;
                resp.json::<T>().await.map_err(Error::backend_reqwest)
            }
        })
        .await
    }

    /// Single-attempt GET used by the availability probe; never retried.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_once(&self, url: &str) -> Result<()> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(Error::backend_reqwest)?;
        resp.error_for_status().map_err(Error::backend_reqwest)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn succeeds_on_first_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::immediate(3);
        let out = with_retry(&policy, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Error>(42)
            }
        })
        .await
        .unwrap();
        assert_eq!(out, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_failures_within_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::immediate(3);
        let out = with_retry(&policy, || {
            let calls = calls.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(Error::BackendMessage("transient".to_string()))
                } else {
                    Ok("ok")
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(out, "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn surfaces_failure_after_budget_exhaustion() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::immediate(2);
        let err = with_retry(&policy, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(Error::BackendMessage("down".to_string()))
            }
        })
        .await
        .unwrap_err();
        assert!(matches!(err, Error::BackendMessage(_)));
        // 1 initial attempt + 2 retries.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_retries_means_single_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::immediate(0);
        let _ = with_retry(&policy, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(Error::BackendMessage("down".to_string()))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
