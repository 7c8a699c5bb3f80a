use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use backon::{ExponentialBuilder, Retryable};
use tracing::warn;

use crate::llm::{GeneratorError, is_transient_status};

const DEFAULT_NUM_RETRIES: usize = 2;
const DEFAULT_BASE_DELAY_MS: u64 = 500;
const DEFAULT_MAX_DELAY_SECS: u64 = 5;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Backoff and timeout policy for outbound generator calls
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub num_retries: usize,
    /// Delay before the first retry; doubles on each further retry
    pub base_delay_ms: u64,
    /// Upper bound on any single delay
    pub max_delay_secs: u64,
    /// Upper bound on a single attempt
    pub request_timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            num_retries: DEFAULT_NUM_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_secs: DEFAULT_MAX_DELAY_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl RetryConfig {
    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_jitter()
            .with_min_delay(Duration::from_millis(self.base_delay_ms))
            .with_max_delay(Duration::from_secs(self.max_delay_secs))
            .with_max_times(self.num_retries)
    }
}

/// Run `operation` with a per-attempt timeout, retrying transient failures
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, label: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let secs = config.request_timeout_secs;
    let timeout = Duration::from_secs(secs);

    (|| {
        let attempt = operation();
        async move {
            tokio::time::timeout(timeout, attempt)
                .await
                .map_err(|_| GeneratorError::Timeout { secs })?
        }
    })
    .retry(config.backoff())
    .notify(|err: &anyhow::Error, dur: Duration| {
        warn!(
            "{}: retrying in {}ms after error: {:#}",
            label,
            dur.as_millis(),
            err
        );
    })
    .when(is_retryable_error)
    .await
}

/// Transient failures worth another attempt
///
/// Decided from typed causes only: HTTP status, timeouts and connect errors.
/// Reply parsing failures and anything untyped are permanent.
pub fn is_retryable_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        if let Some(e) = cause.downcast_ref::<GeneratorError>() {
            return e.is_transient();
        }
        if let Some(e) = cause.downcast_ref::<reqwest::Error>() {
            return e.is_timeout() || e.is_connect() || e.status().is_some_and(is_transient_status);
        }
        false
    })
}
