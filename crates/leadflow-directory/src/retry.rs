// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local retry budget for owner lookups.
//!
//! Permanent failures return immediately. Transient and unknown failures are
//! retried after a short jittered sleep until the budget runs out, then the
//! last error is returned so the caller can hand the message back to the
//! queue for a longer-horizon redelivery.

use std::time::Duration;

use async_trait::async_trait;
use leadflow_core::{
    AdapterType, HealthStatus, LeadflowError, LookupError, OwnerDirectory, OwnerRecord,
    PluginAdapter, classify,
};
use rand::Rng;
use tracing::{debug, warn};

/// Retry budget and backoff window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first; the directory is called at most
    /// `retry_transient + 1` times.
    pub retry_transient: u32,
    /// Fixed part of the sleep between attempts.
    pub backoff_base: Duration,
    /// Upper bound (exclusive) of the random part of the sleep.
    pub backoff_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_transient: 2,
            backoff_base: Duration::from_millis(400),
            backoff_jitter: Duration::from_millis(400),
        }
    }
}

impl RetryPolicy {
    /// Picks the sleep before the next attempt: `base + uniform(0..jitter)`.
    pub fn backoff(&self) -> Duration {
        let jitter_ms = u64::try_from(self.backoff_jitter.as_millis()).unwrap_or(u64::MAX);
        let extra = if jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..jitter_ms)
        };
        self.backoff_base + Duration::from_millis(extra)
    }
}

/// Wraps an [`OwnerDirectory`] with the retry policy.
#[derive(Debug)]
pub struct RetryingDirectory<D> {
    inner: D,
    policy: RetryPolicy,
}

impl<D: OwnerDirectory> RetryingDirectory<D> {
    pub fn new(inner: D, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }
}

#[async_trait]
impl<D: OwnerDirectory> PluginAdapter for RetryingDirectory<D> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Directory
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadflowError> {
        self.inner.health_check().await
    }
}

#[async_trait]
impl<D: OwnerDirectory> OwnerDirectory for RetryingDirectory<D> {
    async fn lookup(&self, lead_id: &str) -> Result<OwnerRecord, LookupError> {
        let mut last_error = None;

        for attempt in 0..=self.policy.retry_transient {
            if attempt > 0 {
                let delay = self.policy.backoff();
                warn!(lead_id, attempt, delay_ms = delay.as_millis() as u64, "retrying owner lookup");
                tokio::time::sleep(delay).await;
            }

            match self.inner.lookup(lead_id).await {
                Ok(record) => return Ok(record),
                Err(err) => {
                    let class = classify(&err);
                    debug!(lead_id, attempt, %class, error = %err, "owner lookup failed");
                    if !class.is_retryable() {
                        return Err(err);
                    }
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| LookupError::Other {
            message: "retry loop made no attempts".into(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    /// Replays scripted results, then keeps returning the fallback.
    struct Scripted {
        results: Mutex<VecDeque<Result<OwnerRecord, LookupError>>>,
        fallback: LookupError,
        calls: AtomicU32,
    }

    impl Scripted {
        fn new(results: Vec<Result<OwnerRecord, LookupError>>, fallback: LookupError) -> Self {
            Self {
                results: Mutex::new(results.into()),
                fallback,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PluginAdapter for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::Directory
        }
        async fn health_check(&self) -> Result<HealthStatus, LeadflowError> {
            Ok(HealthStatus::Healthy)
        }
    }

    #[async_trait]
    impl OwnerDirectory for Scripted {
        async fn lookup(&self, _lead_id: &str) -> Result<OwnerRecord, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.results.lock().unwrap().pop_front();
            next.unwrap_or_else(|| Err(self.fallback.clone()))
        }
    }

    fn timeout() -> LookupError {
        LookupError::Timeout {
            after: Duration::from_secs(5),
        }
    }

    fn status(code: u16) -> LookupError {
        LookupError::Status {
            status: code,
            body: String::new(),
        }
    }

    fn retrying(inner: Scripted, retry_transient: u32) -> RetryingDirectory<Scripted> {
        RetryingDirectory::new(
            inner,
            RetryPolicy {
                retry_transient,
                ..RetryPolicy::default()
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_use_whole_budget() {
        for budget in [0, 1, 2, 5] {
            let dir = retrying(Scripted::new(vec![], timeout()), budget);
            let err = dir.lookup("L1").await.expect_err("always times out");
            assert!(matches!(err, LookupError::Timeout { .. }));
            assert_eq!(dir.inner().calls(), budget + 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_failure_is_not_retried() {
        let dir = retrying(Scripted::new(vec![Err(status(404))], timeout()), 2);
        let err = dir.lookup("L1").await.expect_err("404");
        assert!(matches!(err, LookupError::Status { status: 404, .. }));
        assert_eq!(dir.inner().calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_failures_are_retried() {
        let decode = LookupError::Decode {
            message: "bad json".into(),
        };
        let dir = retrying(Scripted::new(vec![], decode), 2);
        let err = dir.lookup("L1").await.expect_err("always undecodable");
        assert!(matches!(err, LookupError::Decode { .. }));
        assert_eq!(dir.inner().calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_transient_failure() {
        let record = OwnerRecord {
            owner: Some("alice".into()),
            ..OwnerRecord::default()
        };
        let dir = retrying(
            Scripted::new(vec![Err(status(503)), Ok(record.clone())], timeout()),
            2,
        );
        assert_eq!(dir.lookup("L1").await.expect("second attempt"), record);
        assert_eq!(dir.inner().calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn last_error_is_returned() {
        let dir = retrying(
            Scripted::new(vec![Err(status(500)), Err(status(502))], status(503)),
            2,
        );
        let err = dir.lookup("L1").await.expect_err("exhausted");
        assert!(matches!(err, LookupError::Status { status: 503, .. }));
    }

    #[test]
    fn backoff_stays_in_window() {
        let policy = RetryPolicy::default();
        for _ in 0..100 {
            let delay = policy.backoff();
            assert!(delay >= Duration::from_millis(400));
            assert!(delay < Duration::from_millis(800));
        }
        let fixed = RetryPolicy {
            backoff_jitter: Duration::ZERO,
            ..policy
        };
        assert_eq!(fixed.backoff(), Duration::from_millis(400));
    }
}
