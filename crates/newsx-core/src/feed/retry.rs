//! Retry policy and cancellation for feed loads
//!
//! A load is retried as a whole (fetch plus normalize) when it fails with a
//! transient error. Delays grow linearly and every wait races against the
//! load's cancel token, so a superseded load stops at the next await point.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;

use crate::config::FetchConfig;
use crate::{Error, Result};

/// Bounded retry with linearly increasing delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first
    pub max_retries: u32,
    /// Delay before retry n is `base_delay * n`
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
        }
    }

    /// Total attempts including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Delay before retry number `retry` (1-based)
    ///
    /// With the default policy: 1s, 2s
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay * retry
    }
}

/// Signals cancellation of one load and everything it is waiting on
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

/// Owning side of a [`CancelToken`]
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn new() -> (Self, CancelToken) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, CancelToken { rx })
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl CancelToken {
    /// A token that is never cancelled
    pub fn never() -> Self {
        let (handle, token) = CancelHandle::new();
        // Dropping the sender leaves the value at false forever
        drop(handle);
        token
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled; pends forever if the handle is dropped uncancelled
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Run `fut` unless cancelled first
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(Error::Cancelled),
            result = fut => result,
        }
    }

    /// Sleep for `delay` unless cancelled first
    pub async fn sleep(&self, delay: Duration) -> Result<()> {
        self.run(async {
            tokio::time::sleep(delay).await;
            Ok(())
        })
        .await
    }
}

/// Execute `operation` under `policy`, retrying transient errors
///
/// Non-transient errors (including `Cancelled`) surface immediately; after the
/// last attempt the final error is returned.
pub async fn retry_with_policy<F, Fut, T>(
    policy: RetryPolicy,
    cancel: &CancelToken,
    operation: F,
) -> Result<T>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1;
    loop {
        match cancel.run(operation(attempt)).await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_transient() && attempt < policy.max_attempts() => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = policy.max_attempts(),
                    delay_ms = delay.as_millis() as u64,
                    "Load attempt failed, retrying"
                );
                cancel.sleep(delay).await?;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
