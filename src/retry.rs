//! Retry an asynchronous check until it succeeds

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Returned by [`retry`] when every attempt failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{msg}")]
pub struct RetryError {
    msg: String,
}

impl RetryError {
    pub fn new() -> Self {
        Self { msg: String::from("No success here :(") }
    }

    pub fn name(&self) -> &'static str {
        "RetryError"
    }

    pub fn msg(&self) -> &str {
        &self.msg
    }
}

impl Default for RetryError {
    fn default() -> Self {
        Self::new()
    }
}

/// Calls `check` until it returns `true`, at most `max_attempts` times.
///
/// When `delay` is set, the task sleeps that long between two attempts.
pub async fn retry<F, Fut>(mut check: F, delay: Option<Duration>, max_attempts: u32) -> Result<(), RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for attempt in 1..=max_attempts {
        if check().await {
            return Ok(());
        }
        log::trace!("Attempt {}/{} did not succeed", attempt, max_attempts);

        if attempt < max_attempts {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
        }
    }

    Err(RetryError::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn success_after_failure() {
        let count = AtomicU32::new(0);
        let result = retry(|| {
            let n = count.fetch_add(1, Ordering::SeqCst) + 1;
            async move { n > 4 }
        }, None, 5).await;

        assert!(result.is_ok());
        assert_eq!(count.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn all_failure_all_the_time() {
        let count = AtomicU32::new(0);
        let err = retry(|| {
            count.fetch_add(1, Ordering::SeqCst);
            async { false }
        }, Some(Duration::from_millis(1)), 5).await.unwrap_err();

        assert_eq!(err.name(), "RetryError");
        assert_eq!(err.msg(), "No success here :(");
        assert_eq!(count.load(Ordering::SeqCst), 5);
    }
}
