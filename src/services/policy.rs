use std::future::Future;
use std::time::Duration;

use crate::services::repository::RepositoryError;

/// Timeout and retry bounds applied to every data-access call
#[derive(Debug, Clone, Copy)]
pub struct RequestPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_backoff: Duration::from_millis(250),
        }
    }
}

impl RequestPolicy {
    /// Policy with a timeout and no retries
    pub fn no_retry(timeout: Duration) -> Self {
        Self {
            timeout,
            max_retries: 0,
            retry_backoff: Duration::ZERO,
        }
    }

    /// Delay before the given retry, saturating instead of overflowing
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.retry_backoff.saturating_mul(attempt)
    }

    /// Run `op` under the timeout, retrying transient failures
    ///
    /// Each attempt gets the full timeout. Backoff grows linearly with the
    /// attempt number.
    pub async fn run<T, F, Fut>(&self, name: &str, mut op: F) -> Result<T, RepositoryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RepositoryError>>,
    {
        let mut attempt: u32 = 0;

        loop {
            let result = match tokio::time::timeout(self.timeout, op()).await {
                Ok(result) => result,
                Err(_) => Err(RepositoryError::Timeout(self.timeout.as_millis() as u64)),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "{} failed ({}), retrying ({}/{})",
                        name,
                        e,
                        attempt,
                        self.max_retries
                    );
                    tokio::time::sleep(self.backoff_for(attempt)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
