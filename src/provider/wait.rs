//! Polling a remote object until it reaches a target state.

use crate::openstack::ApiError;
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Default create/update/delete timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

const INITIAL_WAIT: Duration = Duration::from_millis(100);
const MAX_WAIT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum WaitError {
    #[error("timeout while waiting for state to become '{target}' (last state: '{last_state}', timeout: {timeout:?})")]
    Timeout {
        target: String,
        last_state: String,
        timeout: Duration,
    },

    #[error("unexpected state '{state}', wanted target '{target}'")]
    UnexpectedState { state: String, target: String },

    #[error(transparent)]
    Refresh(#[from] ApiError),
}

/// Waits for a refresh function to report one of `target`.
#[derive(Debug, Clone)]
pub struct StateChangeConf {
    pub pending: Vec<&'static str>,
    pub target: Vec<&'static str>,
    pub timeout: Duration,
    /// Wait before the first refresh.
    pub delay: Duration,
    /// Lower bound between refreshes.
    pub min_timeout: Duration,
}

struct Targets<'a>(&'a [&'static str]);

impl fmt::Display for Targets<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

impl StateChangeConf {
    /// Poll `refresh` until its state is a target; returns the last object seen.
    ///
    /// `refresh` yields the object (if any) and its state name. A state that
    /// is neither pending nor target ends the wait with an error.
    pub async fn wait_for_state<T, F, Fut>(&self, mut refresh: F) -> Result<Option<T>, WaitError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(Option<T>, String), ApiError>>,
    {
        let start = Instant::now();
        let mut wait = INITIAL_WAIT;
        let mut last_state = String::new();
        let mut attempts = 0u32;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        loop {
            attempts += 1;
            let (object, state) = refresh().await?;
            log::debug!("refresh #{attempts}: state '{state}'");

            if self.target.contains(&state.as_str()) {
                return Ok(object);
            }
            if !self.pending.contains(&state.as_str()) {
                return Err(WaitError::UnexpectedState {
                    state,
                    target: Targets(&self.target).to_string(),
                });
            }
            last_state = state;

            let pause = wait.max(self.min_timeout);
            if start.elapsed() + pause > self.timeout {
                return Err(WaitError::Timeout {
                    target: Targets(&self.target).to_string(),
                    last_state,
                    timeout: self.timeout,
                });
            }
            tokio::time::sleep(pause).await;
            wait = (wait * 2).min(MAX_WAIT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn quick(pending: Vec<&'static str>, target: Vec<&'static str>) -> StateChangeConf {
        StateChangeConf {
            pending,
            target,
            timeout: Duration::from_secs(5),
            delay: Duration::ZERO,
            min_timeout: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_wait_reaches_target() {
        let counter = Arc::new(AtomicU32::new(0));
        let conf = quick(vec!["PENDING"], vec!["ACTIVE"]);
        let result = conf
            .wait_for_state(|| {
                let c = counter.clone();
                async move {
                    let n = c.fetch_add(1, Ordering::SeqCst);
                    let state = if n >= 2 { "ACTIVE" } else { "PENDING" };
                    Ok((Some(n), state.to_string()))
                }
            })
            .await
            .expect("wait");
        assert_eq!(result, Some(2));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_wait_unexpected_state() {
        let conf = quick(vec!["PENDING"], vec!["ACTIVE"]);
        let err = conf
            .wait_for_state(|| async { Ok((None::<()>, "ERROR".to_string())) })
            .await
            .expect_err("unexpected");
        assert!(matches!(err, WaitError::UnexpectedState { .. }));
    }

    #[tokio::test]
    async fn test_wait_timeout() {
        let mut conf = quick(vec!["ACTIVE"], vec!["DELETED"]);
        conf.timeout = Duration::from_millis(250);
        let err = conf
            .wait_for_state(|| async { Ok((Some(()), "ACTIVE".to_string())) })
            .await
            .expect_err("timeout");
        assert!(err
            .to_string()
            .starts_with("timeout while waiting for state to become 'DELETED' (last state: 'ACTIVE'"));
    }

    #[tokio::test]
    async fn test_wait_refresh_error() {
        let conf = quick(vec![], vec!["ACTIVE"]);
        let err = conf
            .wait_for_state(|| async {
                Err::<(Option<()>, String), _>(ApiError::Pagination("x".to_string()))
            })
            .await
            .expect_err("refresh error");
        assert!(matches!(err, WaitError::Refresh(_)));
    }
}
