// Copyright 2024-2026 Aldar Deploy Contributors
// SPDX-License-Identifier: Apache-2.0

//! Retry-with-deadline combinator for "wait until the cluster says so".

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

/// How long to wait and how often to look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl WaitPolicy {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            interval: Duration::from_secs(5),
        }
    }
}

/// Outcome of a single status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    Ready(T),
    /// Not there yet; the string describes the current state.
    Pending(String),
}

#[derive(Debug, Error)]
pub enum WaitError<E> {
    #[error("timed out after {}s (last status: {last_status})", .waited.as_secs())]
    TimedOut { waited: Duration, last_status: String },

    #[error(transparent)]
    Check(E),
}

/// Call `check` until it reports ready or `policy.timeout` elapses.
///
/// The first check runs immediately. A check error ends the wait at once.
/// Each check is bounded by the time left, so a check that never resolves
/// still ends the wait at the deadline.
pub async fn wait_until<T, E, F, Fut>(policy: WaitPolicy, mut check: F) -> Result<T, WaitError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Probe<T>, E>>,
{
    let started = Instant::now();
    let deadline = started + policy.timeout;
    let mut attempts: u32 = 0;
    let mut last_status = String::from("no status received");

    loop {
        attempts += 1;
        let remaining = deadline.saturating_duration_since(Instant::now());
        let probe = match tokio::time::timeout(remaining, check()).await {
            Ok(result) => result.map_err(WaitError::Check)?,
            Err(_) => {
                tracing::debug!(attempts, "status check still running at deadline");
                return Err(WaitError::TimedOut {
                    waited: started.elapsed(),
                    last_status,
                });
            }
        };

        match probe {
            Probe::Ready(value) => {
                tracing::debug!(attempts, elapsed_ms = started.elapsed().as_millis() as u64, "ready");
                return Ok(value);
            }
            Probe::Pending(status) => last_status = status,
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(WaitError::TimedOut {
                waited: now - started,
                last_status,
            });
        }

        tracing::trace!(attempts, status = %last_status, "not ready yet");
        tokio::time::sleep(policy.interval.min(deadline - now)).await;
    }
}

#[cfg(test)]
#[path = "poll_tests.rs"]
mod tests;
