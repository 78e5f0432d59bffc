//! Poll a probe until it finds something or the time budget runs out

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

/// Default time budget for cards to appear
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default delay between probes
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;

/// Timing of one wait
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitConfig {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        WaitConfig {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

/// How a wait ended
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome<T> {
    Found(T),
    NotFound,
}

/// Result of a wait plus its bookkeeping
#[derive(Debug, Clone)]
pub struct WaitResult<T> {
    pub outcome: WaitOutcome<T>,
    pub elapsed: Duration,
    pub probes: u32,
}

/// Transient state of one locate-or-timeout cycle
#[derive(Debug)]
pub struct WaitState {
    started: Instant,
    config: WaitConfig,
    probes: u32,
    resolved: bool,
}

impl WaitState {
    pub fn new(config: WaitConfig) -> Self {
        WaitState {
            started: Instant::now(),
            config,
            probes: 0,
            resolved: false,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn remaining(&self) -> Duration {
        self.config.timeout.saturating_sub(self.elapsed())
    }

    /// Sleep before the next probe, never past the deadline
    fn next_delay(&self) -> Duration {
        self.config.poll_interval.min(self.remaining())
    }

    fn expired(&self) -> bool {
        self.elapsed() >= self.config.timeout
    }

    fn resolve<T>(&mut self, outcome: WaitOutcome<T>) -> WaitResult<T> {
        debug_assert!(!self.resolved, "wait resolved twice");
        self.resolved = true;
        WaitResult {
            outcome,
            elapsed: self.elapsed(),
            probes: self.probes,
        }
    }
}

/// Probe immediately, then every poll interval until `probe` yields a value
///
/// `probe` returns `Ok(None)` for "nothing yet". The first `Some` ends the
/// wait and no further probe runs. A timeout resolves with
/// [`WaitOutcome::NotFound`] between `timeout` and `timeout + poll_interval`
/// after the start. Probe errors end the wait immediately.
pub async fn wait_for<T, E, F, Fut>(config: WaitConfig, mut probe: F) -> Result<WaitResult<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let mut state = WaitState::new(config);

    loop {
        state.probes += 1;
        if let Some(found) = probe().await? {
            debug!(
                "Probe {} succeeded after {:?}",
                state.probes,
                state.elapsed()
            );
            return Ok(state.resolve(WaitOutcome::Found(found)));
        }

        if state.expired() {
            warn!(
                "Nothing found within {:?} ({} probes)",
                config.timeout, state.probes
            );
            return Ok(state.resolve(WaitOutcome::NotFound));
        }

        sleep(state.next_delay()).await;
    }
}

#[cfg(test)]
#[path = "wait_test.rs"]
mod wait_test;
