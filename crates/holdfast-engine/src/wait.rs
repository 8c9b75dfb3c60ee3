//! Wait Coordinator.
//!
//! The only way the engine synchronizes with asynchronous rendering:
//! evaluate a probe against the live DOM, sleep the poll interval, repeat
//! until the probe yields a value or the deadline passes.

use crate::backend::Driver;
use crate::error::InteractionError;
use crate::locator::{Cardinality, LocatorResolver, LocatorStrategy, Requirement, Resolved};
use async_trait::async_trait;
use holdfast_common::protocol::ElementHandle;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::debug;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);
/// Lower bound on the poll interval; a zero interval would busy-spin.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);
/// Upper bound for fixed settle delays.
pub const MAX_SETTLE: Duration = Duration::from_secs(1);

/// Deadline and poll interval for one wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitCondition {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitCondition {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl WaitCondition {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    pub fn from_millis(timeout_ms: u64, poll_interval_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(timeout_ms),
            Duration::from_millis(poll_interval_ms),
        )
    }

    /// Same poll interval, different deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    fn effective_poll_interval(&self) -> Duration {
        self.poll_interval.max(MIN_POLL_INTERVAL)
    }
}

/// A predicate over the live DOM.
///
/// `Ok(None)` means "not yet". A stale error is treated the same way, since
/// the next poll re-resolves from scratch.
#[async_trait]
pub trait Probe: Send + Sync {
    type Output: Send;

    async fn poll(&self, driver: &mut dyn Driver)
    -> Result<Option<Self::Output>, InteractionError>;

    /// Human-readable condition, used in `Timeout` reasons.
    fn describe(&self) -> String;
}

/// Poll `probe` until it yields a value or `wait.timeout` elapses.
///
/// The probe is always evaluated at least once, and a `Timeout` is never
/// reported before the deadline.
pub async fn await_condition<P: Probe + ?Sized>(
    driver: &mut dyn Driver,
    probe: &P,
    wait: &WaitCondition,
) -> Result<P::Output, InteractionError> {
    let start = Instant::now();
    let deadline = start + wait.timeout;
    let interval = wait.effective_poll_interval();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        match probe.poll(driver).await {
            Ok(Some(value)) => {
                debug!(
                    "Condition '{}' satisfied after {} poll(s)",
                    probe.describe(),
                    attempts
                );
                return Ok(value);
            }
            Ok(None) => {}
            Err(e) if e.is_stale() => {
                debug!("Stale reference while polling '{}'", probe.describe());
            }
            Err(e) => return Err(e),
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(InteractionError::Timeout {
                condition: probe.describe(),
                waited_ms: (now - start).as_millis() as u64,
            });
        }
        sleep(interval.min(deadline - now)).await;
    }
}

/// Fixed delay for transitions the DOM does not expose (menu animations).
/// Clamped to `MAX_SETTLE`; never the sole synchronization for a state change.
pub async fn settle(delay: Duration) {
    let delay = delay.min(MAX_SETTLE);
    debug!("Settling for {} ms", delay.as_millis());
    sleep(delay).await;
}

/// Waits until a strategy resolves.
#[derive(Debug, Clone)]
pub struct Located {
    pub strategy: LocatorStrategy,
    pub cardinality: Cardinality,
    pub requirement: Requirement,
    pub scope: Option<ElementHandle>,
}

impl Located {
    pub fn present(strategy: &LocatorStrategy) -> Self {
        Self {
            strategy: strategy.clone(),
            cardinality: Cardinality::One,
            requirement: Requirement::Present,
            scope: None,
        }
    }

    pub fn clickable(strategy: &LocatorStrategy) -> Self {
        Self {
            requirement: Requirement::Interactable,
            ..Self::present(strategy)
        }
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    pub fn within(mut self, scope: &ElementHandle) -> Self {
        self.scope = Some(scope.clone());
        self
    }
}

#[async_trait]
impl Probe for Located {
    type Output = Resolved;

    async fn poll(&self, driver: &mut dyn Driver) -> Result<Option<Resolved>, InteractionError> {
        LocatorResolver::try_resolve(
            driver,
            &self.strategy,
            self.cardinality,
            self.requirement,
            self.scope.as_ref(),
        )
        .await
    }

    fn describe(&self) -> String {
        let kind = match self.requirement {
            Requirement::Present => "present",
            Requirement::Interactable => "clickable",
        };
        format!("'{}' to be {}", self.strategy.target, kind)
    }
}

/// Waits until no query of a strategy matches anything.
pub struct Absent {
    pub strategy: LocatorStrategy,
    pub scope: Option<ElementHandle>,
}

impl Absent {
    pub fn new(strategy: &LocatorStrategy) -> Self {
        Self {
            strategy: strategy.clone(),
            scope: None,
        }
    }
}

#[async_trait]
impl Probe for Absent {
    type Output = ();

    async fn poll(&self, driver: &mut dyn Driver) -> Result<Option<()>, InteractionError> {
        let found = LocatorResolver::try_resolve(
            driver,
            &self.strategy,
            Cardinality::All,
            Requirement::Present,
            self.scope.as_ref(),
        )
        .await?;
        Ok(found.is_none().then_some(()))
    }

    fn describe(&self) -> String {
        format!("'{}' to be absent", self.strategy.target)
    }
}

/// Waits until the text of a target differs from a known value, e.g. a
/// toggle flipping between "Like" and "Unlike". Re-resolves on every poll.
pub struct TextChanges {
    pub strategy: LocatorStrategy,
    pub scope: Option<ElementHandle>,
    pub from: String,
}

#[async_trait]
impl Probe for TextChanges {
    type Output = String;

    async fn poll(&self, driver: &mut dyn Driver) -> Result<Option<String>, InteractionError> {
        let Some(resolved) = LocatorResolver::try_resolve(
            driver,
            &self.strategy,
            Cardinality::One,
            Requirement::Present,
            self.scope.as_ref(),
        )
        .await?
        else {
            return Ok(None);
        };
        let text = driver
            .text(resolved.first())
            .await
            .map_err(|e| InteractionError::from_driver(&self.strategy.target, e))?;
        let text = text.trim();
        Ok((text != self.from.trim()).then(|| text.to_string()))
    }

    fn describe(&self) -> String {
        format!("'{}' to change from '{}'", self.strategy.target, self.from)
    }
}

/// Waits until a strategy matches exactly `expected` elements (zero included).
pub struct CountEquals {
    pub strategy: LocatorStrategy,
    pub expected: usize,
}

#[async_trait]
impl Probe for CountEquals {
    type Output = ();

    async fn poll(&self, driver: &mut dyn Driver) -> Result<Option<()>, InteractionError> {
        let count = LocatorResolver::try_resolve(
            driver,
            &self.strategy,
            Cardinality::All,
            Requirement::Present,
            None,
        )
        .await?
        .map_or(0, |r| r.handles.len());
        Ok((count == self.expected).then_some(()))
    }

    fn describe(&self) -> String {
        format!("{} match(es) of '{}'", self.expected, self.strategy.target)
    }
}

/// Waits for a downloaded file to land on disk.
///
/// A browser writes partial downloads under a temporary suffix; the file
/// counts only once the final name exists.
pub struct FileAppears {
    pub path: PathBuf,
}

#[async_trait]
impl Probe for FileAppears {
    type Output = PathBuf;

    async fn poll(&self, _driver: &mut dyn Driver) -> Result<Option<PathBuf>, InteractionError> {
        match tokio::fs::try_exists(&self.path).await {
            Ok(true) => Ok(Some(self.path.clone())),
            Ok(false) => Ok(None),
            Err(e) => Err(InteractionError::Driver(e.into())),
        }
    }

    fn describe(&self) -> String {
        format!("file {} to appear", self.path.display())
    }
}

/// Waits until the page source contains a string.
pub struct PageContains {
    pub text: String,
}

#[async_trait]
impl Probe for PageContains {
    type Output = ();

    async fn poll(&self, driver: &mut dyn Driver) -> Result<Option<()>, InteractionError> {
        let source = driver.current_page_source().await?;
        Ok(source.contains(&self.text).then_some(()))
    }

    fn describe(&self) -> String {
        format!("page to contain '{}'", self.text)
    }
}
