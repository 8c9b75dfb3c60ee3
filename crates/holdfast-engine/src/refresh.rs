//! Refresh Detector.
//!
//! Confirms that a list re-rendered by watching a previously captured
//! element disappear, instead of matching the new content by text.

use crate::backend::Driver;
use crate::error::InteractionError;
use crate::locator::{Cardinality, LocatorResolver, LocatorStrategy, Requirement};
use crate::wait::{Probe, WaitCondition, await_condition};
use async_trait::async_trait;
use holdfast_common::protocol::ElementHandle;
use tracing::debug;

/// A handle captured ahead of a state-changing action.
///
/// `RefreshDetector::await_invalidated` takes it by value: once the refresh
/// signal has been observed (or given up on), the handle is gone and the
/// target has to be re-resolved.
#[derive(Debug)]
pub struct Captured {
    target: String,
    handle: ElementHandle,
}

impl Captured {
    /// Wrap a handle obtained elsewhere, e.g. the card a workflow is about to delete.
    pub fn new(target: impl Into<String>, handle: ElementHandle) -> Self {
        Self {
            target: target.into(),
            handle,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn handle(&self) -> &ElementHandle {
        &self.handle
    }
}

pub struct RefreshDetector;

impl RefreshDetector {
    /// Capture the first element currently matching `strategy`.
    ///
    /// `Ok(None)` when nothing matches yet (an empty feed); there is then no
    /// refresh signal to wait for.
    pub async fn capture(
        driver: &mut dyn Driver,
        strategy: &LocatorStrategy,
    ) -> Result<Option<Captured>, InteractionError> {
        let resolved = LocatorResolver::try_resolve(
            driver,
            strategy,
            Cardinality::FirstOfMany,
            Requirement::Present,
            None,
        )
        .await?;

        Ok(resolved.map(|r| {
            let handle = r.into_first();
            debug!("Captured {} for '{}'", handle, strategy.target);
            Captured::new(strategy.target.clone(), handle)
        }))
    }

    /// Wait until the captured node is removed or replaced.
    pub async fn await_invalidated(
        driver: &mut dyn Driver,
        captured: Captured,
        wait: &WaitCondition,
    ) -> Result<(), InteractionError> {
        let probe = Invalidated { captured };
        await_condition(driver, &probe, wait).await
    }
}

struct Invalidated {
    captured: Captured,
}

#[async_trait]
impl Probe for Invalidated {
    type Output = ();

    async fn poll(&self, driver: &mut dyn Driver) -> Result<Option<()>, InteractionError> {
        match driver.is_present(&self.captured.handle).await {
            Ok(true) => Ok(None),
            Ok(false) => Ok(Some(())),
            Err(e) if e.is_stale() => Ok(Some(())),
            Err(e) => Err(InteractionError::Driver(e)),
        }
    }

    fn describe(&self) -> String {
        format!(
            "{} ('{}') to be invalidated",
            self.captured.handle, self.captured.target
        )
    }
}
