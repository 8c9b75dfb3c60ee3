//! Session facade.
//!
//! Bundles the engine components behind the operations a workflow step
//! needs. Every operation takes the `WaitCondition` it runs under; the
//! budgets configured in `WaitsConfig` are only used when a caller asks
//! for them by name (`default_wait`, `refresh_wait`, `confirm_wait`).

use crate::action::{Action, ActionExecutor, OptionChoice};
use crate::backend::Driver;
use crate::config::HoldfastConfig;
use crate::error::InteractionError;
use crate::locator::{Cardinality, LocatorResolver, LocatorStrategy, Requirement, Resolved};
use crate::profile::UiProfile;
use crate::refresh::{Captured, RefreshDetector};
use crate::wait::{Absent, Located, Probe, WaitCondition, await_condition, settle};
use holdfast_common::protocol::{ElementHandle, SpecialKey};
use std::path::Path;
use tracing::{debug, info, warn};

pub struct Session<'a> {
    driver: &'a mut dyn Driver,
    profile: &'a UiProfile,
    config: &'a HoldfastConfig,
    executor: ActionExecutor,
}

impl<'a> Session<'a> {
    pub fn new(driver: &'a mut dyn Driver, profile: &'a UiProfile, config: &'a HoldfastConfig) -> Self {
        Self {
            driver,
            profile,
            config,
            executor: ActionExecutor::new(config.waits.default_wait()),
        }
    }

    pub fn profile(&self) -> &'a UiProfile {
        self.profile
    }

    pub fn config(&self) -> &'a HoldfastConfig {
        self.config
    }

    pub fn driver(&mut self) -> &mut dyn Driver {
        &mut *self.driver
    }

    // Profile shortcuts

    pub fn target(&self, name: &str) -> Result<LocatorStrategy, InteractionError> {
        self.profile.target(name)
    }

    pub fn target_with(
        &self,
        name: &str,
        params: &[(&str, &str)],
    ) -> Result<LocatorStrategy, InteractionError> {
        self.profile.target_with(name, params)
    }

    pub fn labelled(&self, name: &str, label_key: &str) -> Result<LocatorStrategy, InteractionError> {
        self.profile.labelled(name, label_key)
    }

    pub fn label(&self, key: &str) -> Result<&'a str, InteractionError> {
        self.profile.label(key)
    }

    // Budgets

    pub fn default_wait(&self) -> WaitCondition {
        self.config.waits.default_wait()
    }

    pub fn refresh_wait(&self) -> WaitCondition {
        self.config.waits.refresh_wait()
    }

    pub fn confirm_wait(&self) -> WaitCondition {
        self.config.waits.confirm_wait()
    }

    // Navigation

    /// Navigate to an absolute URL, or to a path under the configured base URL.
    pub async fn navigate(&mut self, location: &str) -> Result<(), InteractionError> {
        let url = if location.starts_with('/') {
            format!("{}{}", self.config.target.base_url, location)
        } else {
            location.to_string()
        };
        info!("Navigating to {}", url);
        self.driver.navigate(&url).await?;
        Ok(())
    }

    pub async fn current_url(&mut self) -> Option<String> {
        self.driver.current_url().await.ok()
    }

    pub async fn page_source(&mut self) -> Result<String, InteractionError> {
        Ok(self.driver.current_page_source().await?)
    }

    // Resolution

    /// Wait for the first element of `strategy` to exist.
    pub async fn present(
        &mut self,
        strategy: &LocatorStrategy,
        wait: &WaitCondition,
    ) -> Result<ElementHandle, InteractionError> {
        self.locate(Located::present(strategy), wait)
            .await
            .map(Resolved::into_first)
    }

    /// Like `present`, searching only below `scope`.
    pub async fn present_within(
        &mut self,
        strategy: &LocatorStrategy,
        scope: &ElementHandle,
        wait: &WaitCondition,
    ) -> Result<ElementHandle, InteractionError> {
        self.locate(Located::present(strategy).within(scope), wait)
            .await
            .map(Resolved::into_first)
    }

    /// Wait for an element of `strategy` that is displayed and enabled.
    pub async fn clickable(
        &mut self,
        strategy: &LocatorStrategy,
        wait: &WaitCondition,
    ) -> Result<ElementHandle, InteractionError> {
        self.locate(Located::clickable(strategy), wait)
            .await
            .map(Resolved::into_first)
    }

    /// Wait until at least one element matches, then return all matches of
    /// the winning query.
    pub async fn all_present(
        &mut self,
        strategy: &LocatorStrategy,
        wait: &WaitCondition,
    ) -> Result<Vec<ElementHandle>, InteractionError> {
        self.locate(
            Located::present(strategy).with_cardinality(Cardinality::All),
            wait,
        )
        .await
        .map(|r| r.handles)
    }

    /// Single pass, no waiting. An empty result is not an error.
    pub async fn find_all(
        &mut self,
        strategy: &LocatorStrategy,
        scope: Option<&ElementHandle>,
    ) -> Result<Vec<ElementHandle>, InteractionError> {
        let resolved = LocatorResolver::try_resolve(
            &mut *self.driver,
            strategy,
            Cardinality::All,
            Requirement::Present,
            scope,
        )
        .await?;
        Ok(resolved.map(|r| r.handles).unwrap_or_default())
    }

    /// Wait until nothing matches `strategy`.
    pub async fn absent(
        &mut self,
        strategy: &LocatorStrategy,
        wait: &WaitCondition,
    ) -> Result<(), InteractionError> {
        await_condition(&mut *self.driver, &Absent::new(strategy), wait).await
    }

    /// Run any probe under `wait`.
    pub async fn await_probe<P: Probe>(
        &mut self,
        probe: &P,
        wait: &WaitCondition,
    ) -> Result<P::Output, InteractionError> {
        await_condition(&mut *self.driver, probe, wait).await
    }

    async fn locate(
        &mut self,
        probe: Located,
        wait: &WaitCondition,
    ) -> Result<Resolved, InteractionError> {
        match await_condition(&mut *self.driver, &probe, wait).await {
            Err(InteractionError::Timeout { waited_ms, .. }) => Err(InteractionError::NotFound {
                target: probe.strategy.target.clone(),
                attempted: probe.strategy.describe_queries(),
                waited_ms,
            }),
            other => other,
        }
    }

    // Actions

    pub async fn click(
        &mut self,
        strategy: &LocatorStrategy,
        wait: &WaitCondition,
    ) -> Result<(), InteractionError> {
        self.act(Located::clickable(strategy), &Action::Click, wait)
            .await
    }

    /// Click a handle resolved earlier in the same step.
    pub async fn click_handle(&mut self, handle: &ElementHandle) -> Result<(), InteractionError> {
        self.executor
            .perform(&mut *self.driver, handle, &Action::Click)
            .await
    }

    /// Replace the content of a field.
    pub async fn fill(
        &mut self,
        strategy: &LocatorStrategy,
        text: &str,
        wait: &WaitCondition,
    ) -> Result<(), InteractionError> {
        self.act(
            Located::clickable(strategy),
            &Action::Type(text.to_string()),
            wait,
        )
        .await
    }

    /// `fill` for credentials: the value never reaches the logs.
    pub async fn fill_secret(
        &mut self,
        strategy: &LocatorStrategy,
        secret: &str,
        wait: &WaitCondition,
    ) -> Result<(), InteractionError> {
        self.act(
            Located::clickable(strategy),
            &Action::TypeSecret(secret.to_string()),
            wait,
        )
        .await
    }

    pub async fn fill_handle(
        &mut self,
        handle: &ElementHandle,
        text: &str,
    ) -> Result<(), InteractionError> {
        self.executor
            .perform(&mut *self.driver, handle, &Action::Type(text.to_string()))
            .await
    }

    pub async fn press(
        &mut self,
        strategy: &LocatorStrategy,
        key: SpecialKey,
        wait: &WaitCondition,
    ) -> Result<(), InteractionError> {
        self.act(Located::clickable(strategy), &Action::Press(key), wait)
            .await
    }

    pub async fn select(
        &mut self,
        strategy: &LocatorStrategy,
        choice: OptionChoice,
        wait: &WaitCondition,
    ) -> Result<(), InteractionError> {
        self.act(
            Located::clickable(strategy),
            &Action::SelectOption(choice),
            wait,
        )
        .await
    }

    /// File inputs are usually hidden, so only presence is required.
    pub async fn upload(
        &mut self,
        strategy: &LocatorStrategy,
        path: &Path,
        wait: &WaitCondition,
    ) -> Result<(), InteractionError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(InteractionError::Precondition(format!(
                "fixture {} does not exist",
                path.display()
            )));
        }
        self.act(
            Located::present(strategy),
            &Action::Upload(path.to_path_buf()),
            wait,
        )
        .await
    }

    /// Resolve, act, and re-resolve once if the node went stale in between.
    async fn act(
        &mut self,
        probe: Located,
        action: &Action,
        wait: &WaitCondition,
    ) -> Result<(), InteractionError> {
        let mut retried = false;
        loop {
            let handle = self.locate(probe.clone(), wait).await?.into_first();
            match self
                .executor
                .perform(&mut *self.driver, &handle, action)
                .await
            {
                Err(e) if e.is_stale() && !retried => {
                    debug!(
                        "'{}' went stale during {}; resolving again",
                        probe.strategy.target, action
                    );
                    retried = true;
                }
                other => return other,
            }
        }
    }

    // Reads

    pub async fn text(&mut self, handle: &ElementHandle) -> Result<String, InteractionError> {
        self.driver
            .text(handle)
            .await
            .map_err(|e| InteractionError::from_driver(&handle.to_string(), e))
    }

    /// Current value of a form control; `None` for elements without one.
    pub async fn value(&mut self, handle: &ElementHandle) -> Result<Option<String>, InteractionError> {
        self.driver
            .value(handle)
            .await
            .map_err(|e| InteractionError::from_driver(&handle.to_string(), e))
    }

    pub async fn is_selected(&mut self, handle: &ElementHandle) -> Result<bool, InteractionError> {
        self.driver
            .is_selected(handle)
            .await
            .map_err(|e| InteractionError::from_driver(&handle.to_string(), e))
    }

    /// Inline validation messages currently shown by the page. Empty when
    /// the profile has no `form.validation_error` target or none is shown.
    pub async fn validation_messages(&mut self) -> Vec<String> {
        let Ok(strategy) = self.profile.target("form.validation_error") else {
            return Vec::new();
        };
        let handles = match self.find_all(&strategy, None).await {
            Ok(handles) => handles,
            Err(e) => {
                debug!("Could not read validation messages: {}", e);
                return Vec::new();
            }
        };
        let mut messages = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Ok(text) = self.driver.text(&handle).await {
                let text = text.trim();
                if !text.is_empty() {
                    messages.push(text.to_string());
                }
            }
        }
        messages
    }

    // Refresh detection

    pub async fn capture(
        &mut self,
        strategy: &LocatorStrategy,
    ) -> Result<Option<Captured>, InteractionError> {
        RefreshDetector::capture(&mut *self.driver, strategy).await
    }

    pub async fn await_invalidated(
        &mut self,
        captured: Captured,
        wait: &WaitCondition,
    ) -> Result<(), InteractionError> {
        RefreshDetector::await_invalidated(&mut *self.driver, captured, wait).await
    }

    /// Await invalidation when something was captured, tolerating a timeout.
    /// Returns whether the refresh was observed.
    pub async fn await_refresh(&mut self, captured: Option<Captured>, wait: &WaitCondition) -> bool {
        let Some(captured) = captured else {
            return false;
        };
        let target = captured.target().to_string();
        match self.await_invalidated(captured, wait).await {
            Ok(()) => true,
            Err(e) => {
                warn!("No refresh observed for '{}': {}", target, e);
                false
            }
        }
    }

    /// Bounded delay for transitions the DOM does not expose.
    pub async fn settle(&self) {
        settle(self.config.waits.settle()).await;
    }
}
