//! Action Executor.
//!
//! Every DOM mutation goes through `ActionExecutor::perform`. Two fallbacks
//! are built in: a click rejected because another element occupies its
//! position is retried through script, and a control that cannot be
//! cleared directly is emptied with select-all + delete. If both paths of
//! an action fail the result is `ActionFailed`; nothing silently no-ops.

use crate::backend::{Driver, DriverError};
use crate::error::InteractionError;
use crate::locator::LocatorStrategy;
use crate::wait::{Located, WaitCondition, await_condition};
use holdfast_common::protocol::{ElementHandle, SpecialKey};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Click,
    /// Clear, then type.
    Type(String),
    /// Like `Type`, but the text never reaches the logs.
    TypeSecret(String),
    Clear,
    /// Open a dropdown and pick an option.
    SelectOption(OptionChoice),
    Press(SpecialKey),
    Upload(PathBuf),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Click => write!(f, "click"),
            Action::Type(text) => write!(f, "type '{}'", text),
            Action::TypeSecret(text) => write!(f, "type <{} chars>", text.chars().count()),
            Action::Clear => write!(f, "clear"),
            Action::SelectOption(OptionChoice::FirstAvailable) => {
                write!(f, "select first option")
            }
            Action::SelectOption(OptionChoice::Matching(s)) => {
                write!(f, "select option '{}'", s.target)
            }
            Action::Press(key) => write!(f, "press {:?}", key),
            Action::Upload(path) => write!(f, "upload {}", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptionChoice {
    /// Keyboard selection of the first entry (arrow down, enter).
    FirstAvailable,
    /// Click the option located by this strategy once it is clickable.
    Matching(LocatorStrategy),
}

pub struct ActionExecutor {
    option_wait: WaitCondition,
}

impl Default for ActionExecutor {
    fn default() -> Self {
        Self::new(WaitCondition::default())
    }
}

impl ActionExecutor {
    /// `option_wait` bounds how long a dropdown may take to render its options.
    pub fn new(option_wait: WaitCondition) -> Self {
        Self { option_wait }
    }

    pub async fn perform(
        &self,
        driver: &mut dyn Driver,
        handle: &ElementHandle,
        action: &Action,
    ) -> Result<(), InteractionError> {
        debug!("Performing {} on {} ({})", action, handle, handle.origin);
        match action {
            Action::Click => self.click(driver, handle).await,
            Action::Type(text) | Action::TypeSecret(text) => {
                self.clear(driver, handle).await?;
                driver
                    .type_text(handle, text)
                    .await
                    .map_err(|e| failed("type", handle, e, None))
            }
            Action::Clear => self.clear(driver, handle).await,
            Action::SelectOption(choice) => {
                self.click(driver, handle).await?;
                match choice {
                    OptionChoice::FirstAvailable => {
                        for key in [SpecialKey::ArrowDown, SpecialKey::Enter] {
                            driver
                                .send_special_key(handle, key)
                                .await
                                .map_err(|e| failed("select", handle, e, None))?;
                        }
                        Ok(())
                    }
                    OptionChoice::Matching(strategy) => {
                        let option = await_condition(
                            driver,
                            &Located::clickable(strategy),
                            &self.option_wait,
                        )
                        .await?
                        .into_first();
                        self.click(driver, &option).await
                    }
                }
            }
            Action::Press(key) => driver
                .send_special_key(handle, *key)
                .await
                .map_err(|e| failed("press", handle, e, None)),
            Action::Upload(path) => driver
                .upload_file(handle, path)
                .await
                .map_err(|e| failed("upload", handle, e, None)),
        }
    }

    async fn click(
        &self,
        driver: &mut dyn Driver,
        handle: &ElementHandle,
    ) -> Result<(), InteractionError> {
        match driver.click(handle).await {
            Ok(()) => Ok(()),
            Err(primary) if primary.is_intercepted() => {
                warn!(
                    "Click on {} ({}) intercepted, retrying through script",
                    handle, handle.origin
                );
                driver
                    .click_via_script(handle)
                    .await
                    .map_err(|fallback| failed("click", handle, primary, Some(fallback)))
            }
            Err(e) => Err(failed("click", handle, e, None)),
        }
    }

    async fn clear(
        &self,
        driver: &mut dyn Driver,
        handle: &ElementHandle,
    ) -> Result<(), InteractionError> {
        let primary = match driver.clear(handle).await {
            Ok(()) => match residual_content(driver, handle).await {
                None => return Ok(()),
                Some(left) => DriverError::InvalidElementState {
                    handle: handle.to_string(),
                    reason: format!("clear left {} chars behind", left.chars().count()),
                },
            },
            Err(e) if e.is_unsupported_primitive() => e,
            Err(e) => return Err(failed("clear", handle, e, None)),
        };

        warn!(
            "Clear unsupported on {} ({}): {}; using select-all + delete",
            handle, handle.origin, primary
        );
        let fallback = match driver.send_special_key(handle, SpecialKey::SelectAll).await {
            Ok(()) => driver.send_special_key(handle, SpecialKey::Backspace).await,
            Err(e) => Err(e),
        };
        fallback.map_err(|e| failed("clear", handle, primary, Some(e)))
    }
}

/// Content still present after a clear, if the driver can tell.
async fn residual_content(driver: &mut dyn Driver, handle: &ElementHandle) -> Option<String> {
    match driver.value(handle).await {
        Ok(Some(value)) => (!value.is_empty()).then_some(value),
        // No value property: a content-editable region keeps its text in the DOM.
        Ok(None) => match driver.text(handle).await {
            Ok(text) if !text.is_empty() => Some(text),
            _ => None,
        },
        Err(_) => None,
    }
}

fn failed(
    action: &str,
    handle: &ElementHandle,
    primary: DriverError,
    fallback: Option<DriverError>,
) -> InteractionError {
    let target = format!("{} ({})", handle, handle.origin);
    match fallback {
        None if primary.is_stale() => InteractionError::Stale { target },
        Some(ref f) if f.is_stale() => InteractionError::Stale { target },
        None if primary.is_fatal() => InteractionError::Driver(primary),
        _ => InteractionError::ActionFailed {
            action: action.to_string(),
            target,
            primary: primary.to_string(),
            fallback: fallback.map(|f| f.to_string()),
        },
    }
}
