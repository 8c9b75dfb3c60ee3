use async_trait::async_trait;
pub use holdfast_common::error::DriverError;
use holdfast_common::protocol::{ElementHandle, NavigationResult, Query, SpecialKey};
use std::path::Path;

/// The browser-automation capability set the engine consumes.
///
/// Implementations own exactly one browser session. Every method that
/// takes an `ElementHandle` must report `DriverError::Stale` when the
/// node behind it was removed or replaced.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Acquire the browser session.
    async fn launch(&mut self) -> Result<(), DriverError>;

    /// Release the browser session and every handle it produced.
    async fn close(&mut self) -> Result<(), DriverError>;

    async fn is_ready(&self) -> bool;

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, DriverError>;

    /// Run a query, optionally scoped to the subtree of `scope`.
    ///
    /// Returns zero or more handles in document order. A query the driver
    /// cannot evaluate yields `DriverError::InvalidQuery` or
    /// `DriverError::NotSupported`.
    async fn find(
        &mut self,
        query: &Query,
        scope: Option<&ElementHandle>,
    ) -> Result<Vec<ElementHandle>, DriverError>;

    /// Whether the node behind `handle` is still attached to the document.
    async fn is_present(&mut self, handle: &ElementHandle) -> Result<bool, DriverError>;

    /// Displayed and enabled.
    async fn is_interactable(&mut self, handle: &ElementHandle) -> Result<bool, DriverError>;

    async fn click(&mut self, handle: &ElementHandle) -> Result<(), DriverError>;

    /// Click through script, bypassing the occlusion check.
    async fn click_via_script(&mut self, handle: &ElementHandle) -> Result<(), DriverError>;

    async fn type_text(&mut self, handle: &ElementHandle, text: &str) -> Result<(), DriverError>;

    async fn clear(&mut self, handle: &ElementHandle) -> Result<(), DriverError>;

    async fn send_special_key(
        &mut self,
        handle: &ElementHandle,
        key: SpecialKey,
    ) -> Result<(), DriverError>;

    /// Rendered text of the node.
    async fn text(&mut self, handle: &ElementHandle) -> Result<String, DriverError>;

    /// Used only for coarse-grained final assertions.
    async fn current_page_source(&mut self) -> Result<String, DriverError>;

    async fn upload_file(&mut self, handle: &ElementHandle, path: &Path)
    -> Result<(), DriverError>;

    /// Current `value` of a form control.
    async fn value(&mut self, _handle: &ElementHandle) -> Result<Option<String>, DriverError> {
        Err(DriverError::NotSupported("value".into()))
    }

    /// Checked state of a checkbox or radio input.
    async fn is_selected(&mut self, _handle: &ElementHandle) -> Result<bool, DriverError> {
        Err(DriverError::NotSupported("is_selected".into()))
    }

    async fn current_url(&mut self) -> Result<String, DriverError> {
        Err(DriverError::NotSupported("current_url".into()))
    }

    async fn scroll_into_view(&mut self, _handle: &ElementHandle) -> Result<(), DriverError> {
        Err(DriverError::NotSupported("scroll_into_view".into()))
    }
}
