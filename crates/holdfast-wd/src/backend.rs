use crate::webdriver::{BrowserOptions, WebDriverClient};
use async_trait::async_trait;
use fantoccini::Locator;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use holdfast_common::protocol::{ElementHandle, NavigationResult, Query, QueryLanguage, SpecialKey};
use holdfast_engine::backend::{Driver, DriverError};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

const SCRIPT_CLICK: &str = "arguments[0].click();";
const SCROLL_INTO_VIEW: &str = "arguments[0].scrollIntoView({block: 'center', inline: 'nearest'});";

/// Server elements by numeric handle id.
///
/// The same server element always maps to the same id, so repeated finds
/// while polling do not grow the map.
struct Registry<E> {
    by_id: HashMap<u64, (String, E)>,
    by_ref: HashMap<String, u64>,
    next_id: u64,
}

impl<E> Registry<E> {
    fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            by_ref: HashMap::new(),
            next_id: 1,
        }
    }

    fn register(&mut self, reference: String, element: E) -> u64 {
        let id = match self.by_ref.get(&reference) {
            Some(id) => *id,
            None => {
                let id = self.next_id;
                self.next_id += 1;
                self.by_ref.insert(reference.clone(), id);
                id
            }
        };
        self.by_id.insert(id, (reference, element));
        id
    }

    fn get(&self, id: u64) -> Option<&E> {
        self.by_id.get(&id).map(|(_, element)| element)
    }

    fn forget(&mut self, id: u64) {
        if let Some((reference, _)) = self.by_id.remove(&id) {
            self.by_ref.remove(&reference);
        }
    }

    fn clear(&mut self) {
        self.by_id.clear();
        self.by_ref.clear();
    }

    fn len(&self) -> usize {
        self.by_id.len()
    }
}

/// One browser session behind a WebDriver server.
///
/// Elements returned by the server are kept in a registry and handed to
/// the engine as numeric `ElementHandle`s. Entries go when they are seen
/// stale, on navigation, and with the session.
pub struct WebDriverSession {
    options: BrowserOptions,
    client: Option<WebDriverClient>,
    elements: Registry<Element>,
}

impl WebDriverSession {
    pub fn new(options: BrowserOptions) -> Self {
        Self {
            options,
            client: None,
            elements: Registry::new(),
        }
    }

    /// Number of server elements currently addressable by handle.
    pub fn registered_elements(&self) -> usize {
        self.elements.len()
    }

    fn client(&self) -> Result<&WebDriverClient, DriverError> {
        self.client.as_ref().ok_or(DriverError::NotReady)
    }

    fn element(&self, handle: &ElementHandle) -> Result<&Element, DriverError> {
        self.elements.get(handle.id).ok_or_else(|| DriverError::Stale {
            handle: handle.to_string(),
        })
    }

    fn register(&mut self, element: Element, origin: &str) -> ElementHandle {
        let reference = element.element_id().to_string();
        ElementHandle::new(self.elements.register(reference, element), origin)
    }

    async fn navigation_result(&self) -> Result<NavigationResult, DriverError> {
        let client = &self.client()?.client;
        let title = client.title().await.unwrap_or_default();
        let url = client
            .current_url()
            .await
            .map(|u| u.to_string())
            .map_err(|e| DriverError::Navigation(e.to_string()))?;
        Ok(NavigationResult { url, title })
    }

    async fn run_script_on(
        &self,
        handle: &ElementHandle,
        script: &str,
    ) -> Result<(), DriverError> {
        let element = self.element(handle)?;
        let arg = serde_json::to_value(element)?;
        self.client()?
            .client
            .execute(script, vec![arg])
            .await
            .map_err(|e| classify(e, handle))?;
        Ok(())
    }
}

/// The query as a fantoccini locator. `name` and `class` queries have no
/// W3C strategy of their own and are expressed as CSS.
fn css_equivalent(query: &Query) -> Option<String> {
    match query.language {
        QueryLanguage::Name => Some(format!("[name=\"{}\"]", query.expression)),
        QueryLanguage::ClassName => Some(format!(".{}", query.expression)),
        _ => None,
    }
}

fn locator<'a>(query: &'a Query, css: Option<&'a str>) -> Locator<'a> {
    if let Some(css) = css {
        return Locator::Css(css);
    }
    match query.language {
        QueryLanguage::XPath => Locator::XPath(&query.expression),
        QueryLanguage::Id => Locator::Id(&query.expression),
        QueryLanguage::LinkText => Locator::LinkText(&query.expression),
        _ => Locator::Css(&query.expression),
    }
}

/// Map a WebDriver error response onto the engine's taxonomy. The W3C
/// error codes are carried in the message text.
fn classify(err: CmdError, handle: &ElementHandle) -> DriverError {
    if matches!(err, CmdError::Lost(_)) {
        return DriverError::ConnectionLost;
    }
    let message = err.to_string();
    let lower = message.to_lowercase();
    if lower.contains("stale element reference") || lower.contains("no such element") {
        DriverError::Stale {
            handle: handle.to_string(),
        }
    } else if lower.contains("element click intercepted")
        || lower.contains("is not clickable at point")
    {
        DriverError::Intercepted {
            handle: handle.to_string(),
            reason: message,
        }
    } else if lower.contains("element not interactable") {
        DriverError::NotInteractable {
            handle: handle.to_string(),
            reason: message,
        }
    } else if lower.contains("invalid element state") {
        DriverError::InvalidElementState {
            handle: handle.to_string(),
            reason: message,
        }
    } else if lower.contains("javascript error") {
        DriverError::Script(message)
    } else if lower.contains("timeout") {
        DriverError::Timeout(message)
    } else {
        DriverError::Other(message)
    }
}

fn classify_find(err: CmdError, query: &Query, scope: Option<&ElementHandle>) -> DriverError {
    if matches!(err, CmdError::Lost(_)) {
        return DriverError::ConnectionLost;
    }
    let message = err.to_string();
    let lower = message.to_lowercase();
    if lower.contains("invalid selector") || lower.contains("invalid argument") {
        return DriverError::InvalidQuery {
            query: query.to_string(),
            reason: message,
        };
    }
    match scope {
        Some(scope) if lower.contains("stale element reference") => DriverError::Stale {
            handle: scope.to_string(),
        },
        _ => DriverError::Other(message),
    }
}

#[async_trait]
impl Driver for WebDriverSession {
    async fn launch(&mut self) -> Result<(), DriverError> {
        info!(
            "Connecting to WebDriver at {} (headless: {})",
            self.options.webdriver_url, self.options.headless
        );
        let client = WebDriverClient::connect(
            &self.options.webdriver_url,
            self.options.chrome_capabilities(),
        )
        .await?;
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        self.elements.clear();
        if let Some(client) = self.client.take() {
            client.close().await?;
            info!("WebDriver session closed");
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, DriverError> {
        info!("Navigating to: {}", url);
        self.elements.clear();
        self.client()?
            .client
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?;
        self.navigation_result().await
    }

    async fn find(
        &mut self,
        query: &Query,
        scope: Option<&ElementHandle>,
    ) -> Result<Vec<ElementHandle>, DriverError> {
        let css = css_equivalent(query);
        let found = {
            let search = locator(query, css.as_deref());
            match scope {
                Some(scope) => self.element(scope)?.find_all(search).await,
                None => self.client()?.client.find_all(search).await,
            }
        };
        let elements = found.map_err(|e| classify_find(e, query, scope))?;
        debug!("{} matched {} element(s)", query, elements.len());

        let origin = query.to_string();
        Ok(elements
            .into_iter()
            .map(|element| self.register(element, &origin))
            .collect())
    }

    async fn is_present(&mut self, handle: &ElementHandle) -> Result<bool, DriverError> {
        let Some(element) = self.elements.get(handle.id) else {
            return Ok(false);
        };
        match element.is_enabled().await {
            Ok(_) => Ok(true),
            Err(e) => match classify(e, handle) {
                DriverError::Stale { .. } => {
                    self.elements.forget(handle.id);
                    Ok(false)
                }
                other => Err(other),
            },
        }
    }

    async fn is_interactable(&mut self, handle: &ElementHandle) -> Result<bool, DriverError> {
        let element = self.element(handle)?;
        let displayed = element
            .is_displayed()
            .await
            .map_err(|e| classify(e, handle))?;
        if !displayed {
            return Ok(false);
        }
        element.is_enabled().await.map_err(|e| classify(e, handle))
    }

    async fn click(&mut self, handle: &ElementHandle) -> Result<(), DriverError> {
        debug!("Clicking {}", handle);
        self.element(handle)?
            .click()
            .await
            .map_err(|e| classify(e, handle))
    }

    async fn click_via_script(&mut self, handle: &ElementHandle) -> Result<(), DriverError> {
        debug!("Clicking {} through script", handle);
        self.run_script_on(handle, SCRIPT_CLICK).await
    }

    async fn type_text(&mut self, handle: &ElementHandle, text: &str) -> Result<(), DriverError> {
        debug!("Typing {} character(s) into {}", text.chars().count(), handle);
        self.element(handle)?
            .send_keys(text)
            .await
            .map_err(|e| classify(e, handle))
    }

    async fn clear(&mut self, handle: &ElementHandle) -> Result<(), DriverError> {
        self.element(handle)?
            .clear()
            .await
            .map_err(|e| classify(e, handle))
    }

    async fn send_special_key(
        &mut self,
        handle: &ElementHandle,
        key: SpecialKey,
    ) -> Result<(), DriverError> {
        debug!("Sending {:?} to {}", key, handle);
        self.element(handle)?
            .send_keys(&key.sequence())
            .await
            .map_err(|e| classify(e, handle))
    }

    async fn text(&mut self, handle: &ElementHandle) -> Result<String, DriverError> {
        self.element(handle)?
            .text()
            .await
            .map_err(|e| classify(e, handle))
    }

    async fn current_page_source(&mut self) -> Result<String, DriverError> {
        self.client()?
            .client
            .source()
            .await
            .map_err(|e| DriverError::Other(format!("page source failed: {}", e)))
    }

    async fn upload_file(
        &mut self,
        handle: &ElementHandle,
        path: &Path,
    ) -> Result<(), DriverError> {
        // The remote end needs an absolute path.
        let absolute = tokio::fs::canonicalize(path).await?;
        debug!("Uploading {} through {}", absolute.display(), handle);
        self.element(handle)?
            .send_keys(&absolute.display().to_string())
            .await
            .map_err(|e| classify(e, handle))
    }

    async fn value(&mut self, handle: &ElementHandle) -> Result<Option<String>, DriverError> {
        self.element(handle)?
            .prop("value")
            .await
            .map_err(|e| classify(e, handle))
    }

    async fn is_selected(&mut self, handle: &ElementHandle) -> Result<bool, DriverError> {
        self.element(handle)?
            .is_selected()
            .await
            .map_err(|e| classify(e, handle))
    }

    async fn current_url(&mut self) -> Result<String, DriverError> {
        Ok(self.navigation_result().await?.url)
    }

    async fn scroll_into_view(&mut self, handle: &ElementHandle) -> Result<(), DriverError> {
        self.run_script_on(handle, SCROLL_INTO_VIEW).await
    }
}
