use fantoccini::{Client, ClientBuilder};
use holdfast_common::error::DriverError;
use holdfast_engine::config::BrowserConfig;
use serde_json::{Map, Value, json};
use std::path::PathBuf;
use tracing::{debug, info};

/// Browser settings sent to the WebDriver server as session capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserOptions {
    pub webdriver_url: String,
    pub headless: bool,
    pub download_dir: Option<PathBuf>,
    pub window_size: (u32, u32),
}

impl From<&BrowserConfig> for BrowserOptions {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            headless: config.headless,
            download_dir: config.download_dir.clone(),
            window_size: config.window_size,
        }
    }
}

impl BrowserOptions {
    /// Chrome capabilities: window size, optional headless mode, and a
    /// download directory that never prompts.
    pub fn chrome_capabilities(&self) -> Map<String, Value> {
        let (width, height) = self.window_size;
        let mut args = vec![
            format!("--window-size={},{}", width, height),
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
        ];
        if self.headless {
            args.push("--headless=new".to_string());
        }

        let mut chrome = Map::new();
        chrome.insert("args".into(), json!(args));
        if let Some(dir) = &self.download_dir {
            chrome.insert(
                "prefs".into(),
                json!({
                    "download.default_directory": dir.display().to_string(),
                    "download.prompt_for_download": false,
                    "download.directory_upgrade": true,
                    "safebrowsing.enabled": true,
                }),
            );
        }

        let mut caps = Map::new();
        caps.insert("browserName".into(), json!("chrome"));
        caps.insert("goog:chromeOptions".into(), Value::Object(chrome));
        caps
    }
}

pub struct WebDriverClient {
    pub client: Client,
}

impl WebDriverClient {
    pub async fn connect(
        url: &str,
        capabilities: Map<String, Value>,
    ) -> Result<Self, DriverError> {
        debug!("Requesting session with capabilities {:?}", capabilities);
        let client = ClientBuilder::native()
            .capabilities(capabilities)
            .connect(url)
            .await
            .map_err(|e| {
                DriverError::Other(format!("Failed to connect to WebDriver at {}: {}", url, e))
            })?;
        info!("WebDriver session opened at {}", url);
        Ok(Self { client })
    }

    pub async fn close(self) -> Result<(), DriverError> {
        self.client
            .close()
            .await
            .map_err(|e| DriverError::Other(format!("Failed to close session: {}", e)))
    }
}
