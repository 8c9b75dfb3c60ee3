use crate::wait::{MAX_SETTLE, WaitCondition};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HoldfastConfig {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub waits: WaitsConfig,
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub fixtures: FixturesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default)]
    pub headless: bool,
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    #[serde(default = "default_window_size")]
    pub window_size: (u32, u32),
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: false,
            download_dir: None,
            window_size: default_window_size(),
        }
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

fn default_window_size() -> (u32, u32) {
    (1920, 1080)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitsConfig {
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
    #[serde(default = "default_refresh_timeout_ms")]
    pub refresh_timeout_ms: u64,
    #[serde(default = "default_confirm_timeout_ms")]
    pub confirm_timeout_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl Default for WaitsConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_timeout_ms(),
            refresh_timeout_ms: default_refresh_timeout_ms(),
            confirm_timeout_ms: default_confirm_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl WaitsConfig {
    pub fn default_wait(&self) -> WaitCondition {
        WaitCondition::from_millis(self.default_timeout_ms, self.poll_interval_ms)
    }

    /// Budget for a list to re-render after a post, edit or delete.
    pub fn refresh_wait(&self) -> WaitCondition {
        WaitCondition::from_millis(self.refresh_timeout_ms, self.poll_interval_ms)
    }

    /// Budget for optional confirmation dialogs and toasts.
    pub fn confirm_wait(&self) -> WaitCondition {
        WaitCondition::from_millis(self.confirm_timeout_ms, self.poll_interval_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms).min(MAX_SETTLE)
    }
}

fn default_timeout_ms() -> u64 {
    20000
}

fn default_refresh_timeout_ms() -> u64 {
    10000
}

fn default_confirm_timeout_ms() -> u64 {
    5000
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_settle_ms() -> u64 {
    500
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    /// Replaces the built-in UI profile.
    #[serde(default)]
    pub profile: Option<PathBuf>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: default_username(),
            password: default_password(),
            profile: None,
        }
    }
}

fn default_base_url() -> String {
    "https://opensource-demo.orangehrmlive.com".to_string()
}

fn default_username() -> String {
    "Admin".to_string()
}

fn default_password() -> String {
    "admin123".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixturesConfig {
    #[serde(default = "default_image")]
    pub image: PathBuf,
    #[serde(default = "default_attachment")]
    pub attachment: PathBuf,
}

impl Default for FixturesConfig {
    fn default() -> Self {
        Self {
            image: default_image(),
            attachment: default_attachment(),
        }
    }
}

fn default_image() -> PathBuf {
    PathBuf::from("./test_data/profile_image.png")
}

fn default_attachment() -> PathBuf {
    PathBuf::from("./test_data/sample_attachment.txt")
}
