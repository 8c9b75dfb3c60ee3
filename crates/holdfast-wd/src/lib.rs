//! W3C WebDriver implementation of the engine's `Driver` capability set.
//!
//! Connects to an already running WebDriver server (chromedriver,
//! geckodriver, a Selenium grid); starting one is left to the caller.

pub mod backend;
pub mod webdriver;

pub use backend::WebDriverSession;
pub use webdriver::BrowserOptions;
