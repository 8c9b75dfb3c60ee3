pub mod action;
pub mod backend;
pub mod config;
pub mod error;
pub mod locator;
pub mod orchestrator;
pub mod profile;
pub mod refresh;
pub mod report;
pub mod scenario;
pub mod session;
pub mod wait;
pub mod workflows;

pub use holdfast_common::protocol;
