//! UI profile: the application-specific half of every locator.
//!
//! Workflows refer to semantic target names and label keys only. The
//! profile maps those names to ordered query lists and literal labels, so
//! the same workflow code runs against a re-skinned or relabelled build of
//! the application by swapping one YAML file.

use crate::error::InteractionError;
use crate::locator::LocatorStrategy;
use holdfast_common::protocol::Query;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

const BUILTIN_PROFILE: &str = include_str!("orangehrm.yaml");

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Failed to read profile: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse profile: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Profile '{profile}' is missing {}", .missing.join(", "))]
    Missing {
        profile: String,
        missing: Vec<String>,
    },
}

/// Profile keys a workflow reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements {
    pub targets: Vec<&'static str>,
    pub labels: Vec<&'static str>,
}

impl Requirements {
    pub fn new(targets: &[&'static str], labels: &[&'static str]) -> Self {
        Self {
            targets: targets.to_vec(),
            labels: labels.to_vec(),
        }
    }

    /// Union with another set of keys; duplicates are dropped.
    pub fn and(mut self, other: Requirements) -> Self {
        for target in other.targets {
            if !self.targets.contains(&target) {
                self.targets.push(target);
            }
        }
        for label in other.labels {
            if !self.labels.contains(&label) {
                self.labels.push(label);
            }
        }
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub targets: BTreeMap<String, Vec<Query>>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl UiProfile {
    /// The profile for the demo HR application, embedded at build time.
    pub fn builtin() -> Result<Self, ProfileError> {
        Self::from_yaml(BUILTIN_PROFILE)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ProfileError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub async fn load(path: &Path) -> Result<Self, ProfileError> {
        debug!("Loading UI profile from {}", path.display());
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_yaml(&content)
    }

    /// `path` when given, the built-in profile otherwise.
    pub async fn load_or_builtin(path: Option<&Path>) -> Result<Self, ProfileError> {
        match path {
            Some(path) => Self::load(path).await,
            None => Self::builtin(),
        }
    }

    pub fn target(&self, name: &str) -> Result<LocatorStrategy, InteractionError> {
        self.targets
            .get(name)
            .filter(|queries| !queries.is_empty())
            .map(|queries| LocatorStrategy::new(name, queries.clone()))
            .ok_or_else(|| InteractionError::NotConfigured(name.to_string()))
    }

    /// A target with its `{slot}` placeholders filled.
    ///
    /// Fails when a placeholder is left unfilled: such a query would match
    /// nothing and only surface later as a confusing `NotFound`.
    pub fn target_with(
        &self,
        name: &str,
        params: &[(&str, &str)],
    ) -> Result<LocatorStrategy, InteractionError> {
        let strategy = self.target(name)?.fill(params);
        if let Some(query) = strategy.queries.iter().find(|q| q.has_unfilled_slots()) {
            return Err(InteractionError::Precondition(format!(
                "unfilled placeholder in '{}': {}",
                name, query
            )));
        }
        Ok(strategy)
    }

    /// A target parameterized by a label looked up in this profile.
    pub fn labelled(&self, name: &str, label_key: &str) -> Result<LocatorStrategy, InteractionError> {
        let label = self.label(label_key)?;
        self.target_with(name, &[("label", label)])
    }

    pub fn label(&self, key: &str) -> Result<&str, InteractionError> {
        self.labels
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| InteractionError::NotConfigured(key.to_string()))
    }

    /// Report every missing key at once, so a broken profile fails before
    /// the browser is even launched.
    pub fn validate(&self, required: &Requirements) -> Result<(), ProfileError> {
        let mut missing: Vec<String> = required
            .targets
            .iter()
            .filter(|name| self.targets.get(**name).is_none_or(|q| q.is_empty()))
            .map(|name| format!("target '{}'", name))
            .collect();
        missing.extend(
            required
                .labels
                .iter()
                .filter(|key| !self.labels.contains_key(**key))
                .map(|key| format!("label '{}'", key)),
        );

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ProfileError::Missing {
                profile: self.name.clone(),
                missing,
            })
        }
    }
}
