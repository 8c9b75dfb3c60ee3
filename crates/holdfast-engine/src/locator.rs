//! Locator Resolver.
//!
//! Turns a semantic target into concrete DOM queries tried in declaration
//! order. Queries the driver rejects (bad syntax, unsupported language) are
//! skipped, so a single strategy can cover several DOM variants of the
//! same control.

use crate::backend::Driver;
use crate::error::InteractionError;
use holdfast_common::protocol::{ElementHandle, Query};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ordered alternative queries for one semantic target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorStrategy {
    /// Semantic name, used in logs and failure reasons.
    pub target: String,
    pub queries: Vec<Query>,
}

impl LocatorStrategy {
    pub fn new(target: impl Into<String>, queries: Vec<Query>) -> Self {
        Self {
            target: target.into(),
            queries,
        }
    }

    pub fn single(target: impl Into<String>, query: Query) -> Self {
        Self::new(target, vec![query])
    }

    /// Fill `{slot}` placeholders in every query.
    pub fn fill(&self, params: &[(&str, &str)]) -> Self {
        Self {
            target: self.target.clone(),
            queries: self.queries.iter().map(|q| q.fill(params)).collect(),
        }
    }

    /// Append the queries of `other` after this strategy's own.
    pub fn or(mut self, other: &LocatorStrategy) -> Self {
        self.queries.extend(other.queries.iter().cloned());
        self
    }

    pub fn describe_queries(&self) -> Vec<String> {
        self.queries.iter().map(|q| q.to_string()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// A single element is expected; extra matches are ignored.
    One,
    /// A list is expected; its first element is wanted.
    FirstOfMany,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// At least one match exists.
    Present,
    /// At least one match is displayed and enabled.
    Interactable,
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub handles: Vec<ElementHandle>,
    /// Index of the winning query in the strategy.
    pub query_index: usize,
}

impl Resolved {
    /// The first handle. Never empty by construction.
    pub fn first(&self) -> &ElementHandle {
        &self.handles[0]
    }

    pub fn into_first(mut self) -> ElementHandle {
        self.handles.swap_remove(0)
    }
}

pub struct LocatorResolver;

impl LocatorResolver {
    /// Single resolution pass. `Ok(None)` when no query produced a
    /// qualifying match.
    pub async fn try_resolve(
        driver: &mut dyn Driver,
        strategy: &LocatorStrategy,
        cardinality: Cardinality,
        requirement: Requirement,
        scope: Option<&ElementHandle>,
    ) -> Result<Option<Resolved>, InteractionError> {
        for (index, query) in strategy.queries.iter().enumerate() {
            let found = match driver.find(query, scope).await {
                Ok(found) => found,
                Err(e) if e.is_query_rejection() => {
                    debug!(
                        "Skipping query {} for '{}': {}",
                        query, strategy.target, e
                    );
                    continue;
                }
                Err(e) if e.is_stale() => {
                    // Only the scope can be stale during a find.
                    return Err(InteractionError::Stale {
                        target: format!("scope of '{}'", strategy.target),
                    });
                }
                Err(e) => return Err(InteractionError::Driver(e)),
            };

            let matches = match requirement {
                Requirement::Present => found,
                Requirement::Interactable => Self::interactable_only(driver, found).await?,
            };

            if matches.is_empty() {
                debug!("Query {} for '{}' matched nothing", query, strategy.target);
                continue;
            }

            debug!(
                "Query {} for '{}' matched {} element(s)",
                query,
                strategy.target,
                matches.len()
            );
            let handles = match cardinality {
                Cardinality::One | Cardinality::FirstOfMany => {
                    matches.into_iter().take(1).collect()
                }
                Cardinality::All => matches,
            };
            return Ok(Some(Resolved {
                handles,
                query_index: index,
            }));
        }
        Ok(None)
    }

    /// Single resolution pass that fails with `NotFound` on a miss.
    pub async fn resolve(
        driver: &mut dyn Driver,
        strategy: &LocatorStrategy,
        cardinality: Cardinality,
        requirement: Requirement,
        scope: Option<&ElementHandle>,
    ) -> Result<Resolved, InteractionError> {
        Self::try_resolve(driver, strategy, cardinality, requirement, scope)
            .await?
            .ok_or_else(|| InteractionError::NotFound {
                target: strategy.target.clone(),
                attempted: strategy.describe_queries(),
                waited_ms: 0,
            })
    }

    async fn interactable_only(
        driver: &mut dyn Driver,
        found: Vec<ElementHandle>,
    ) -> Result<Vec<ElementHandle>, InteractionError> {
        let mut usable = Vec::with_capacity(found.len());
        for handle in found {
            match driver.is_interactable(&handle).await {
                Ok(true) => usable.push(handle),
                Ok(false) => {}
                // Re-rendered between find and check; the next poll sees the new node.
                Err(e) if e.is_stale() => {}
                Err(e) => return Err(InteractionError::Driver(e)),
            }
        }
        Ok(usable)
    }
}
