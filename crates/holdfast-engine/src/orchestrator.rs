//! Step Orchestrator.
//!
//! Runs a workflow's steps strictly in declared order. Each step declares
//! its `FailurePolicy` up front: a failing `Hard` step aborts the run, a
//! failing `BestEffort` step is recorded as `Degraded` and the run moves
//! on. Nothing is retried at this level.

use crate::backend::{Driver, DriverError};
use crate::config::HoldfastConfig;
use crate::error::InteractionError;
use crate::profile::{ProfileError, Requirements, UiProfile};
use crate::report::{Diagnostics, RunReport, StepRecord, Verdict};
use crate::scenario::ScenarioContent;
use crate::session::Session;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    Hard,
    BestEffort,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Hard => write!(f, "hard"),
            FailurePolicy::BestEffort => write!(f, "best-effort"),
        }
    }
}

/// One planned step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSpec<S> {
    pub step: S,
    pub policy: FailurePolicy,
}

impl<S> StepSpec<S> {
    pub fn hard(step: S) -> Self {
        Self {
            step,
            policy: FailurePolicy::Hard,
        }
    }

    pub fn best_effort(step: S) -> Self {
        Self {
            step,
            policy: FailurePolicy::BestEffort,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded,
    Degraded { reason: String },
    Aborted { reason: String },
}

impl StepOutcome {
    /// Applies the step's policy to its result.
    pub fn from_result(result: Result<(), InteractionError>, policy: FailurePolicy) -> Self {
        match (result, policy) {
            (Ok(()), _) => StepOutcome::Succeeded,
            (Err(e), FailurePolicy::BestEffort) => StepOutcome::Degraded {
                reason: e.to_string(),
            },
            (Err(e), FailurePolicy::Hard) => StepOutcome::Aborted {
                reason: e.to_string(),
            },
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            StepOutcome::Succeeded => None,
            StepOutcome::Degraded { reason } | StepOutcome::Aborted { reason } => Some(reason),
        }
    }
}

/// Run-level state machine: `Pending -> Running -> Completed | Aborted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowStatus {
    Pending,
    Running { step: String },
    Completed,
    Aborted { step: String, reason: String },
}

impl WorkflowStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowStatus::Completed | WorkflowStatus::Aborted { .. }
        )
    }

    fn start(&mut self, step: &str) {
        debug_assert!(!self.is_terminal(), "step started after the run ended");
        *self = WorkflowStatus::Running {
            step: step.to_string(),
        };
    }

    /// Folds a step outcome into the run status.
    fn finish(&mut self, outcome: &StepOutcome) {
        if let (WorkflowStatus::Running { step }, StepOutcome::Aborted { reason }) =
            (&*self, outcome)
        {
            *self = WorkflowStatus::Aborted {
                step: step.clone(),
                reason: reason.clone(),
            };
        }
    }

    fn complete(&mut self) {
        if !self.is_terminal() {
            *self = WorkflowStatus::Completed;
        }
    }
}

/// A fixed, ordered workflow over one browser session.
#[async_trait]
pub trait Workflow: Send + Sync {
    type Step: Copy + fmt::Display + Send + Sync;
    /// "Last known good" references threaded between steps. Dropped at
    /// the end of the run.
    type State: Default + Send;

    fn name(&self) -> &'static str;

    fn scenario(&self) -> &ScenarioContent;

    /// Profile keys the steps read, checked before the browser starts.
    fn requirements(&self) -> Requirements;

    fn plan(&self) -> Vec<StepSpec<Self::Step>>;

    async fn run_step(
        &self,
        step: Self::Step,
        session: &mut Session<'_>,
        state: &mut Self::State,
    ) -> Result<(), InteractionError>;
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to start browser session: {0}")]
    Launch(DriverError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

pub struct Orchestrator;

impl Orchestrator {
    /// Execute every planned step against an already launched session.
    pub async fn run<W: Workflow>(workflow: &W, session: &mut Session<'_>) -> RunReport {
        let mut state = W::State::default();
        let mut status = WorkflowStatus::Pending;
        let mut trail = Vec::new();
        let mut diagnostics = Diagnostics::default();

        info!(
            "Starting workflow '{}' (scenario {})",
            workflow.name(),
            workflow.scenario().base_id()
        );

        for spec in workflow.plan() {
            let name = spec.step.to_string();
            status.start(&name);
            info!("[{}] {} ({})", workflow.name(), name, spec.policy);

            let started = Instant::now();
            let result = workflow.run_step(spec.step, session, &mut state).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            let outcome = StepOutcome::from_result(result, spec.policy);

            match &outcome {
                StepOutcome::Succeeded => info!("[{}] {} succeeded", workflow.name(), name),
                StepOutcome::Degraded { reason } => {
                    warn!("[{}] {} degraded: {}", workflow.name(), name, reason)
                }
                StepOutcome::Aborted { reason } => {
                    error!("[{}] {} failed: {}", workflow.name(), name, reason)
                }
            }

            status.finish(&outcome);
            trail.push(StepRecord {
                name,
                policy: spec.policy,
                outcome,
                elapsed_ms,
            });

            if status.is_terminal() {
                diagnostics = Diagnostics::collect(session).await;
                break;
            }
        }
        status.complete();

        let verdict = match status {
            WorkflowStatus::Aborted { step, reason } => Verdict::Aborted { step, reason },
            _ => Verdict::Completed,
        };
        RunReport {
            workflow: workflow.name().to_string(),
            scenario_id: workflow.scenario().base_id().to_string(),
            verdict,
            trail,
            diagnostics,
        }
    }
}

/// Own the driver for exactly one run: validate the profile, launch,
/// run, and close on every exit path.
pub async fn run_in_session<W: Workflow>(
    driver: &mut dyn Driver,
    profile: &UiProfile,
    config: &HoldfastConfig,
    workflow: &W,
) -> Result<RunReport, RunError> {
    profile.validate(&workflow.requirements())?;
    driver.launch().await.map_err(RunError::Launch)?;

    let report = {
        let mut session = Session::new(&mut *driver, profile, config);
        Orchestrator::run(workflow, &mut session).await
    };

    if let Err(e) = driver.close().await {
        warn!("Failed to close browser session: {}", e);
    }
    Ok(report)
}
