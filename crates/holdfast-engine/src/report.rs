use crate::orchestrator::{FailurePolicy, StepOutcome};
use crate::session::Session;
use serde::Serialize;

/// Final payload of one workflow run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub workflow: String,
    pub scenario_id: String,
    pub verdict: Verdict,
    pub trail: Vec<StepRecord>,
    #[serde(skip_serializing_if = "Diagnostics::is_empty")]
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Completed,
    Aborted { step: String, reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub name: String,
    pub policy: FailurePolicy,
    pub outcome: StepOutcome,
    pub elapsed_ms: u64,
}

/// Page context captured when a run aborts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validation_messages: Vec<String>,
}

impl Diagnostics {
    pub async fn collect(session: &mut Session<'_>) -> Self {
        Self {
            url: session.current_url().await,
            validation_messages: session.validation_messages().await,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.validation_messages.is_empty()
    }
}

impl RunReport {
    pub fn is_completed(&self) -> bool {
        self.verdict == Verdict::Completed
    }

    pub fn degraded(&self) -> impl Iterator<Item = &StepRecord> {
        self.trail
            .iter()
            .filter(|r| matches!(r.outcome, StepOutcome::Degraded { .. }))
    }

    pub fn step(&self, name: &str) -> Option<&StepRecord> {
        self.trail.iter().find(|r| r.name == name)
    }
}

pub fn format_report(report: &RunReport) -> String {
    let verdict = match &report.verdict {
        Verdict::Completed => {
            let degraded = report.degraded().count();
            if degraded == 0 {
                "COMPLETED".to_string()
            } else {
                format!("COMPLETED ({} degraded)", degraded)
            }
        }
        Verdict::Aborted { step, .. } => format!("ABORTED at '{}'", step),
    };

    let mut output = format!(
        "Workflow: {}\nScenario: {}\nVerdict: {}\n\nSteps:",
        report.workflow, report.scenario_id, verdict
    );

    for record in &report.trail {
        let marker = match record.outcome {
            StepOutcome::Succeeded => "ok",
            StepOutcome::Degraded { .. } => "degraded",
            StepOutcome::Aborted { .. } => "FAILED",
        };
        output.push_str(&format!(
            "\n- [{}] {} ({}, {} ms)",
            marker, record.name, record.policy, record.elapsed_ms
        ));
        if let Some(reason) = record.outcome.reason() {
            output.push_str(&format!("\n    {}", reason));
        }
    }

    if let Some(url) = &report.diagnostics.url {
        output.push_str(&format!("\n\nURL at failure: {}", url));
    }
    if !report.diagnostics.validation_messages.is_empty() {
        output.push_str("\n\nValidation messages:");
        for message in &report.diagnostics.validation_messages {
            output.push_str(&format!("\n- {}", message));
        }
    }

    output
}
