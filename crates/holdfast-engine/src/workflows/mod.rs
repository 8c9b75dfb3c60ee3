//! The fixed workflow catalogue.

pub mod buzz;
pub mod common;
pub mod employee;
pub mod personal_details;
pub mod pim_report;
pub mod recruitment;

use crate::backend::Driver;
use crate::config::HoldfastConfig;
use crate::orchestrator::{RunError, Workflow, run_in_session};
use crate::profile::{Requirements, UiProfile};
use crate::report::RunReport;
use crate::scenario::ScenarioContent;
use buzz::BuzzWorkflow;
use employee::EmployeeWorkflow;
use personal_details::PersonalDetailsWorkflow;
use pim_report::PimReportWorkflow;
use recruitment::RecruitmentWorkflow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowKind {
    Buzz,
    Employee,
    PersonalDetails,
    PimReport,
    Recruitment,
}

impl WorkflowKind {
    /// Declared order; `all` runs them in this order.
    pub const ALL: [WorkflowKind; 5] = [
        WorkflowKind::Buzz,
        WorkflowKind::Employee,
        WorkflowKind::PersonalDetails,
        WorkflowKind::PimReport,
        WorkflowKind::Recruitment,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WorkflowKind::Buzz => "buzz",
            WorkflowKind::Employee => "employee",
            WorkflowKind::PersonalDetails => "personal-details",
            WorkflowKind::PimReport => "pim-report",
            WorkflowKind::Recruitment => "recruitment",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            WorkflowKind::Buzz => "Post, like, edit, comment on and delete a feed post",
            WorkflowKind::Employee => "Create an employee record and find it by its id",
            WorkflowKind::PersonalDetails => {
                "Fill personal details and manage attachments of a new employee"
            }
            WorkflowKind::PimReport => "Define a PIM report with criteria and display fields",
            WorkflowKind::Recruitment => "Add a candidate, shortlist them and schedule an interview",
        }
    }

    pub fn requirements(&self) -> Requirements {
        let content = ScenarioContent::new_scenario();
        match self {
            WorkflowKind::Buzz => BuzzWorkflow::new(content).requirements(),
            WorkflowKind::Employee => EmployeeWorkflow::new(content).requirements(),
            WorkflowKind::PersonalDetails => PersonalDetailsWorkflow::new(content).requirements(),
            WorkflowKind::PimReport => PimReportWorkflow::new(content).requirements(),
            WorkflowKind::Recruitment => RecruitmentWorkflow::new(content).requirements(),
        }
    }

    /// Run this workflow in its own browser session with fresh content.
    pub async fn run(
        self,
        driver: &mut dyn Driver,
        profile: &UiProfile,
        config: &HoldfastConfig,
        content: ScenarioContent,
    ) -> Result<RunReport, RunError> {
        match self {
            WorkflowKind::Buzz => {
                run_in_session(driver, profile, config, &BuzzWorkflow::new(content)).await
            }
            WorkflowKind::Employee => {
                run_in_session(driver, profile, config, &EmployeeWorkflow::new(content)).await
            }
            WorkflowKind::PersonalDetails => {
                let workflow = PersonalDetailsWorkflow::new(content);
                run_in_session(driver, profile, config, &workflow).await
            }
            WorkflowKind::PimReport => {
                run_in_session(driver, profile, config, &PimReportWorkflow::new(content)).await
            }
            WorkflowKind::Recruitment => {
                run_in_session(driver, profile, config, &RecruitmentWorkflow::new(content)).await
            }
        }
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for WorkflowKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|k| k.name()).collect();
                format!("unknown workflow '{}' (known: {})", s, known.join(", "))
            })
    }
}

/// Expand CLI selections: `all` is the whole catalogue in declared order,
/// duplicates are dropped.
pub fn select(names: &[String]) -> Result<Vec<WorkflowKind>, String> {
    let mut selected = Vec::new();
    for name in names {
        let kinds = if name.eq_ignore_ascii_case("all") {
            WorkflowKind::ALL.to_vec()
        } else {
            vec![name.parse()?]
        };
        for kind in kinds {
            if !selected.contains(&kind) {
                selected.push(kind);
            }
        }
    }
    Ok(selected)
}
