//! Report definition: criteria, display field groups, headers, save.

use super::common;
use crate::action::OptionChoice;
use crate::error::InteractionError;
use crate::orchestrator::{StepSpec, Workflow};
use crate::profile::Requirements;
use crate::scenario::ScenarioContent;
use crate::session::Session;
use crate::wait::CountEquals;
use async_trait::async_trait;
use std::fmt;
use tracing::{debug, info, warn};

const CRITERIA_TO_ADD: usize = 2;
const FIELDS_PER_GROUP: usize = 5;
const FIELDS_TO_DELETE: usize = 3;
/// Guards the delete loops against a row that never goes away.
const MAX_DELETIONS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    Personal,
    Contact,
    Job,
    Salary,
}

impl FieldGroup {
    const ALL: [FieldGroup; 4] = [
        FieldGroup::Personal,
        FieldGroup::Contact,
        FieldGroup::Job,
        FieldGroup::Salary,
    ];

    fn label_key(&self) -> &'static str {
        match self {
            FieldGroup::Personal => "group.personal",
            FieldGroup::Contact => "group.contact",
            FieldGroup::Job => "group.job",
            FieldGroup::Salary => "group.salary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PastEnd {
    TakeFirst,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStep {
    Login,
    OpenDefineReport,
    NameReport,
    IncludeOption,
    AddCriteria,
    DeleteCriteria,
    DisplayGroup(FieldGroup),
    IncludeHeaders,
    DeleteDisplayFields,
    Save,
    ConfirmSaved,
}

impl fmt::Display for ReportStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportStep::Login => write!(f, "login"),
            ReportStep::OpenDefineReport => write!(f, "open define report"),
            ReportStep::NameReport => write!(f, "name report"),
            ReportStep::IncludeOption => write!(f, "include option"),
            ReportStep::AddCriteria => write!(f, "add criteria"),
            ReportStep::DeleteCriteria => write!(f, "delete criteria"),
            ReportStep::DisplayGroup(group) => write!(f, "display group {:?}", group),
            ReportStep::IncludeHeaders => write!(f, "include headers"),
            ReportStep::DeleteDisplayFields => write!(f, "delete display fields"),
            ReportStep::Save => write!(f, "save report"),
            ReportStep::ConfirmSaved => write!(f, "confirm saved"),
        }
    }
}

#[derive(Debug, Default)]
pub struct ReportState {
    display_fields: usize,
}

pub struct PimReportWorkflow {
    content: ScenarioContent,
}

impl PimReportWorkflow {
    pub fn new(content: ScenarioContent) -> Self {
        Self { content }
    }

    async fn open_define_report(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        common::open_menu(session, "menu.pim").await?;
        let reports = session.target("report.reports_link")?;
        session.click(&reports, &session.default_wait()).await?;
        let add = session.target("report.add")?;
        session.click(&add, &session.default_wait()).await?;

        let header = session.target("report.define_header")?;
        match session.present(&header, &session.default_wait()).await {
            Ok(_) => Ok(()),
            Err(InteractionError::NotFound { .. }) => {
                // The demo sometimes lands on the report list instead.
                warn!("Define Report page did not open; navigating directly");
                let path = session.label("path.define_report")?;
                session.navigate(path).await?;
                let any = session.target("report.any_header")?;
                session.present(&any, &session.default_wait()).await?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn name_report(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        let name = session.labelled("form.input_after_label", "field.report_name")?;
        let report_name = self.content.report_name();
        session
            .fill(&name, &report_name, &session.default_wait())
            .await?;
        info!("Report name: {}", report_name);
        Ok(())
    }

    async fn include_option(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        let dropdown = session.labelled("report.select", "field.include")?;
        let option = session.target_with("form.option", &[("text", session.label("option.include")?)])?;
        session
            .select(&dropdown, OptionChoice::Matching(option), &session.default_wait())
            .await
    }

    /// Open a dropdown and click the `index`-th option. When fewer are
    /// offered, `past_end` decides between the first option and nothing;
    /// returns whether an option was clicked.
    async fn pick_nth_option(
        &self,
        session: &mut Session<'_>,
        dropdown_target: &str,
        label_key: &str,
        index: usize,
        past_end: PastEnd,
    ) -> Result<bool, InteractionError> {
        let dropdown = session.labelled(dropdown_target, label_key)?;
        session.click(&dropdown, &session.default_wait()).await?;
        let any = session.target("form.any_option")?;
        let options = session.all_present(&any, &session.confirm_wait()).await?;
        let option = match (options.get(index), past_end) {
            (Some(option), _) => option,
            (None, PastEnd::TakeFirst) => match options.first() {
                Some(first) => first,
                None => {
                    return Err(InteractionError::NotFound {
                        target: any.target.clone(),
                        attempted: any.describe_queries(),
                        waited_ms: 0,
                    });
                }
            },
            (None, PastEnd::Stop) => return Ok(false),
        };
        session.click_handle(option).await?;
        Ok(true)
    }

    async fn add_criteria(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        let add = session.target("report.add_criteria")?;
        for i in 0..CRITERIA_TO_ADD {
            self.pick_nth_option(
                session,
                "report.select",
                "field.selection_criteria",
                i,
                PastEnd::TakeFirst,
            )
            .await?;
            session.click(&add, &session.default_wait()).await?;
            session.settle().await;
        }
        Ok(())
    }

    /// Click the first matching delete button until none is left, waiting
    /// for each row to disappear before the next click.
    async fn delete_criteria(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        let delete = session.target("report.criteria_delete")?;
        for _ in 0..MAX_DELETIONS {
            let buttons = session.find_all(&delete, None).await?;
            let Some(first) = buttons.first() else {
                return Ok(());
            };
            session.click_handle(first).await?;
            let probe = CountEquals {
                strategy: delete.clone(),
                expected: buttons.len() - 1,
            };
            session.await_probe(&probe, &session.refresh_wait()).await?;
        }
        Err(InteractionError::Precondition(
            "criteria rows kept reappearing".into(),
        ))
    }

    async fn display_group(
        &self,
        session: &mut Session<'_>,
        state: &mut ReportState,
        group: FieldGroup,
    ) -> Result<(), InteractionError> {
        let group_select = session.labelled("report.select", "field.display_fields")?;
        session
            .click(&group_select, &session.default_wait())
            .await?;

        let label = session.label(group.label_key())?;
        let named = session.target_with("form.option", &[("text", label)])?;
        match session.click(&named, &session.confirm_wait()).await {
            Ok(()) => debug!("Group '{}' selected", label),
            Err(InteractionError::NotFound { .. }) => {
                warn!("Group '{}' not offered; taking the first group", label);
                let any = session.target("form.any_option")?;
                session.click(&any, &session.confirm_wait()).await?;
            }
            Err(e) => return Err(e),
        }

        let add = session.target("report.add_display_field")?;
        let mut added = 0;
        for k in 0..FIELDS_PER_GROUP {
            let picked = self
                .pick_nth_option(
                    session,
                    "report.field_select",
                    "field.display_fields",
                    k,
                    PastEnd::Stop,
                )
                .await;
            match picked {
                Ok(true) => {}
                Ok(false) => {
                    debug!("Group '{}' offers {} field(s)", label, k);
                    break;
                }
                // An empty or missing field list ends the group; anything
                // else is a real failure.
                Err(InteractionError::NotFound { target, .. }) => {
                    debug!("No more fields in group '{}': {} not found", label, target);
                    break;
                }
                Err(e) => return Err(e),
            }
            session.click(&add, &session.default_wait()).await?;
            session.settle().await;
            added += 1;
        }

        if added == 0 {
            return Err(InteractionError::Precondition(format!(
                "no display field could be added from group '{}'",
                label
            )));
        }
        state.display_fields += added;
        info!(
            "Added {} field(s) from '{}' ({} total)",
            added, label, state.display_fields
        );
        Ok(())
    }

    async fn include_headers(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        let checkbox = session.target("report.include_header")?;
        let boxes = session.all_present(&checkbox, &session.confirm_wait()).await?;
        for handle in &boxes {
            if !session.is_selected(handle).await.unwrap_or(false) {
                session.click_handle(handle).await?;
            }
        }
        Ok(())
    }

    async fn delete_display_fields(
        &self,
        session: &mut Session<'_>,
        state: &mut ReportState,
    ) -> Result<(), InteractionError> {
        let rows = session.target("report.display_rows")?;
        let delete = session.target("report.row_delete")?;
        for _ in 0..FIELDS_TO_DELETE {
            let current = session.find_all(&rows, None).await?;
            let Some(row) = current.first() else {
                break;
            };
            let buttons = session.find_all(&delete, Some(row)).await?;
            let Some(button) = buttons.last() else {
                return Err(InteractionError::NotFound {
                    target: delete.target.clone(),
                    attempted: delete.describe_queries(),
                    waited_ms: 0,
                });
            };
            session.click_handle(button).await?;
            let probe = CountEquals {
                strategy: rows.clone(),
                expected: current.len() - 1,
            };
            session.await_probe(&probe, &session.refresh_wait()).await?;
            state.display_fields = state.display_fields.saturating_sub(1);
        }
        Ok(())
    }
}

#[async_trait]
impl Workflow for PimReportWorkflow {
    type Step = ReportStep;
    type State = ReportState;

    fn name(&self) -> &'static str {
        "pim-report"
    }

    fn scenario(&self) -> &ScenarioContent {
        &self.content
    }

    fn requirements(&self) -> Requirements {
        let groups: Vec<&'static str> = FieldGroup::ALL.iter().map(|g| g.label_key()).collect();
        common::login_requirements()
            .and(Requirements::new(
                &[
                    "nav.menu",
                    "form.input_after_label",
                    "form.option",
                    "form.any_option",
                    "report.reports_link",
                    "report.add",
                    "report.define_header",
                    "report.any_header",
                    "report.select",
                    "report.field_select",
                    "report.add_criteria",
                    "report.criteria_delete",
                    "report.add_display_field",
                    "report.display_rows",
                    "report.row_delete",
                    "report.include_header",
                    "report.save",
                    "report.list_header",
                ],
                &[
                    "menu.pim",
                    "path.define_report",
                    "field.report_name",
                    "field.include",
                    "field.selection_criteria",
                    "field.display_fields",
                    "option.include",
                ],
            ))
            .and(Requirements::new(&[], &groups))
    }

    fn plan(&self) -> Vec<StepSpec<ReportStep>> {
        let mut plan = vec![
            StepSpec::hard(ReportStep::Login),
            StepSpec::hard(ReportStep::OpenDefineReport),
            StepSpec::hard(ReportStep::NameReport),
            StepSpec::best_effort(ReportStep::IncludeOption),
            StepSpec::best_effort(ReportStep::AddCriteria),
            StepSpec::best_effort(ReportStep::DeleteCriteria),
        ];
        plan.extend(
            FieldGroup::ALL
                .into_iter()
                .map(|group| StepSpec::best_effort(ReportStep::DisplayGroup(group))),
        );
        plan.extend([
            StepSpec::best_effort(ReportStep::IncludeHeaders),
            StepSpec::best_effort(ReportStep::DeleteDisplayFields),
            StepSpec::hard(ReportStep::Save),
            StepSpec::best_effort(ReportStep::ConfirmSaved),
        ]);
        plan
    }

    async fn run_step(
        &self,
        step: ReportStep,
        session: &mut Session<'_>,
        state: &mut ReportState,
    ) -> Result<(), InteractionError> {
        match step {
            ReportStep::Login => common::login(session).await,
            ReportStep::OpenDefineReport => self.open_define_report(session).await,
            ReportStep::NameReport => self.name_report(session).await,
            ReportStep::IncludeOption => self.include_option(session).await,
            ReportStep::AddCriteria => self.add_criteria(session).await,
            ReportStep::DeleteCriteria => self.delete_criteria(session).await,
            ReportStep::DisplayGroup(group) => self.display_group(session, state, group).await,
            ReportStep::IncludeHeaders => self.include_headers(session).await,
            ReportStep::DeleteDisplayFields => self.delete_display_fields(session, state).await,
            ReportStep::Save => {
                let save = session.target("report.save")?;
                let result = session.click(&save, &session.default_wait()).await;
                common::with_validation(session, result).await
            }
            ReportStep::ConfirmSaved => {
                let listing = session.target("report.list_header")?;
                session.present(&listing, &session.default_wait()).await?;
                Ok(())
            }
        }
    }
}
