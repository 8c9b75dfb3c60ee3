//! Record creation followed by a filtered search for the new record.

use super::common;
use crate::backend::Driver;
use crate::error::InteractionError;
use crate::locator::{Cardinality, LocatorResolver, LocatorStrategy, Requirement};
use crate::orchestrator::{StepSpec, Workflow};
use crate::profile::Requirements;
use crate::scenario::ScenarioContent;
use crate::session::Session;
use crate::wait::Probe;
use async_trait::async_trait;
use holdfast_common::protocol::SpecialKey;
use std::fmt;
use tracing::{info, warn};

const LAST_NAME: &str = "Tester";
const JOINED_DATE: &str = "2024-01-15";
const LOGIN_PASSWORD: &str = "Password123!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeStep {
    Login,
    OpenAddEmployee,
    FillIdentity,
    AttachPhoto,
    CreateLogin,
    Save,
    JobDetails,
    ConfirmJobSaved,
    AssignSupervisor,
    OpenEmployeeList,
    FilterByStatus,
    FilterById,
    SearchAndVerify,
}

impl fmt::Display for EmployeeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EmployeeStep::Login => "login",
            EmployeeStep::OpenAddEmployee => "open add employee",
            EmployeeStep::FillIdentity => "fill identity",
            EmployeeStep::AttachPhoto => "attach photo",
            EmployeeStep::CreateLogin => "create login details",
            EmployeeStep::Save => "save employee",
            EmployeeStep::JobDetails => "job details",
            EmployeeStep::ConfirmJobSaved => "confirm job saved",
            EmployeeStep::AssignSupervisor => "assign supervisor",
            EmployeeStep::OpenEmployeeList => "open employee list",
            EmployeeStep::FilterByStatus => "filter by status",
            EmployeeStep::FilterById => "filter by id",
            EmployeeStep::SearchAndVerify => "search and verify",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchFilter {
    Id,
    Name,
}

#[derive(Debug, Default)]
pub struct EmployeeState {
    filter: Option<SearchFilter>,
}

pub struct EmployeeWorkflow {
    content: ScenarioContent,
}

impl EmployeeWorkflow {
    pub fn new(content: ScenarioContent) -> Self {
        Self { content }
    }

    fn first_name(&self) -> String {
        self.content.first_name("Auto")
    }

    async fn create_login(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        let toggle = session.target("employee.login_toggle")?;
        session.click(&toggle, &session.default_wait()).await?;

        let wait = session.default_wait();
        let username = session.labelled("form.input", "field.username")?;
        let password = session.labelled("form.input", "field.password")?;
        let confirm = session.labelled("form.input", "field.confirm_password")?;
        session
            .fill(&username, &self.content.username(), &wait)
            .await?;
        session.fill_secret(&password, LOGIN_PASSWORD, &wait).await?;
        session.fill_secret(&confirm, LOGIN_PASSWORD, &wait).await
    }

    async fn job_details(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        common::open_tab(session, "tab.job").await?;
        common::await_form_idle(session).await?;
        common::fill_date(session, "field.joined_date", JOINED_DATE).await?;
        for dropdown in ["field.job_title", "field.job_category", "field.location"] {
            common::select_first(session, dropdown).await?;
        }
        common::select_option(session, "field.employment_status", "option.employment_status")
            .await?;
        common::submit_form(session).await
    }

    /// Preferred supervisor first; any suggestion when the preferred name
    /// is not offered.
    async fn assign_supervisor(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        common::open_tab(session, "tab.report_to").await?;
        common::await_header(session, "header.report_to").await?;

        let add = session.target("employee.supervisor_add")?;
        session.click(&add, &session.default_wait()).await?;

        let preferred = session.label("supervisor.preferred")?;
        let hint = session.target("employee.hint_input")?;
        if common::pick_suggestion(session, &hint, preferred).await? {
            info!("Supervisor '{}' selected", preferred);
        }

        common::submit_form(session).await?;
        common::await_toast(session).await
    }

    async fn open_employee_list(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        common::open_menu(session, "menu.pim").await?;
        common::await_header(session, "header.employee_list").await?;
        Ok(())
    }

    async fn filter_by_id(
        &self,
        session: &mut Session<'_>,
        state: &mut EmployeeState,
    ) -> Result<(), InteractionError> {
        let id_field = session.labelled("form.input", "field.employee_id")?;
        match session
            .fill(&id_field, self.content.record_id(), &session.confirm_wait())
            .await
        {
            Ok(()) => {
                state.filter = Some(SearchFilter::Id);
                return Ok(());
            }
            Err(InteractionError::NotFound { .. }) => {
                warn!("Id filter not available; filtering by name");
            }
            Err(e) => return Err(e),
        }

        let name_field = session.labelled("form.input", "field.employee_name")?;
        let wait = session.default_wait();
        let full_name = format!("{} {}", self.first_name(), LAST_NAME);
        session.fill(&name_field, &full_name, &wait).await?;
        session.press(&name_field, SpecialKey::ArrowDown, &wait).await?;
        session.press(&name_field, SpecialKey::Enter, &wait).await?;
        state.filter = Some(SearchFilter::Name);
        Ok(())
    }

    async fn search_and_verify(
        &self,
        session: &mut Session<'_>,
        state: &EmployeeState,
    ) -> Result<(), InteractionError> {
        if state.filter.is_none() {
            return Err(InteractionError::Precondition("no search filter applied".into()));
        }
        common::submit_form(session).await?;

        let body = session.target("employee.table_body")?;
        session.present(&body, &session.default_wait()).await?;

        let probe = RowsWithId {
            rows: session.target("employee.rows")?,
            id_cell: session.target("employee.row_id_cell")?,
            id: self.content.record_id().to_string(),
        };
        let matching = session.await_probe(&probe, &session.default_wait()).await?;
        if matching != 1 {
            return Err(InteractionError::Precondition(format!(
                "expected exactly one row with id {}, found {}",
                self.content.record_id(),
                matching
            )));
        }
        info!(
            "Employee {} found by {:?} filter",
            self.content.record_id(),
            state.filter
        );
        Ok(())
    }
}

/// Opens the add-employee form. Shared with workflows that need a fresh record.
pub(crate) async fn open_add_employee(session: &mut Session<'_>) -> Result<(), InteractionError> {
    common::open_menu(session, "menu.pim").await?;
    common::open_tab(session, "tab.add_employee").await?;
    let first = session.target("employee.first_name")?;
    session.present(&first, &session.default_wait()).await?;
    Ok(())
}

pub(crate) async fn fill_identity(
    session: &mut Session<'_>,
    first_name: &str,
    record_id: &str,
) -> Result<(), InteractionError> {
    let wait = session.default_wait();
    let first = session.target("employee.first_name")?;
    let last = session.target("employee.last_name")?;
    let id = session.labelled("form.input", "field.employee_id")?;
    session.fill(&first, first_name, &wait).await?;
    session.fill(&last, LAST_NAME, &wait).await?;
    session.fill(&id, record_id, &wait).await?;
    info!("New employee {} {} (id {})", first_name, LAST_NAME, record_id);
    Ok(())
}

pub(crate) fn identity_requirements() -> Requirements {
    Requirements::new(
        &["employee.first_name", "employee.last_name"],
        &["menu.pim", "tab.add_employee", "field.employee_id"],
    )
}

/// Counts result rows whose id cell equals the expected id. Not satisfied
/// until at least one row matches.
struct RowsWithId {
    rows: LocatorStrategy,
    id_cell: LocatorStrategy,
    id: String,
}

#[async_trait]
impl Probe for RowsWithId {
    type Output = usize;

    async fn poll(&self, driver: &mut dyn Driver) -> Result<Option<usize>, InteractionError> {
        let Some(rows) = LocatorResolver::try_resolve(
            driver,
            &self.rows,
            Cardinality::All,
            Requirement::Present,
            None,
        )
        .await?
        else {
            return Ok(None);
        };

        let mut matching = 0;
        for row in &rows.handles {
            let Some(cell) = LocatorResolver::try_resolve(
                driver,
                &self.id_cell,
                Cardinality::One,
                Requirement::Present,
                Some(row),
            )
            .await?
            else {
                continue;
            };
            let text = driver
                .text(cell.first())
                .await
                .map_err(|e| InteractionError::from_driver(&self.id_cell.target, e))?;
            if text.trim() == self.id {
                matching += 1;
            }
        }
        Ok((matching > 0).then_some(matching))
    }

    fn describe(&self) -> String {
        format!("a result row with id {}", self.id)
    }
}

#[async_trait]
impl Workflow for EmployeeWorkflow {
    type Step = EmployeeStep;
    type State = EmployeeState;

    fn name(&self) -> &'static str {
        "employee"
    }

    fn scenario(&self) -> &ScenarioContent {
        &self.content
    }

    fn requirements(&self) -> Requirements {
        common::login_requirements()
            .and(common::form_requirements())
            .and(identity_requirements())
            .and(Requirements::new(
                &[
                    "form.file_input",
                    "form.option",
                    "employee.login_toggle",
                    "employee.supervisor_add",
                    "employee.hint_input",
                    "form.suggestion",
                    "form.any_suggestion",
                    "employee.table_body",
                    "employee.rows",
                    "employee.row_id_cell",
                ],
                &[
                    "tab.job",
                    "tab.report_to",
                    "header.report_to",
                    "header.employee_list",
                    "field.employee_name",
                    "field.username",
                    "field.password",
                    "field.confirm_password",
                    "field.joined_date",
                    "field.job_title",
                    "field.job_category",
                    "field.location",
                    "field.employment_status",
                    "option.employment_status",
                    "supervisor.preferred",
                ],
            ))
    }

    fn plan(&self) -> Vec<StepSpec<EmployeeStep>> {
        vec![
            StepSpec::hard(EmployeeStep::Login),
            StepSpec::hard(EmployeeStep::OpenAddEmployee),
            StepSpec::hard(EmployeeStep::FillIdentity),
            StepSpec::best_effort(EmployeeStep::AttachPhoto),
            StepSpec::hard(EmployeeStep::CreateLogin),
            StepSpec::hard(EmployeeStep::Save),
            StepSpec::best_effort(EmployeeStep::JobDetails),
            StepSpec::best_effort(EmployeeStep::ConfirmJobSaved),
            StepSpec::best_effort(EmployeeStep::AssignSupervisor),
            StepSpec::hard(EmployeeStep::OpenEmployeeList),
            StepSpec::best_effort(EmployeeStep::FilterByStatus),
            StepSpec::hard(EmployeeStep::FilterById),
            StepSpec::hard(EmployeeStep::SearchAndVerify),
        ]
    }

    async fn run_step(
        &self,
        step: EmployeeStep,
        session: &mut Session<'_>,
        state: &mut EmployeeState,
    ) -> Result<(), InteractionError> {
        match step {
            EmployeeStep::Login => common::login(session).await,
            EmployeeStep::OpenAddEmployee => open_add_employee(session).await,
            EmployeeStep::FillIdentity => {
                fill_identity(session, &self.first_name(), self.content.record_id()).await
            }
            EmployeeStep::AttachPhoto => {
                let image = &session.config().fixtures.image;
                let input = session.target("form.file_input")?;
                session.upload(&input, image, &session.confirm_wait()).await
            }
            EmployeeStep::CreateLogin => self.create_login(session).await,
            EmployeeStep::Save => {
                common::submit_form(session).await?;
                // The record exists once its detail tabs render.
                let job_tab = session.labelled("nav.tab", "tab.job")?;
                let result = session.present(&job_tab, &session.default_wait()).await;
                common::with_validation(session, result).await.map(|_| ())
            }
            EmployeeStep::JobDetails => self.job_details(session).await,
            EmployeeStep::ConfirmJobSaved => common::await_toast(session).await,
            EmployeeStep::AssignSupervisor => self.assign_supervisor(session).await,
            EmployeeStep::OpenEmployeeList => self.open_employee_list(session).await,
            EmployeeStep::FilterByStatus => {
                common::select_option(
                    session,
                    "field.employment_status",
                    "option.employment_status",
                )
                .await
            }
            EmployeeStep::FilterById => self.filter_by_id(session, state).await,
            EmployeeStep::SearchAndVerify => self.search_and_verify(session, state).await,
        }
    }
}
