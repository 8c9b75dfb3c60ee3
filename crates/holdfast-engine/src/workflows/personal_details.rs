//! Personal details and attachments of a freshly created record.

use super::common;
use super::employee::{fill_identity, identity_requirements, open_add_employee};
use crate::error::InteractionError;
use crate::orchestrator::{StepSpec, Workflow};
use crate::profile::Requirements;
use crate::scenario::ScenarioContent;
use crate::session::Session;
use crate::wait::{CountEquals, FileAppears};
use async_trait::async_trait;
use holdfast_common::protocol::ElementHandle;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

const IMAGE_COMMENT: &str = "Profile image attachment";
const TEXT_COMMENT: &str = "Text attachment for test";
const UPDATED_COMMENT: &str = "Updated attachment comment";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalField {
    NickName,
    OtherId,
    LicenseNumber,
    Ssn,
    Sin,
    MilitaryService,
    LicenseExpiry,
    Nationality,
    MaritalStatus,
    DateOfBirth,
    Gender,
    Smoker,
}

enum FieldInput {
    Text(&'static str),
    Date(&'static str),
    FirstOption,
    Radio,
    Checkbox,
}

impl PersonalField {
    const ALL: [PersonalField; 12] = [
        PersonalField::NickName,
        PersonalField::OtherId,
        PersonalField::LicenseNumber,
        PersonalField::Ssn,
        PersonalField::Sin,
        PersonalField::MilitaryService,
        PersonalField::LicenseExpiry,
        PersonalField::Nationality,
        PersonalField::MaritalStatus,
        PersonalField::DateOfBirth,
        PersonalField::Gender,
        PersonalField::Smoker,
    ];

    fn label_key(&self) -> &'static str {
        match self {
            PersonalField::NickName => "field.nick_name",
            PersonalField::OtherId => "field.other_id",
            PersonalField::LicenseNumber => "field.license_number",
            PersonalField::Ssn => "field.ssn",
            PersonalField::Sin => "field.sin",
            PersonalField::MilitaryService => "field.military_service",
            PersonalField::LicenseExpiry => "field.license_expiry",
            PersonalField::Nationality => "field.nationality",
            PersonalField::MaritalStatus => "field.marital_status",
            PersonalField::DateOfBirth => "field.date_of_birth",
            PersonalField::Gender => "field.gender",
            PersonalField::Smoker => "field.smoker",
        }
    }

    fn input(&self) -> FieldInput {
        match self {
            PersonalField::NickName => FieldInput::Text("PD Nick"),
            PersonalField::OtherId => FieldInput::Text("OID-12345"),
            PersonalField::LicenseNumber => FieldInput::Text("D-987654321"),
            PersonalField::Ssn => FieldInput::Text("123-45-6789"),
            PersonalField::Sin => FieldInput::Text("987-65-4321"),
            PersonalField::MilitaryService => FieldInput::Text("None"),
            PersonalField::LicenseExpiry => FieldInput::Date("2030-12-31"),
            PersonalField::Nationality | PersonalField::MaritalStatus => FieldInput::FirstOption,
            PersonalField::DateOfBirth => FieldInput::Date("1990-01-01"),
            PersonalField::Gender => FieldInput::Radio,
            PersonalField::Smoker => FieldInput::Checkbox,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalStep {
    Login,
    CreateEmployee,
    Field(PersonalField),
    SavePersonal,
    ConfirmSaved,
    AddImageAttachment,
    AddTextAttachment,
    EditAttachmentComment,
    DownloadAttachment,
    DeleteAttachment,
}

impl fmt::Display for PersonalStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonalStep::Login => write!(f, "login"),
            PersonalStep::CreateEmployee => write!(f, "create employee"),
            PersonalStep::Field(field) => write!(f, "set {:?}", field),
            PersonalStep::SavePersonal => write!(f, "save personal details"),
            PersonalStep::ConfirmSaved => write!(f, "confirm saved"),
            PersonalStep::AddImageAttachment => write!(f, "add image attachment"),
            PersonalStep::AddTextAttachment => write!(f, "add text attachment"),
            PersonalStep::EditAttachmentComment => write!(f, "edit attachment comment"),
            PersonalStep::DownloadAttachment => write!(f, "download attachment"),
            PersonalStep::DeleteAttachment => write!(f, "delete attachment"),
        }
    }
}

pub struct PersonalDetailsWorkflow {
    content: ScenarioContent,
}

impl PersonalDetailsWorkflow {
    pub fn new(content: ScenarioContent) -> Self {
        Self { content }
    }

    async fn create_employee(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        open_add_employee(session).await?;
        fill_identity(
            session,
            &self.content.first_name("PD"),
            self.content.record_id(),
        )
        .await?;
        common::submit_form(session).await?;

        let header = session.labelled("page.header", "header.personal_details")?;
        let result = session.present(&header, &session.default_wait()).await;
        common::with_validation(session, result).await?;
        if let Some(url) = session.current_url().await {
            info!("Personal details at {}", url);
        }
        Ok(())
    }

    async fn set_field(
        &self,
        session: &mut Session<'_>,
        field: PersonalField,
    ) -> Result<(), InteractionError> {
        let key = field.label_key();
        match field.input() {
            FieldInput::Text(value) => common::fill_labelled(session, key, value).await,
            FieldInput::Date(value) => common::fill_date(session, key, value).await,
            FieldInput::FirstOption => common::select_first(session, key).await,
            FieldInput::Radio => {
                let radio = session.labelled("form.radio", key)?;
                session.click(&radio, &session.default_wait()).await
            }
            FieldInput::Checkbox => {
                let checkbox = session.labelled("form.checkbox", key)?;
                let handle = session.present(&checkbox, &session.default_wait()).await?;
                if !session.is_selected(&handle).await.unwrap_or(false) {
                    session.click_handle(&handle).await?;
                }
                Ok(())
            }
        }
    }

    async fn add_attachment(
        &self,
        session: &mut Session<'_>,
        file: &Path,
        comment: &str,
    ) -> Result<(), InteractionError> {
        let rows = session.target("attachment.rows")?;
        let before = session.find_all(&rows, None).await?.len();

        let add = session.target("attachment.add")?;
        session.click(&add, &session.default_wait()).await?;

        let wait = session.default_wait();
        let input = session.target("attachment.file_input")?;
        session.upload(&input, file, &wait).await?;
        let comment_area = session.target("attachment.comment")?;
        session.fill(&comment_area, comment, &wait).await?;
        let save = session.target("attachment.save")?;
        session.click(&save, &wait).await?;

        let probe = CountEquals {
            strategy: rows,
            expected: before + 1,
        };
        session.await_probe(&probe, &session.refresh_wait()).await?;
        info!("Attached {} ({} rows)", file.display(), before + 1);
        Ok(())
    }

    /// The first attachment row. Fails when no attachment exists, so the
    /// steps after a failed upload degrade instead of acting on nothing.
    async fn first_row(&self, session: &mut Session<'_>) -> Result<ElementHandle, InteractionError> {
        let rows = session.target("attachment.rows")?;
        let all = session.all_present(&rows, &session.confirm_wait()).await?;
        all.into_iter()
            .next()
            .ok_or_else(|| InteractionError::Precondition("no attachment rows".into()))
    }

    async fn edit_comment(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        let row = self.first_row(session).await?;
        let edit = session.target("attachment.row_edit")?;
        let button = session
            .present_within(&edit, &row, &session.default_wait())
            .await?;
        session.click_handle(&button).await?;

        let wait = session.default_wait();
        let comment_area = session.target("attachment.comment")?;
        session.fill(&comment_area, UPDATED_COMMENT, &wait).await?;
        let save = session.target("attachment.save")?;
        session.click(&save, &wait).await?;
        common::await_toast(session).await
    }

    async fn download(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        let download_dir = session.config().browser.download_dir.as_deref().ok_or_else(|| {
            InteractionError::Precondition("no download directory configured".into())
        })?;

        let row = self.first_row(session).await?;
        let link_target = session.target("attachment.row_link")?;
        let link = session
            .present_within(&link_target, &row, &session.default_wait())
            .await?;

        let shown = session.text(&link).await.unwrap_or_default();
        let file_name = match shown.trim() {
            "" => session
                .config()
                .fixtures
                .image
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| InteractionError::Precondition("no file name to wait for".into()))?,
            name => name.to_string(),
        };
        session.click_handle(&link).await?;

        // The final name only appears once the browser finished writing it.
        let probe = FileAppears {
            path: download_dir.join(&file_name),
        };
        let path = session.await_probe(&probe, &session.refresh_wait()).await?;
        info!("Downloaded {}", path.display());
        Ok(())
    }

    async fn delete_attachment(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        let rows = session.target("attachment.rows")?;
        let before = session.find_all(&rows, None).await?.len();
        let row = self.first_row(session).await?;

        let delete = session.target("attachment.row_delete")?;
        let button = session
            .present_within(&delete, &row, &session.default_wait())
            .await?;
        session.click_handle(&button).await?;
        common::confirm_delete(session).await?;

        let probe = CountEquals {
            strategy: rows,
            expected: before.saturating_sub(1),
        };
        if let Err(e) = common::await_toast(session).await {
            warn!("No toast after delete: {}", e);
        }
        session.await_probe(&probe, &session.refresh_wait()).await
    }
}

#[async_trait]
impl Workflow for PersonalDetailsWorkflow {
    type Step = PersonalStep;
    type State = ();

    fn name(&self) -> &'static str {
        "personal-details"
    }

    fn scenario(&self) -> &ScenarioContent {
        &self.content
    }

    fn requirements(&self) -> Requirements {
        let labels: Vec<&'static str> = PersonalField::ALL.iter().map(|f| f.label_key()).collect();
        common::login_requirements()
            .and(common::form_requirements())
            .and(identity_requirements())
            .and(Requirements::new(
                &[
                    "form.first_submit",
                    "form.radio",
                    "form.checkbox",
                    "dialog.confirm_delete",
                    "attachment.add",
                    "attachment.file_input",
                    "attachment.comment",
                    "attachment.save",
                    "attachment.rows",
                    "attachment.row_edit",
                    "attachment.row_delete",
                    "attachment.row_link",
                ],
                &["header.personal_details"],
            ))
            .and(Requirements::new(&[], &labels))
    }

    fn plan(&self) -> Vec<StepSpec<PersonalStep>> {
        let mut plan = vec![
            StepSpec::hard(PersonalStep::Login),
            StepSpec::hard(PersonalStep::CreateEmployee),
        ];
        plan.extend(
            PersonalField::ALL
                .into_iter()
                .map(|field| StepSpec::best_effort(PersonalStep::Field(field))),
        );
        plan.extend([
            StepSpec::hard(PersonalStep::SavePersonal),
            StepSpec::best_effort(PersonalStep::ConfirmSaved),
            StepSpec::best_effort(PersonalStep::AddImageAttachment),
            StepSpec::best_effort(PersonalStep::AddTextAttachment),
            StepSpec::best_effort(PersonalStep::EditAttachmentComment),
            StepSpec::best_effort(PersonalStep::DownloadAttachment),
            StepSpec::best_effort(PersonalStep::DeleteAttachment),
        ]);
        plan
    }

    async fn run_step(
        &self,
        step: PersonalStep,
        session: &mut Session<'_>,
        _state: &mut (),
    ) -> Result<(), InteractionError> {
        match step {
            PersonalStep::Login => common::login(session).await,
            PersonalStep::CreateEmployee => self.create_employee(session).await,
            PersonalStep::Field(field) => self.set_field(session, field).await,
            PersonalStep::SavePersonal => {
                let save = session.target("form.first_submit")?;
                let result = session.click(&save, &session.default_wait()).await;
                common::with_validation(session, result).await
            }
            PersonalStep::ConfirmSaved => common::await_toast(session).await,
            PersonalStep::AddImageAttachment => {
                let image = &session.config().fixtures.image;
                self.add_attachment(session, image, IMAGE_COMMENT).await
            }
            PersonalStep::AddTextAttachment => {
                let text = &session.config().fixtures.attachment;
                self.add_attachment(session, text, TEXT_COMMENT).await
            }
            PersonalStep::EditAttachmentComment => self.edit_comment(session).await,
            PersonalStep::DownloadAttachment => self.download(session).await,
            PersonalStep::DeleteAttachment => self.delete_attachment(session).await,
        }
    }
}
