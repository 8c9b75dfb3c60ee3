//! Candidate intake: add a candidate, shortlist them, schedule an interview.
//!
//! Only the candidate record and the shortlist action must land. Optional
//! form fields, the shortlist note and the whole interview stage degrade
//! on failure. When the interview stage is not offered, every interview
//! step reports it as unavailable instead of touching the page.

use super::common;
use crate::error::InteractionError;
use crate::orchestrator::{StepSpec, Workflow};
use crate::profile::Requirements;
use crate::scenario::ScenarioContent;
use crate::session::Session;
use async_trait::async_trait;
use std::fmt;
use tracing::{info, warn};

const MIDDLE_NAME: &str = "Auto";
const LAST_NAME: &str = "Tester";
const CONTACT_NUMBER: &str = "1234567890";
const KEYWORDS: &str = "selenium, automation, python";
const APPLICATION_DATE: &str = "2024-01-15";
const CANDIDATE_NOTES: &str = "Candidate created via automated test.";
const SHORTLIST_NOTES: &str = "Shortlisted via automated test.";
const INTERVIEW_TITLE: &str = "Automation Engineer Interview";
const INTERVIEW_DATE: &str = "2024-01-20";
const INTERVIEW_TIME: &str = "10:00";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecruitmentStep {
    Login,
    OpenAddCandidate,
    FillCandidate,
    SelectVacancy,
    Keywords,
    ApplicationDate,
    CandidateNotes,
    Consent,
    AttachResume,
    SaveCandidate,
    Shortlist,
    ShortlistNotes,
    SaveShortlist,
    OpenInterview,
    InterviewTitle,
    Interviewer,
    InterviewDate,
    InterviewTime,
    SaveInterview,
}

impl fmt::Display for RecruitmentStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecruitmentStep::Login => "login",
            RecruitmentStep::OpenAddCandidate => "open add candidate",
            RecruitmentStep::FillCandidate => "fill candidate",
            RecruitmentStep::SelectVacancy => "select vacancy",
            RecruitmentStep::Keywords => "keywords",
            RecruitmentStep::ApplicationDate => "application date",
            RecruitmentStep::CandidateNotes => "candidate notes",
            RecruitmentStep::Consent => "consent",
            RecruitmentStep::AttachResume => "attach resume",
            RecruitmentStep::SaveCandidate => "save candidate",
            RecruitmentStep::Shortlist => "shortlist",
            RecruitmentStep::ShortlistNotes => "shortlist notes",
            RecruitmentStep::SaveShortlist => "save shortlist",
            RecruitmentStep::OpenInterview => "open interview",
            RecruitmentStep::InterviewTitle => "interview title",
            RecruitmentStep::Interviewer => "interviewer",
            RecruitmentStep::InterviewDate => "interview date",
            RecruitmentStep::InterviewTime => "interview time",
            RecruitmentStep::SaveInterview => "save interview",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Default)]
pub struct RecruitmentState {
    interview_open: bool,
}

pub struct RecruitmentWorkflow {
    content: ScenarioContent,
}

impl RecruitmentWorkflow {
    pub fn new(content: ScenarioContent) -> Self {
        Self { content }
    }

    fn first_name(&self) -> String {
        self.content.first_name("Cand")
    }

    async fn open_add_candidate(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        common::open_menu(session, "menu.recruitment").await?;
        let add = session.target("recruitment.add")?;
        session.click(&add, &session.default_wait()).await?;
        common::await_header(session, "header.add_candidate").await?;
        Ok(())
    }

    async fn fill_candidate(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        let wait = session.default_wait();
        let first_name = self.first_name();
        let email = self.content.candidate_email();
        for (target, value) in [
            ("recruitment.first_name", first_name.as_str()),
            ("recruitment.middle_name", MIDDLE_NAME),
            ("recruitment.last_name", LAST_NAME),
        ] {
            let field = session.target(target)?;
            session.fill(&field, value, &wait).await?;
        }
        common::fill_labelled(session, "field.email", &email).await?;
        common::fill_labelled(session, "field.contact_number", CONTACT_NUMBER).await?;
        info!("New candidate {} {} <{}>", first_name, LAST_NAME, email);
        Ok(())
    }

    /// Leaves a date the form already proposes.
    async fn application_date(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        let field = session.labelled("form.input", "field.application_date")?;
        let handle = session.present(&field, &session.default_wait()).await?;
        let current = session.value(&handle).await?.unwrap_or_default();
        if current.trim().is_empty() {
            common::fill_date(session, "field.application_date", APPLICATION_DATE).await
        } else {
            info!("Application date already set to {}", current.trim());
            Ok(())
        }
    }

    async fn consent(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        let consent = session.target("recruitment.consent")?;
        let handle = session.present(&consent, &session.default_wait()).await?;
        if !session.is_selected(&handle).await.unwrap_or(false) {
            session.click_handle(&handle).await?;
        }
        Ok(())
    }

    async fn save_candidate(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        common::submit_form(session).await?;
        // The detail view with application stages replaces the form.
        let shortlist = session.target("recruitment.shortlist")?;
        let result = session.present(&shortlist, &session.default_wait()).await;
        common::with_validation(session, result).await?;
        info!("Candidate {} saved", self.first_name());
        Ok(())
    }

    async fn fill_notes(
        &self,
        session: &mut Session<'_>,
        notes: &str,
    ) -> Result<(), InteractionError> {
        let area = session.labelled("form.textarea", "field.notes")?;
        session.fill(&area, notes, &session.default_wait()).await
    }

    /// Saves a stage action. A missing toast only warns: the action may
    /// have gone through with an error banner instead.
    async fn save_action(
        &self,
        session: &mut Session<'_>,
        target: &str,
    ) -> Result<(), InteractionError> {
        let save = session.target(target)?;
        let result = session.click(&save, &session.default_wait()).await;
        common::with_validation(session, result).await?;
        match common::await_toast(session).await {
            Ok(()) => Ok(()),
            Err(InteractionError::NotFound { .. }) => {
                warn!("No confirmation after '{}'; continuing", target);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn open_interview(
        &self,
        session: &mut Session<'_>,
        state: &mut RecruitmentState,
    ) -> Result<(), InteractionError> {
        let schedule = session.target("recruitment.schedule_interview")?;
        session.click(&schedule, &session.default_wait()).await?;
        state.interview_open = true;
        Ok(())
    }

    async fn interviewer(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        let preferred = session.label("interviewer.preferred")?;
        let input = session.labelled("form.input", "field.interviewer")?;
        if common::pick_suggestion(session, &input, preferred).await? {
            info!("Interviewer '{}' selected", preferred);
        }
        Ok(())
    }
}

fn interview_stage(state: &RecruitmentState) -> Result<(), InteractionError> {
    if state.interview_open {
        Ok(())
    } else {
        Err(InteractionError::Precondition(
            "interview stage not available".into(),
        ))
    }
}

#[async_trait]
impl Workflow for RecruitmentWorkflow {
    type Step = RecruitmentStep;
    type State = RecruitmentState;

    fn name(&self) -> &'static str {
        "recruitment"
    }

    fn scenario(&self) -> &ScenarioContent {
        &self.content
    }

    fn requirements(&self) -> Requirements {
        common::login_requirements()
            .and(common::form_requirements())
            .and(Requirements::new(
                &[
                    "form.textarea",
                    "form.file_input",
                    "form.suggestion",
                    "form.any_suggestion",
                    "recruitment.add",
                    "recruitment.first_name",
                    "recruitment.middle_name",
                    "recruitment.last_name",
                    "recruitment.consent",
                    "recruitment.shortlist",
                    "recruitment.action_save",
                    "recruitment.schedule_interview",
                    "recruitment.interview_save",
                ],
                &[
                    "menu.recruitment",
                    "header.add_candidate",
                    "field.email",
                    "field.contact_number",
                    "field.vacancy",
                    "field.keywords",
                    "field.application_date",
                    "field.notes",
                    "field.interview_title",
                    "field.interviewer",
                    "field.interview_date",
                    "field.interview_time",
                    "interviewer.preferred",
                ],
            ))
    }

    fn plan(&self) -> Vec<StepSpec<RecruitmentStep>> {
        vec![
            StepSpec::hard(RecruitmentStep::Login),
            StepSpec::hard(RecruitmentStep::OpenAddCandidate),
            StepSpec::hard(RecruitmentStep::FillCandidate),
            StepSpec::best_effort(RecruitmentStep::SelectVacancy),
            StepSpec::best_effort(RecruitmentStep::Keywords),
            StepSpec::best_effort(RecruitmentStep::ApplicationDate),
            StepSpec::best_effort(RecruitmentStep::CandidateNotes),
            StepSpec::best_effort(RecruitmentStep::Consent),
            StepSpec::best_effort(RecruitmentStep::AttachResume),
            StepSpec::hard(RecruitmentStep::SaveCandidate),
            StepSpec::hard(RecruitmentStep::Shortlist),
            StepSpec::best_effort(RecruitmentStep::ShortlistNotes),
            StepSpec::best_effort(RecruitmentStep::SaveShortlist),
            StepSpec::best_effort(RecruitmentStep::OpenInterview),
            StepSpec::best_effort(RecruitmentStep::InterviewTitle),
            StepSpec::best_effort(RecruitmentStep::Interviewer),
            StepSpec::best_effort(RecruitmentStep::InterviewDate),
            StepSpec::best_effort(RecruitmentStep::InterviewTime),
            StepSpec::best_effort(RecruitmentStep::SaveInterview),
        ]
    }

    async fn run_step(
        &self,
        step: RecruitmentStep,
        session: &mut Session<'_>,
        state: &mut RecruitmentState,
    ) -> Result<(), InteractionError> {
        match step {
            RecruitmentStep::Login => common::login(session).await,
            RecruitmentStep::OpenAddCandidate => self.open_add_candidate(session).await,
            RecruitmentStep::FillCandidate => self.fill_candidate(session).await,
            RecruitmentStep::SelectVacancy => common::select_first(session, "field.vacancy").await,
            RecruitmentStep::Keywords => {
                common::fill_labelled(session, "field.keywords", KEYWORDS).await
            }
            RecruitmentStep::ApplicationDate => self.application_date(session).await,
            RecruitmentStep::CandidateNotes => self.fill_notes(session, CANDIDATE_NOTES).await,
            RecruitmentStep::Consent => self.consent(session).await,
            RecruitmentStep::AttachResume => {
                let resume = &session.config().fixtures.attachment;
                let input = session.target("form.file_input")?;
                session.upload(&input, resume, &session.confirm_wait()).await
            }
            RecruitmentStep::SaveCandidate => self.save_candidate(session).await,
            RecruitmentStep::Shortlist => {
                let shortlist = session.target("recruitment.shortlist")?;
                session.click(&shortlist, &session.default_wait()).await
            }
            RecruitmentStep::ShortlistNotes => self.fill_notes(session, SHORTLIST_NOTES).await,
            RecruitmentStep::SaveShortlist => {
                self.save_action(session, "recruitment.action_save").await
            }
            RecruitmentStep::OpenInterview => self.open_interview(session, state).await,
            RecruitmentStep::InterviewTitle => {
                interview_stage(state)?;
                common::fill_labelled(session, "field.interview_title", INTERVIEW_TITLE).await
            }
            RecruitmentStep::Interviewer => {
                interview_stage(state)?;
                self.interviewer(session).await
            }
            RecruitmentStep::InterviewDate => {
                interview_stage(state)?;
                common::fill_date(session, "field.interview_date", INTERVIEW_DATE).await
            }
            RecruitmentStep::InterviewTime => {
                interview_stage(state)?;
                common::fill_date(session, "field.interview_time", INTERVIEW_TIME).await
            }
            RecruitmentStep::SaveInterview => {
                interview_stage(state)?;
                self.save_action(session, "recruitment.interview_save").await
            }
        }
    }
}
