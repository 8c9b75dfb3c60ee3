//! Feed post lifecycle: post, like, edit, comment, clean up.

use super::common::{self, choose_menu_entry, confirm_delete};
use crate::error::InteractionError;
use crate::locator::LocatorStrategy;
use crate::orchestrator::{StepSpec, Workflow};
use crate::profile::Requirements;
use crate::refresh::Captured;
use crate::scenario::ScenarioContent;
use crate::session::Session;
use crate::wait::TextChanges;
use async_trait::async_trait;
use holdfast_common::protocol::{ElementHandle, SpecialKey};
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzStep {
    Login,
    OpenFeed,
    ComposePost,
    AttachImage,
    SubmitPost,
    LocatePost,
    LikePost,
    EditPost,
    AddComment,
    LikeComment,
    EditComment,
    DeleteComment,
    DeletePost,
    VerifyCleanup,
}

impl fmt::Display for BuzzStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuzzStep::Login => "login",
            BuzzStep::OpenFeed => "open feed",
            BuzzStep::ComposePost => "compose post",
            BuzzStep::AttachImage => "attach image",
            BuzzStep::SubmitPost => "submit post",
            BuzzStep::LocatePost => "locate new post",
            BuzzStep::LikePost => "like post",
            BuzzStep::EditPost => "edit post",
            BuzzStep::AddComment => "add comment",
            BuzzStep::LikeComment => "like comment",
            BuzzStep::EditComment => "edit comment",
            BuzzStep::DeleteComment => "delete comment",
            BuzzStep::DeletePost => "delete post",
            BuzzStep::VerifyCleanup => "verify cleanup",
        };
        write!(f, "{}", name)
    }
}

/// Last known texts of the post and comment. Handles are never kept
/// across steps; each step re-resolves from these.
#[derive(Debug, Default)]
pub struct BuzzState {
    post_text: Option<String>,
    comment_text: Option<String>,
}

pub struct BuzzWorkflow {
    content: ScenarioContent,
}

impl BuzzWorkflow {
    pub fn new(content: ScenarioContent) -> Self {
        Self { content }
    }

    async fn open_feed(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        common::open_menu(session, "menu.buzz").await?;
        common::await_header(session, "header.buzz").await?;
        Ok(())
    }

    async fn compose_post(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        let input = session.target("buzz.post_input")?;
        session
            .fill(&input, &self.content.post_message(), &session.default_wait())
            .await
    }

    async fn attach_image(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        let image = &session.config().fixtures.image;
        let photo = session.target("buzz.photo_button")?;
        session.click(&photo, &session.confirm_wait()).await?;
        let file_input = session.target("form.file_input")?;
        session
            .upload(&file_input, image, &session.confirm_wait())
            .await
    }

    async fn submit_post(
        &self,
        session: &mut Session<'_>,
        state: &mut BuzzState,
    ) -> Result<(), InteractionError> {
        let top = session.target("buzz.top_post")?;
        let captured = session.capture(&top).await?;

        let submit = session.target("buzz.post_submit")?;
        session.click(&submit, &session.default_wait()).await?;

        // An empty feed has nothing to invalidate; the next step still
        // re-resolves the top card either way.
        session.await_refresh(captured, &session.refresh_wait()).await;
        state.post_text = Some(self.content.post_message());
        Ok(())
    }

    async fn locate_post(
        &self,
        session: &mut Session<'_>,
        state: &BuzzState,
    ) -> Result<(), InteractionError> {
        let top = session.target("buzz.top_post")?;
        let card = session.present(&top, &session.refresh_wait()).await?;
        let text = session.text(&card).await?;
        if text.contains(&self.content.post_message()) {
            info!("New post is the top card {}", card);
            return Ok(());
        }

        // The feed may order by something other than recency.
        warn!("Top card does not hold the new post; searching the feed");
        let post = self.current_post(session, state).await?;
        info!("New post is {} ({})", post, post.origin);
        Ok(())
    }

    /// The post card holding our current text.
    async fn current_post(
        &self,
        session: &mut Session<'_>,
        state: &BuzzState,
    ) -> Result<ElementHandle, InteractionError> {
        let text = state
            .post_text
            .as_deref()
            .ok_or_else(|| InteractionError::Precondition("no post was submitted".into()))?;
        let post = session.target_with("buzz.post_with_text", &[("text", text)])?;
        session.present(&post, &session.refresh_wait()).await
    }

    /// The comment block holding our current comment text.
    async fn current_comment(
        &self,
        session: &mut Session<'_>,
        state: &BuzzState,
    ) -> Result<ElementHandle, InteractionError> {
        let text = state
            .comment_text
            .as_deref()
            .ok_or_else(|| InteractionError::Precondition("no comment was added".into()))?;
        let comment = session.target_with("buzz.comment_with_text", &[("text", text)])?;
        session.present(&comment, &session.confirm_wait()).await
    }

    async fn toggle_like(
        &self,
        session: &mut Session<'_>,
        scope: &ElementHandle,
    ) -> Result<(), InteractionError> {
        let like = session.target("buzz.like_button")?;
        let wait = session.default_wait();
        let button = session.present_within(&like, scope, &wait).await?;
        let before = session.text(&button).await?;
        session.click_handle(&button).await?;

        let probe = TextChanges {
            strategy: like,
            scope: Some(scope.clone()),
            from: before.clone(),
        };
        let after = session.await_probe(&probe, &session.confirm_wait()).await?;
        info!("Like toggled: '{}' -> '{}'", before.trim(), after);
        Ok(())
    }

    async fn open_item_menu(
        &self,
        session: &mut Session<'_>,
        scope: &ElementHandle,
        entry_key: &str,
    ) -> Result<(), InteractionError> {
        let more = session.target("buzz.more_button")?;
        let button = session
            .present_within(&more, scope, &session.default_wait())
            .await?;
        session.click_handle(&button).await?;
        choose_menu_entry(session, entry_key).await
    }

    async fn edit_post(
        &self,
        session: &mut Session<'_>,
        state: &mut BuzzState,
    ) -> Result<(), InteractionError> {
        let post = self.current_post(session, state).await?;
        self.open_item_menu(session, &post, "menu.edit").await?;

        let updated = self.content.updated_post_message();
        let input = session.target("buzz.edit_input")?;
        session.fill(&input, &updated, &session.default_wait()).await?;

        let captured = Captured::new("buzz.post_with_text", post);
        let save = session.target("buzz.edit_save")?;
        session.click(&save, &session.default_wait()).await?;
        session.await_refresh(Some(captured), &session.refresh_wait()).await;

        let edited = session.target_with("buzz.post_with_text", &[("text", &updated)])?;
        session.present(&edited, &session.refresh_wait()).await?;
        state.post_text = Some(updated);
        Ok(())
    }

    async fn add_comment(
        &self,
        session: &mut Session<'_>,
        state: &mut BuzzState,
    ) -> Result<(), InteractionError> {
        let post = self.current_post(session, state).await?;
        let comment = self.content.comment();

        let inline = session.target("buzz.comment_input")?;
        let input = match session.present(&inline, &session.confirm_wait()).await {
            Ok(_) => inline,
            Err(InteractionError::NotFound { .. }) => {
                warn!("No inline comment input; opening the comment box");
                let toggle = session.target("buzz.comment_toggle")?;
                let button = session
                    .present_within(&toggle, &post, &session.default_wait())
                    .await?;
                session.click_handle(&button).await?;
                session.target("buzz.comment_area")?.or(&inline)
            }
            Err(e) => return Err(e),
        };

        self.write_comment(session, &input, &comment).await?;
        state.comment_text = Some(comment);
        Ok(())
    }

    /// Type a comment, submit with Enter and wait for it to render.
    async fn write_comment(
        &self,
        session: &mut Session<'_>,
        input: &LocatorStrategy,
        text: &str,
    ) -> Result<(), InteractionError> {
        let wait = session.default_wait();
        session.fill(input, text, &wait).await?;
        session.press(input, SpecialKey::Enter, &wait).await?;

        let rendered = session.target_with("buzz.comment_with_text", &[("text", text)])?;
        session.present(&rendered, &session.refresh_wait()).await?;
        Ok(())
    }

    async fn edit_comment(
        &self,
        session: &mut Session<'_>,
        state: &mut BuzzState,
    ) -> Result<(), InteractionError> {
        let block = self.current_comment(session, state).await?;
        self.open_item_menu(session, &block, "menu.edit").await?;

        let updated = self.content.updated_comment();
        let area = session.target("buzz.comment_area")?;
        self.write_comment(session, &area, &updated).await?;
        state.comment_text = Some(updated);
        Ok(())
    }

    async fn delete_comment(
        &self,
        session: &mut Session<'_>,
        state: &mut BuzzState,
    ) -> Result<(), InteractionError> {
        let block = self.current_comment(session, state).await?;
        let captured = Captured::new("buzz.comment_with_text", block.clone());
        self.open_item_menu(session, &block, "menu.delete").await?;
        confirm_delete(session).await?;
        session.await_refresh(Some(captured), &session.refresh_wait()).await;

        let any_ours = self.comment_matches(session)?;
        session.absent(&any_ours, &session.refresh_wait()).await?;
        state.comment_text = None;
        Ok(())
    }

    async fn delete_post(
        &self,
        session: &mut Session<'_>,
        state: &mut BuzzState,
    ) -> Result<(), InteractionError> {
        let post = self.current_post(session, state).await?;
        let captured = Captured::new("buzz.post_with_text", post.clone());
        self.open_item_menu(session, &post, "menu.delete").await?;
        confirm_delete(session).await?;
        session
            .await_invalidated(captured, &session.refresh_wait())
            .await?;
        state.post_text = None;
        Ok(())
    }

    async fn verify_cleanup(&self, session: &mut Session<'_>) -> Result<(), InteractionError> {
        let comments = self.comment_matches(session)?;
        let posts = session
            .target_with("buzz.post_with_text", &[("text", &self.content.post_message())])?
            .or(&session.target_with(
                "buzz.post_with_text",
                &[("text", &self.content.updated_post_message())],
            )?);
        let wait = session.refresh_wait();
        session.absent(&comments, &wait).await?;
        session.absent(&posts, &wait).await
    }

    /// Any comment block carrying either generated comment text.
    fn comment_matches(&self, session: &Session<'_>) -> Result<LocatorStrategy, InteractionError> {
        Ok(session
            .target_with("buzz.comment_with_text", &[("text", &self.content.comment())])?
            .or(&session.target_with(
                "buzz.comment_with_text",
                &[("text", &self.content.updated_comment())],
            )?))
    }
}

#[async_trait]
impl Workflow for BuzzWorkflow {
    type Step = BuzzStep;
    type State = BuzzState;

    fn name(&self) -> &'static str {
        "buzz"
    }

    fn scenario(&self) -> &ScenarioContent {
        &self.content
    }

    fn requirements(&self) -> Requirements {
        common::login_requirements()
            .and(Requirements::new(
                &[
                    "nav.menu",
                    "page.header",
                    "form.file_input",
                    "menu.entry",
                    "dialog.confirm_delete",
                    "buzz.post_input",
                    "buzz.photo_button",
                    "buzz.post_submit",
                    "buzz.top_post",
                    "buzz.post_with_text",
                    "buzz.like_button",
                    "buzz.more_button",
                    "buzz.edit_input",
                    "buzz.edit_save",
                    "buzz.comment_input",
                    "buzz.comment_toggle",
                    "buzz.comment_area",
                    "buzz.comment_with_text",
                ],
                &["menu.buzz", "header.buzz", "menu.edit", "menu.delete"],
            ))
    }

    fn plan(&self) -> Vec<StepSpec<BuzzStep>> {
        vec![
            StepSpec::hard(BuzzStep::Login),
            StepSpec::hard(BuzzStep::OpenFeed),
            StepSpec::hard(BuzzStep::ComposePost),
            StepSpec::best_effort(BuzzStep::AttachImage),
            StepSpec::hard(BuzzStep::SubmitPost),
            StepSpec::hard(BuzzStep::LocatePost),
            StepSpec::best_effort(BuzzStep::LikePost),
            StepSpec::best_effort(BuzzStep::EditPost),
            StepSpec::best_effort(BuzzStep::AddComment),
            StepSpec::best_effort(BuzzStep::LikeComment),
            StepSpec::best_effort(BuzzStep::EditComment),
            StepSpec::best_effort(BuzzStep::DeleteComment),
            StepSpec::hard(BuzzStep::DeletePost),
            StepSpec::hard(BuzzStep::VerifyCleanup),
        ]
    }

    async fn run_step(
        &self,
        step: BuzzStep,
        session: &mut Session<'_>,
        state: &mut BuzzState,
    ) -> Result<(), InteractionError> {
        match step {
            BuzzStep::Login => common::login(session).await,
            BuzzStep::OpenFeed => self.open_feed(session).await,
            BuzzStep::ComposePost => self.compose_post(session).await,
            BuzzStep::AttachImage => self.attach_image(session).await,
            BuzzStep::SubmitPost => self.submit_post(session, state).await,
            BuzzStep::LocatePost => self.locate_post(session, state).await,
            BuzzStep::LikePost => {
                let post = self.current_post(session, state).await?;
                self.toggle_like(session, &post).await
            }
            BuzzStep::EditPost => self.edit_post(session, state).await,
            BuzzStep::AddComment => self.add_comment(session, state).await,
            BuzzStep::LikeComment => {
                let block = self.current_comment(session, state).await?;
                self.toggle_like(session, &block).await
            }
            BuzzStep::EditComment => self.edit_comment(session, state).await,
            BuzzStep::DeleteComment => self.delete_comment(session, state).await,
            BuzzStep::DeletePost => self.delete_post(session, state).await,
            BuzzStep::VerifyCleanup => self.verify_cleanup(session).await,
        }
    }
}
