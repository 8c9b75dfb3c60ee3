//! Steps and helpers shared by every workflow.

use crate::action::OptionChoice;
use crate::error::InteractionError;
use crate::locator::LocatorStrategy;
use crate::profile::Requirements;
use crate::session::Session;
use holdfast_common::protocol::{ElementHandle, SpecialKey};
use tracing::{debug, info, warn};

pub fn login_requirements() -> Requirements {
    Requirements::new(
        &[
            "login.username",
            "login.password",
            "login.submit",
            "dashboard.header",
        ],
        &[],
    )
}

/// Navigation and form targets most workflows touch.
pub fn form_requirements() -> Requirements {
    Requirements::new(
        &[
            "nav.menu",
            "nav.tab",
            "page.header",
            "form.submit",
            "form.input",
            "form.select",
            "form.toast",
            "form.loader",
            "form.validation_error",
        ],
        &[],
    )
}

/// Shared prelude: open the base URL, authenticate, wait for the dashboard.
pub async fn login(session: &mut Session<'_>) -> Result<(), InteractionError> {
    let target = &session.config().target;
    let wait = session.default_wait();

    session.navigate(&target.base_url).await?;

    let username = session.target("login.username")?;
    let password = session.target("login.password")?;
    let submit = session.target("login.submit")?;
    session.fill(&username, &target.username, &wait).await?;
    session.fill_secret(&password, &target.password, &wait).await?;
    session.click(&submit, &wait).await?;

    session.present(&session.target("dashboard.header")?, &wait).await?;
    info!("Logged in as {}", target.username);
    Ok(())
}

/// Click a main-menu entry by label key.
pub async fn open_menu(session: &mut Session<'_>, label_key: &str) -> Result<(), InteractionError> {
    let entry = session.labelled("nav.menu", label_key)?;
    session.click(&entry, &session.default_wait()).await
}

/// Click a top-bar or tab link by label key.
pub async fn open_tab(session: &mut Session<'_>, label_key: &str) -> Result<(), InteractionError> {
    let tab = session.labelled("nav.tab", label_key)?;
    session.click(&tab, &session.default_wait()).await
}

pub async fn await_header(
    session: &mut Session<'_>,
    label_key: &str,
) -> Result<ElementHandle, InteractionError> {
    let header = session.labelled("page.header", label_key)?;
    session.present(&header, &session.default_wait()).await
}

/// The success toast shown after a save.
pub async fn await_toast(session: &mut Session<'_>) -> Result<(), InteractionError> {
    let toast = session.target("form.toast")?;
    session.present(&toast, &session.confirm_wait()).await?;
    Ok(())
}

/// Wait for the form's loading overlay to go away. A form without one is idle.
pub async fn await_form_idle(session: &mut Session<'_>) -> Result<(), InteractionError> {
    let loader = session.target("form.loader")?;
    session.absent(&loader, &session.default_wait()).await
}

pub async fn fill_labelled(
    session: &mut Session<'_>,
    label_key: &str,
    value: &str,
) -> Result<(), InteractionError> {
    let field = session.labelled("form.input", label_key)?;
    session.fill(&field, value, &session.default_wait()).await
}

/// Date inputs open a picker; tabbing out closes it and commits the value.
pub async fn fill_date(
    session: &mut Session<'_>,
    label_key: &str,
    value: &str,
) -> Result<(), InteractionError> {
    let field = session.labelled("form.input", label_key)?;
    let wait = session.default_wait();
    session.fill(&field, value, &wait).await?;
    session.press(&field, SpecialKey::Tab, &wait).await
}

/// Open a dropdown by label key and take whatever option comes first.
pub async fn select_first(session: &mut Session<'_>, label_key: &str) -> Result<(), InteractionError> {
    let dropdown = session.labelled("form.select", label_key)?;
    session
        .select(&dropdown, OptionChoice::FirstAvailable, &session.default_wait())
        .await
}

/// Open a dropdown by label key and click the option with the given label.
pub async fn select_option(
    session: &mut Session<'_>,
    label_key: &str,
    option_key: &str,
) -> Result<(), InteractionError> {
    let dropdown = session.labelled("form.select", label_key)?;
    let option = session.target_with("form.option", &[("text", session.label(option_key)?)])?;
    session
        .select(&dropdown, OptionChoice::Matching(option), &session.default_wait())
        .await
}

/// Submit the current form. On failure the inline validation messages are
/// folded into the error so the report says why the form was rejected.
pub async fn submit_form(session: &mut Session<'_>) -> Result<(), InteractionError> {
    let submit = session.target("form.submit")?;
    let result = session.click(&submit, &session.default_wait()).await;
    with_validation(session, result).await
}

pub async fn with_validation<T>(
    session: &mut Session<'_>,
    result: Result<T, InteractionError>,
) -> Result<T, InteractionError> {
    match result {
        Ok(value) => Ok(value),
        Err(e) => {
            let messages = session.validation_messages().await;
            if messages.is_empty() {
                Err(e)
            } else {
                debug!("Validation messages after failure: {:?}", messages);
                Err(InteractionError::Precondition(format!(
                    "{}; validation: {}",
                    e,
                    messages.join(", ")
                )))
            }
        }
    }
}

/// Type `preferred` into an autocomplete input and take the suggestion with
/// that name, or the first suggestion when it is not offered. Returns
/// whether the preferred entry was the one picked.
pub async fn pick_suggestion(
    session: &mut Session<'_>,
    input: &LocatorStrategy,
    preferred: &str,
) -> Result<bool, InteractionError> {
    session
        .fill(input, preferred, &session.default_wait())
        .await?;

    let named = session.target_with("form.suggestion", &[("name", preferred)])?;
    match session.click(&named, &session.confirm_wait()).await {
        Ok(()) => Ok(true),
        Err(InteractionError::NotFound { .. }) => {
            warn!("'{}' not offered; taking the first suggestion", preferred);
            let any = session.target("form.any_suggestion")?;
            session.click(&any, &session.confirm_wait()).await?;
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Pick an entry from an open dropdown menu (Edit, Delete, ...).
pub async fn choose_menu_entry(
    session: &mut Session<'_>,
    label_key: &str,
) -> Result<(), InteractionError> {
    session.settle().await;
    let entry = session.labelled("menu.entry", label_key)?;
    session.click(&entry, &session.default_wait()).await
}

/// Accept the delete confirmation dialog.
pub async fn confirm_delete(session: &mut Session<'_>) -> Result<(), InteractionError> {
    let confirm = session.target("dialog.confirm_delete")?;
    session.click(&confirm, &session.confirm_wait()).await
}
