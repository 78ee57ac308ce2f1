//! Triage actions of the NGO dashboard.

use std::sync::Arc;

use aasrah_shared::{ReportId, Role, ValidationError};

use crate::error::{AppError, Result};
use crate::events::Toast;
use crate::poller::ReportPoller;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Triage {
    Accept,
    Decline,
    Complete,
}

impl Triage {
    fn done_title(&self) -> &'static str {
        match self {
            Triage::Accept => "Report Accepted",
            Triage::Decline => "Report Declined",
            Triage::Complete => "Report Completed",
        }
    }
}

/// Mount the dashboard's poller. NGO accounts only.
pub fn open_dashboard(state: &AppState) -> Result<Arc<ReportPoller>> {
    match state.current_user() {
        Some(user) if user.role == Role::Ngo => state.start_poller(),
        Some(_) => Err(AppError::Forbidden(Role::Ngo)),
        None => Err(AppError::Auth("Please log in to continue.".to_string())),
    }
}

pub fn close_dashboard(state: &AppState) {
    state.stop_poller();
}

/// Apply a triage action to the report whose id (or unambiguous id prefix)
/// is `id`.
pub async fn triage(state: &AppState, action: Triage, id: &str) -> Result<ReportId> {
    match run_triage(state, action, id).await {
        Ok(id) => {
            state.events.toast(Toast::info(
                action.done_title(),
                format!("Report {} updated.", id.short()),
            ));
            Ok(id)
        }
        Err(e) => {
            state.fail("Error", &e);
            Err(e)
        }
    }
}

async fn run_triage(state: &AppState, action: Triage, id: &str) -> Result<ReportId> {
    let user = state
        .current_user()
        .ok_or_else(|| AppError::Auth("Please log in to continue.".to_string()))?;
    let poller = state
        .poller()
        .ok_or_else(|| AppError::Validation(ValidationError::MissingField("Open dashboard")))?;

    let id = poller.snapshot().resolve(id).unwrap_or_else(|| ReportId::from(id));
    let actor = user.id.clone().unwrap_or_else(|| user.email.clone());
    match action {
        Triage::Accept => poller.accept(&id, &actor).await?,
        Triage::Decline => poller.decline(&id, &actor).await?,
        Triage::Complete => poller.mark_complete(&id, &actor).await?,
    }
    Ok(id)
}
