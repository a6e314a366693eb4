use std::sync::Arc;

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Extension, Form,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::manager::{
    organization_manager::{self, OrganizationManager},
    session_manager::{BrowserId, SessionManager},
    Role,
};
use crate::utils::hx_redirect;
use crate::AppState;

#[derive(Deserialize)]
pub struct OrganizationNameForm {
    name: String,
}

#[derive(Template)]
#[template(path = "organization_view/organization_attempt.html")]
pub struct OrganizationAttempt {
    message: String,
}

fn attempt(error: organization_manager::Error) -> Response {
    let message = match error {
        organization_manager::Error::MissingName => "Le nom de l'organisation est obligatoire.",
        organization_manager::Error::NotOrganizer => "Seul un organisateur peut faire cela.",
    };
    OrganizationAttempt {
        message: message.to_owned(),
    }
    .into_response()
}

pub async fn try_create_organization(
    State(state): State<Arc<AppState>>,
    Extension(browser): Extension<BrowserId>,
    Form(form): Form<OrganizationNameForm>,
) -> Result<Response, AppError> {
    let created = {
        let mut workspace = state.workspaces.get(&browser).await;
        workspace.profile_draft = None;
        OrganizationManager::new(&mut workspace.store).create_organization(&form.name)
    };

    match created {
        Ok(session) => {
            SessionManager::new(&state.pool, &browser)
                .remember(&session.organization)
                .await?;
            Ok((hx_redirect("/"), Html("")).into_response())
        }
        Err(e) => Ok(attempt(e)),
    }
}

pub async fn try_rename_organization(
    State(state): State<Arc<AppState>>,
    Extension(browser): Extension<BrowserId>,
    Form(form): Form<OrganizationNameForm>,
) -> Result<Response, AppError> {
    let renamed = {
        let mut workspace = state.workspaces.get(&browser).await;
        OrganizationManager::new(&mut workspace.store).rename_organization(&form.name)
    };

    match renamed {
        Ok(organization) => {
            let sessions = SessionManager::new(&state.pool, &browser);
            if sessions.is_remembered().await? {
                sessions.remember(&organization).await?;
            }
            Ok((hx_redirect("/"), Html("")).into_response())
        }
        Err(e) => Ok(attempt(e)),
    }
}

/// Confirmed client side with `hx-confirm` before it gets here.
pub async fn forget_organization(
    State(state): State<Arc<AppState>>,
    Extension(browser): Extension<BrowserId>,
) -> Response {
    let mut workspace = state.workspaces.get(&browser).await;
    let Some(session) = workspace
        .store
        .session
        .clone()
        .filter(|s| s.role == Role::Volunteer)
    else {
        return StatusCode::FORBIDDEN.into_response();
    };

    OrganizationManager::new(&mut workspace.store).forget_organization(&session.user_id);
    workspace.profile_draft = None;
    (hx_redirect("/"), Html("")).into_response()
}
