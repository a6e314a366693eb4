use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Extension, Form,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::manager::{
    mission_manager::{MissionForm, MissionInput, MissionManager, SaveOutcome},
    session_manager::BrowserId,
    Category, MissionId, Role,
};
use crate::utils::{format_datetime_local, hx_redirect};
use crate::AppState;

pub struct CategoryOption {
    label: &'static str,
    selected: bool,
}

#[derive(Template)]
#[template(path = "mission_view/mission_form.html")]
pub struct MissionFormTemplate {
    id: String,
    title: String,
    location: String,
    date_start: String,
    date_end: String,
    description: String,
    max_participants: String,
    categories: Vec<CategoryOption>,
    error: Option<String>,
}

impl MissionFormTemplate {
    fn new(form: &MissionForm) -> Self {
        Self {
            id: form.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            title: form.title.clone().unwrap_or_default(),
            location: form.location.clone().unwrap_or_default(),
            date_start: form
                .date_start
                .as_ref()
                .map(format_datetime_local)
                .unwrap_or_default(),
            date_end: form
                .date_end
                .as_ref()
                .map(format_datetime_local)
                .unwrap_or_default(),
            description: form.description.clone().unwrap_or_default(),
            max_participants: form
                .max_participants
                .map(|m| m.to_string())
                .unwrap_or_default(),
            categories: Category::ALL
                .iter()
                .map(|c| CategoryOption {
                    label: c.label(),
                    selected: Some(*c) == form.category,
                })
                .collect(),
            error: None,
        }
    }

    /// Echoes the submitted values back untouched, parseable or not.
    fn from_input(input: &MissionInput, error: String) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let category = input.category.as_deref().map(str::trim).unwrap_or_default();
        Self {
            id: text(&input.id).trim().to_owned(),
            title: text(&input.title),
            location: text(&input.location),
            date_start: text(&input.date_start),
            date_end: text(&input.date_end),
            description: text(&input.description),
            max_participants: text(&input.max_participants),
            categories: Category::ALL
                .iter()
                .map(|c| CategoryOption {
                    label: c.label(),
                    selected: c.label() == category,
                })
                .collect(),
            error: Some(error),
        }
    }

    fn is_edit(&self) -> bool {
        !self.id.is_empty()
    }
}

#[derive(Deserialize)]
pub struct NewMissionQuery {
    #[serde(default)]
    date: Option<NaiveDate>,
}

async fn is_organizer(state: &AppState, browser: &BrowserId) -> bool {
    let workspace = state.workspaces.get(browser).await;
    workspace.store.current_role() == Some(Role::Organizer)
}

pub async fn new_mission(
    State(state): State<Arc<AppState>>,
    Extension(browser): Extension<BrowserId>,
    Query(query): Query<NewMissionQuery>,
) -> Response {
    if !is_organizer(&state, &browser).await {
        return StatusCode::FORBIDDEN.into_response();
    }
    let form = query.date.map_or_else(MissionForm::blank, MissionForm::for_day);
    MissionFormTemplate::new(&form).into_response()
}

pub async fn edit_mission(
    State(state): State<Arc<AppState>>,
    Extension(browser): Extension<BrowserId>,
    Path(id): Path<MissionId>,
) -> Response {
    let workspace = state.workspaces.get(&browser).await;
    if workspace.store.current_role() != Some(Role::Organizer) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match workspace.store.mission(&id) {
        Some(mission) => MissionFormTemplate::new(&MissionForm::from(mission)).into_response(),
        None => (hx_redirect("/"), Html("")).into_response(),
    }
}

pub async fn try_save_mission(
    State(state): State<Arc<AppState>>,
    Extension(browser): Extension<BrowserId>,
    Form(input): Form<MissionInput>,
) -> Response {
    let mut workspace = state.workspaces.get(&browser).await;
    if workspace.store.current_role() != Some(Role::Organizer) {
        return StatusCode::FORBIDDEN.into_response();
    }

    let saved = MissionForm::try_from(&input)
        .and_then(|form| MissionManager::new(&mut workspace.store).save_mission(form));
    match saved {
        Ok(SaveOutcome::Missing(id)) => {
            tracing::warn!(mission = %id, "tried to save a mission that no longer exists");
            (hx_redirect("/"), Html("")).into_response()
        }
        Ok(_) => (hx_redirect("/"), Html("")).into_response(),
        Err(e) => MissionFormTemplate::from_input(&input, e.to_string()).into_response(),
    }
}

/// The confirmation prompt happens client side through `hx-confirm`.
pub async fn delete_mission(
    State(state): State<Arc<AppState>>,
    Extension(browser): Extension<BrowserId>,
    Path(id): Path<MissionId>,
) -> Response {
    let mut workspace = state.workspaces.get(&browser).await;
    if workspace.store.current_role() != Some(Role::Organizer) {
        return StatusCode::FORBIDDEN.into_response();
    }
    MissionManager::new(&mut workspace.store).delete_mission(&id);
    (hx_redirect("/"), Html("")).into_response()
}

pub async fn toggle_registration(
    State(state): State<Arc<AppState>>,
    Extension(browser): Extension<BrowserId>,
    Path(id): Path<MissionId>,
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
    MissionManager::new(&mut workspace.store).toggle_registration(&id, &session.user_id);
    (hx_redirect("/"), Html("")).into_response()
}

pub struct ParticipantView {
    name: String,
    username: String,
    avatar: String,
    interests: Vec<String>,
}

#[derive(Template)]
#[template(path = "mission_view/participants.html")]
pub struct ParticipantsTemplate {
    title: String,
    participants: Vec<ParticipantView>,
}

pub async fn participants(
    State(state): State<Arc<AppState>>,
    Extension(browser): Extension<BrowserId>,
    Path(id): Path<MissionId>,
) -> Response {
    let mut workspace = state.workspaces.get(&browser).await;
    if workspace.store.session.is_none() {
        return StatusCode::FORBIDDEN.into_response();
    }
    let title = match workspace.store.mission(&id) {
        Some(mission) => mission.title.clone(),
        None => return StatusCode::NOT_FOUND.into_response(),
    };
    let participants = MissionManager::new(&mut workspace.store)
        .participants(&id)
        .into_iter()
        .map(|u| ParticipantView {
            name: u.full_name(),
            username: u.username.clone(),
            avatar: u.avatar.clone(),
            interests: u.interests.clone().unwrap_or_default(),
        })
        .collect();
    ParticipantsTemplate {
        title,
        participants,
    }
    .into_response()
}
