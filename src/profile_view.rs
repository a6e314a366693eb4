use std::sync::Arc;

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Extension, Form,
};
use serde::Deserialize;

use crate::manager::{
    profile_manager::{ProfileDraft, ProfileManager, MIN_INTERESTS},
    session_manager::BrowserId,
};
use crate::utils::hx_redirect;
use crate::workspace::Workspace;
use crate::AppState;

#[derive(Template)]
#[template(path = "profile_view/profile.html")]
pub struct ProfileTemplate {
    first_name: String,
    last_name: String,
    avatar: String,
    interests: Vec<String>,
    has_interests: bool,
    min_interests: usize,
    error: Option<String>,
}

impl ProfileTemplate {
    fn new(draft: &ProfileDraft, error: Option<String>) -> Self {
        Self {
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            avatar: draft.avatar.clone(),
            interests: draft.interests().to_vec(),
            has_interests: draft.interests.is_some(),
            min_interests: MIN_INTERESTS,
            error,
        }
    }
}

/// The open draft of the signed-in user. A draft left over from anyone else
/// is replaced by a fresh one.
fn draft(workspace: &mut Workspace) -> Option<&mut ProfileDraft> {
    let user = workspace.store.current_user()?;
    let stale = workspace
        .profile_draft
        .as_ref()
        .map_or(true, |d| d.user_id != user.id);
    if stale {
        workspace.profile_draft = Some(ProfileDraft::from(user));
    }
    workspace.profile_draft.as_mut()
}

pub async fn profile(
    State(state): State<Arc<AppState>>,
    Extension(browser): Extension<BrowserId>,
) -> Response {
    let mut workspace = state.workspaces.get(&browser).await;
    workspace.profile_draft = None;
    match draft(&mut workspace) {
        Some(draft) => ProfileTemplate::new(draft, None).into_response(),
        None => StatusCode::FORBIDDEN.into_response(),
    }
}

#[derive(Deserialize)]
pub struct InterestForm {
    tag: String,
}

pub async fn add_interest(
    State(state): State<Arc<AppState>>,
    Extension(browser): Extension<BrowserId>,
    Form(form): Form<InterestForm>,
) -> Response {
    let mut workspace = state.workspaces.get(&browser).await;
    match draft(&mut workspace) {
        Some(draft) => {
            draft.add_interest(&form.tag);
            ProfileTemplate::new(draft, None).into_response()
        }
        None => StatusCode::FORBIDDEN.into_response(),
    }
}

pub async fn remove_interest(
    State(state): State<Arc<AppState>>,
    Extension(browser): Extension<BrowserId>,
    Form(form): Form<InterestForm>,
) -> Response {
    let mut workspace = state.workspaces.get(&browser).await;
    match draft(&mut workspace) {
        Some(draft) => {
            draft.remove_interest(&form.tag);
            ProfileTemplate::new(draft, None).into_response()
        }
        None => StatusCode::FORBIDDEN.into_response(),
    }
}

#[derive(Deserialize)]
pub struct ProfileForm {
    first_name: String,
    last_name: String,
    avatar: String,
}

pub async fn try_save_profile(
    State(state): State<Arc<AppState>>,
    Extension(browser): Extension<BrowserId>,
    Form(form): Form<ProfileForm>,
) -> Response {
    let mut workspace = state.workspaces.get(&browser).await;
    let Some(open) = draft(&mut workspace) else {
        return StatusCode::FORBIDDEN.into_response();
    };
    open.first_name = form.first_name;
    open.last_name = form.last_name;
    open.avatar = form.avatar;
    let draft = open.clone();

    let saved = ProfileManager::new(&mut workspace.store).save(draft.clone());
    match saved {
        Ok(_) => {
            workspace.profile_draft = None;
            (hx_redirect("/"), Html("")).into_response()
        }
        Err(e) => ProfileTemplate::new(&draft, Some(e.to_string())).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::login_manager::{Credentials, LoginManager};
    use crate::manager::UserId;

    fn login(workspace: &mut Workspace, username: &str, password: &str) {
        LoginManager::new(&mut workspace.store)
            .login(Credentials::Volunteer {
                username: username.into(),
                password: password.into(),
            })
            .unwrap();
    }

    #[test]
    fn draft_follows_the_signed_in_user() {
        let mut workspace = Workspace::default();
        assert!(draft(&mut workspace).is_none());

        login(&mut workspace, "maried", "password123");
        draft(&mut workspace).unwrap().first_name = "Marianne".into();
        assert_eq!(draft(&mut workspace).unwrap().first_name, "Marianne");

        login(&mut workspace, "vs827", "123456");
        let open = draft(&mut workspace).unwrap();
        assert_eq!(open.user_id, UserId::from("u_valentin"));
        assert_eq!(open.first_name, "Valentin");
    }
}
