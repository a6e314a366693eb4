use std::sync::Arc;

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    Extension, Form,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::manager::{
    login_manager::{self, Credentials, LoginManager, SignupForm},
    session_manager::{BrowserId, SessionManager},
};
use crate::utils::hx_redirect;
use crate::AppState;

#[derive(Deserialize)]
pub struct OrganizerLoginForm {
    email: String,
    password: String,
    #[serde(default)]
    remember: Option<String>,
}

#[derive(Deserialize)]
pub struct VolunteerLoginForm {
    username: String,
    password: String,
}

#[derive(Template)]
#[template(path = "login_view/login_attempt.html")]
pub struct LoginAttempt {
    message: &'static str,
}

pub async fn try_organizer_login(
    State(state): State<Arc<AppState>>,
    Extension(browser): Extension<BrowserId>,
    Form(form): Form<OrganizerLoginForm>,
) -> Result<Response, AppError> {
    let OrganizerLoginForm {
        email,
        password,
        remember,
    } = form;

    let session = {
        let mut workspace = state.workspaces.get(&browser).await;
        workspace.profile_draft = None;
        LoginManager::new(&mut workspace.store).login(Credentials::Organizer { email, password })
    };

    match session {
        Ok(session) => {
            if remember.is_some() {
                SessionManager::new(&state.pool, &browser)
                    .remember(&session.organization)
                    .await?;
            }
            Ok((hx_redirect("/"), Html("")).into_response())
        }
        Err(_) => Ok(LoginAttempt {
            message: "Email et mot de passe sont obligatoires.",
        }
        .into_response()),
    }
}

pub async fn try_volunteer_login(
    State(state): State<Arc<AppState>>,
    Extension(browser): Extension<BrowserId>,
    Form(form): Form<VolunteerLoginForm>,
) -> Response {
    let VolunteerLoginForm { username, password } = form;
    let mut workspace = state.workspaces.get(&browser).await;
    workspace.profile_draft = None;
    let session =
        LoginManager::new(&mut workspace.store).login(Credentials::Volunteer { username, password });

    match session {
        Ok(_) => (hx_redirect("/"), Html("")).into_response(),
        Err(_) => LoginAttempt {
            message: "Pseudo ou mot de passe incorrect.",
        }
        .into_response(),
    }
}

#[derive(Template, Default)]
#[template(path = "login_view/widget_register.html")]
pub struct RegisterWidget {
    first_name_cache: String,
    last_name_cache: String,
    username_cache: String,
    username_taken: bool,
    missing_fields: bool,
}

pub async fn register() -> RegisterWidget {
    RegisterWidget {
        ..Default::default()
    }
}

#[derive(Deserialize)]
pub struct RegisterUserForm {
    first_name: String,
    #[serde(default)]
    last_name: String,
    username: String,
    password: String,
}

pub async fn try_register(
    State(state): State<Arc<AppState>>,
    Extension(browser): Extension<BrowserId>,
    Form(form): Form<RegisterUserForm>,
) -> Response {
    let RegisterUserForm {
        first_name,
        last_name,
        username,
        password,
    } = form;

    let mut workspace = state.workspaces.get(&browser).await;
    workspace.profile_draft = None;
    let user = LoginManager::new(&mut workspace.store).signup_volunteer(SignupForm {
        first_name: first_name.clone(),
        last_name: last_name.clone(),
        username: username.clone(),
        password,
    });

    let widget = RegisterWidget {
        first_name_cache: first_name,
        last_name_cache: last_name,
        username_cache: username,
        ..Default::default()
    };
    match user {
        Ok(_) => (hx_redirect("/"), Html("")).into_response(),

        Err(login_manager::Error::UsernameTaken) => RegisterWidget {
            username_taken: true,
            ..widget
        }
        .into_response(),

        Err(_) => RegisterWidget {
            missing_fields: true,
            ..widget
        }
        .into_response(),
    }
}

/// The browser's workspace goes with the session; the next request starts
/// from seed data again.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(browser): Extension<BrowserId>,
) -> Result<Response, AppError> {
    if let Some(mut workspace) = state.workspaces.remove(&browser).await {
        LoginManager::new(&mut workspace.store).logout();
    }
    SessionManager::new(&state.pool, &browser).forget().await?;
    Ok((hx_redirect("/"), Html("")).into_response())
}
