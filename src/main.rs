use std::sync::Arc;

use axum::{middleware, routing, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

mod chat_view;
mod config;
mod dashboard_view;
mod error;
mod login_view;
mod manager;
mod mission_view;
mod organization_view;
mod profile_view;
mod utils;
mod workspace;

use config::Config;
use workspace::Workspaces;

pub const BROWSER_ID_KEY: &str = "bnevo_browser";

pub struct AppState {
    pub pool: sqlx::SqlitePool,
    pub workspaces: Workspaces,
}

impl AppState {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self::with_workspaces(pool, Workspaces::default())
    }

    pub fn with_workspaces(pool: sqlx::SqlitePool, workspaces: Workspaces) -> Self {
        Self { pool, workspaces }
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", routing::get(dashboard_view::index))
        .route("/calendar", routing::get(dashboard_view::calendar))
        .route("/login/organizer", routing::post(login_view::try_organizer_login))
        .route("/login/volunteer", routing::post(login_view::try_volunteer_login))
        .route(
            "/register",
            routing::get(login_view::register).post(login_view::try_register),
        )
        .route("/logout", routing::post(login_view::logout))
        .route(
            "/organization",
            routing::post(organization_view::try_create_organization),
        )
        .route(
            "/organization/name",
            routing::post(organization_view::try_rename_organization),
        )
        .route(
            "/organization/forget",
            routing::post(organization_view::forget_organization),
        )
        .route("/missions", routing::post(mission_view::try_save_mission))
        .route("/missions/new", routing::get(mission_view::new_mission))
        .route("/missions/:id/edit", routing::get(mission_view::edit_mission))
        .route("/missions/:id/delete", routing::post(mission_view::delete_mission))
        .route(
            "/missions/:id/registration",
            routing::post(mission_view::toggle_registration),
        )
        .route(
            "/missions/:id/participants",
            routing::get(mission_view::participants),
        )
        .route(
            "/missions/:id/chat",
            routing::get(chat_view::chat).post(chat_view::send_message),
        )
        .route(
            "/profile",
            routing::get(profile_view::profile).post(profile_view::try_save_profile),
        )
        .route("/profile/interests", routing::post(profile_view::add_interest))
        .route(
            "/profile/interests/remove",
            routing::post(profile_view::remove_interest),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            workspace::attach_browser,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let pool = sqlx::SqlitePool::connect(&config.database_url).await?;
    sqlx::migrate!().run(&pool).await?;

    let workspaces = Workspaces::with_limits(config.workspace_capacity, config.workspace_idle);
    let state = Arc::new(AppState::with_workspaces(pool, workspaces));
    let router = app(state).nest_service("/assets", ServeDir::new(&config.assets_dir));

    tracing::info!(addr = %config.bind_addr, "listening");
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, router.into_make_service()).await?;
    Ok(())
}
