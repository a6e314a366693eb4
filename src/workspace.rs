use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tokio::time::{Duration, Instant};

use crate::manager::{
    login_manager::LoginManager,
    profile_manager::ProfileDraft,
    session_manager::{BrowserId, SessionManager},
    store::Store,
};
use crate::{AppState, BROWSER_ID_KEY};

/// One browser's in-memory state, the server-side counterpart of a page load.
#[derive(Debug)]
pub struct Workspace {
    pub store: Store,
    pub profile_draft: Option<ProfileDraft>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            store: Store::seeded(),
            profile_draft: None,
        }
    }
}

impl Workspace {
    /// Seed data plus whatever organizer session the browser remembered.
    pub async fn open(pool: &sqlx::SqlitePool, browser: &BrowserId) -> Self {
        let mut workspace = Self::default();
        if let Some(persisted) = SessionManager::new(pool, browser).restore().await {
            if LoginManager::new(&mut workspace.store)
                .attach(persisted)
                .is_some()
            {
                tracing::info!(%browser, "remembered organizer session restored");
            }
        }
        workspace
    }
}

/// Workspaces kept at most by default.
pub const DEFAULT_CAPACITY: usize = 1024;
/// Idle time after which a workspace is dropped by default.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

struct Entry {
    workspace: Workspace,
    last_seen: Instant,
}

/// Live workspaces by browser. Bounded: idle entries expire and, when full,
/// the least recently seen one makes room for the newcomer.
pub struct Workspaces {
    entries: Mutex<HashMap<BrowserId, Entry>>,
    capacity: usize,
    idle_ttl: Duration,
}

impl Default for Workspaces {
    fn default() -> Self {
        Self::with_limits(DEFAULT_CAPACITY, DEFAULT_IDLE_TTL)
    }
}

impl Workspaces {
    pub fn with_limits(capacity: usize, idle_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            idle_ttl,
        }
    }

    pub async fn contains(&self, browser: &BrowserId) -> bool {
        self.entries.lock().await.contains_key(browser)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn insert(&self, browser: BrowserId, workspace: Workspace) {
        let mut all = self.entries.lock().await;
        if all.contains_key(&browser) {
            return;
        }

        let now = Instant::now();
        all.retain(|_, e| now.duration_since(e.last_seen) < self.idle_ttl);
        while all.len() >= self.capacity {
            let Some(oldest) = all
                .iter()
                .min_by_key(|(_, e)| e.last_seen)
                .map(|(id, _)| id.clone())
            else {
                break;
            };
            tracing::debug!(browser = %oldest, "evicting least recently seen workspace");
            all.remove(&oldest);
        }
        all.insert(
            browser,
            Entry {
                workspace,
                last_seen: now,
            },
        );
    }

    pub async fn remove(&self, browser: &BrowserId) -> Option<Workspace> {
        self.entries
            .lock()
            .await
            .remove(browser)
            .map(|e| e.workspace)
    }

    pub async fn get(&self, browser: &BrowserId) -> MappedMutexGuard<'_, Workspace> {
        let guard = self.entries.lock().await;
        MutexGuard::map(guard, |all| {
            let entry = all.entry(browser.clone()).or_insert_with(|| Entry {
                workspace: Workspace::default(),
                last_seen: Instant::now(),
            });
            entry.last_seen = Instant::now();
            &mut entry.workspace
        })
    }
}

/// Makes sure every request carries a browser id and that its workspace exists.
pub async fn attach_browser(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let known = jar
        .get(BROWSER_ID_KEY)
        .map(|c| BrowserId(c.value().to_owned()));
    let browser = known.clone().unwrap_or_else(BrowserId::random);

    if !state.workspaces.contains(&browser).await {
        let workspace = Workspace::open(&state.pool, &browser).await;
        state.workspaces.insert(browser.clone(), workspace).await;
    }

    request.extensions_mut().insert(browser.clone());
    let response = next.run(request).await;

    if known.is_some() {
        return response;
    }
    let cookie = Cookie::build((BROWSER_ID_KEY, browser.0))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    (jar.add(cookie), response).into_response()
}
