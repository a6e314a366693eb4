use std::fmt::Display;

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Organization, Role};

/// Storage key of the remembered organizer session.
pub const ORG_SESSION_KEY: &str = "bnevo_org_session";

/// Identifies one browser, and with it one workspace and its stored items.
#[derive(sqlx::Type, Debug, Clone, PartialEq, Eq, Hash)]
#[sqlx(transparent)]
pub struct BrowserId(pub String);

impl BrowserId {
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        BrowserId(
            (0..13)
                .map(|_| rng.sample(Alphanumeric))
                .map(char::from)
                .collect::<String>(),
        )
    }
}

impl Display for BrowserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("storage error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("malformed stored session: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub role: Role,
    pub organization: Organization,
}

impl PersistedSession {
    pub fn organizer(organization: Organization) -> Self {
        Self {
            role: Role::Organizer,
            organization,
        }
    }
}

/// Per-browser key/value items, the server-side stand-in for local storage.
#[derive(Clone)]
pub struct SessionManager<'a> {
    pool: &'a sqlx::SqlitePool,
    browser: &'a BrowserId,
}

impl<'a> SessionManager<'a> {
    pub fn new(pool: &'a sqlx::SqlitePool, browser: &'a BrowserId) -> Self {
        Self { pool, browser }
    }
}

impl SessionManager<'_> {
    pub async fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(sqlx::query_scalar::<_, String>(
            "SELECT value FROM LocalStorage WHERE browser_id = ? AND key = ?",
        )
        .bind(self.browser)
        .bind(key)
        .fetch_optional(self.pool)
        .await?)
    }

    pub async fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        sqlx::query(
            "INSERT INTO LocalStorage(browser_id, key, value) VALUES (?, ?, ?)
             ON CONFLICT(browser_id, key) DO UPDATE SET value = excluded.value",
        )
        .bind(self.browser)
        .bind(key)
        .bind(value)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn remove_item(&self, key: &str) -> Result<(), Error> {
        sqlx::query("DELETE FROM LocalStorage WHERE browser_id = ? AND key = ?")
            .bind(self.browser)
            .bind(key)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    pub async fn remember(&self, organization: &Organization) -> Result<(), Error> {
        let value = serde_json::to_string(&PersistedSession::organizer(organization.clone()))?;
        self.set_item(ORG_SESSION_KEY, &value).await
    }

    pub async fn is_remembered(&self) -> Result<bool, Error> {
        Ok(self.get_item(ORG_SESSION_KEY).await?.is_some())
    }

    pub async fn forget(&self) -> Result<(), Error> {
        self.remove_item(ORG_SESSION_KEY).await
    }

    /// Best effort: anything unreadable counts as no session and is cleared.
    pub async fn restore(&self) -> Option<PersistedSession> {
        let raw = match self.get_item(ORG_SESSION_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(browser = %self.browser, error = %e, "could not read stored session");
                return None;
            }
        };

        match serde_json::from_str::<PersistedSession>(&raw) {
            Ok(session) if session.role == Role::Organizer => Some(session),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(browser = %self.browser, error = %e, "failed to parse stored session");
                if let Err(e) = self.forget().await {
                    tracing::warn!(browser = %self.browser, error = %e, "could not clear stored session");
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::OrganizationId;

    fn organization() -> Organization {
        Organization {
            id: OrganizationId::from("org-1"),
            name: "Le Chant du Coq Solidaire".into(),
            code: "COQ-2025".into(),
        }
    }

    #[test]
    fn random_browser_ids_are_alphanumeric() {
        let id = BrowserId::random();
        assert_eq!(id.0.len(), 13);
        assert!(id.0.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn persisted_session_layout() {
        let json = serde_json::to_value(PersistedSession::organizer(organization())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "role": "organizer",
                "organization": { "id": "org-1", "name": "Le Chant du Coq Solidaire", "code": "COQ-2025" }
            })
        );
    }

    #[sqlx::test]
    async fn ok_restore_remembered_session(pool: sqlx::SqlitePool) {
        let browser = BrowserId("f15wQrWboFNBW".into());
        let manager = SessionManager::new(&pool, &browser);
        manager.remember(&organization()).await.unwrap();

        assert!(manager.is_remembered().await.unwrap());
        assert_eq!(
            manager.restore().await,
            Some(PersistedSession::organizer(organization()))
        );
    }

    #[sqlx::test]
    async fn sessions_are_scoped_per_browser(pool: sqlx::SqlitePool) {
        let first = BrowserId("aaaaaaaaaaaaa".into());
        let second = BrowserId("bbbbbbbbbbbbb".into());
        SessionManager::new(&pool, &first)
            .remember(&organization())
            .await
            .unwrap();

        assert!(SessionManager::new(&pool, &second).restore().await.is_none());
    }

    #[sqlx::test]
    async fn forget_removes_session(pool: sqlx::SqlitePool) {
        let browser = BrowserId::random();
        let manager = SessionManager::new(&pool, &browser);
        manager.remember(&organization()).await.unwrap();
        manager.forget().await.unwrap();

        assert!(manager.restore().await.is_none());
        assert!(!manager.is_remembered().await.unwrap());
    }

    #[sqlx::test]
    async fn malformed_session_is_dropped(pool: sqlx::SqlitePool) {
        let browser = BrowserId::random();
        let manager = SessionManager::new(&pool, &browser);
        manager.set_item(ORG_SESSION_KEY, "{not json").await.unwrap();

        assert!(manager.restore().await.is_none());
        assert_eq!(manager.get_item(ORG_SESSION_KEY).await.unwrap(), None);
    }
}
