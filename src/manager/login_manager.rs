use super::session_manager::PersistedSession;
use super::store::Store;
use super::{Role, Session, User, UserId};
use crate::utils::default_avatar_url;

pub struct LoginManager<'a> {
    store: &'a mut Store,
}

impl<'a> LoginManager<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("username already taken")]
    UsernameTaken,
}

pub enum Credentials {
    Organizer { email: String, password: String },
    Volunteer { username: String, password: String },
}

#[derive(Debug, Default, Clone)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
}

fn compare_password(stored: Option<&str>, given: &str) -> bool {
    stored == Some(given)
}

impl LoginManager<'_> {
    /// Organizer login is a mock: any non-empty email and password sign in
    /// the organization's account. Volunteers are checked against the store.
    pub fn login(&mut self, credentials: Credentials) -> Result<Session, Error> {
        let (user_id, role) = match credentials {
            Credentials::Organizer { email, password } => {
                if email.trim().is_empty() || password.is_empty() {
                    return Err(Error::InvalidCredentials);
                }
                let organizer = self
                    .store
                    .organizer_account()
                    .ok_or(Error::InvalidCredentials)?;
                (organizer.id.clone(), Role::Organizer)
            }
            Credentials::Volunteer { username, password } => {
                let user = self
                    .store
                    .user_by_username(&username, Role::Volunteer)
                    .filter(|u| compare_password(u.password.as_deref(), &password))
                    .ok_or(Error::InvalidCredentials)?;
                (user.id.clone(), Role::Volunteer)
            }
        };

        let session = Session {
            user_id,
            role,
            organization: self.store.managed_organization.clone(),
        };
        tracing::info!(user = %session.user_id, ?role, "signed in");
        self.store.session = Some(session.clone());
        Ok(session)
    }

    pub fn signup_volunteer(&mut self, form: SignupForm) -> Result<User, Error> {
        let SignupForm {
            first_name,
            last_name,
            username,
            password,
        } = form;

        if first_name.trim().is_empty() {
            return Err(Error::MissingField("first_name"));
        }
        if username.trim().is_empty() {
            return Err(Error::MissingField("username"));
        }
        if password.is_empty() {
            return Err(Error::MissingField("password"));
        }
        if self
            .store
            .user_by_username(&username, Role::Volunteer)
            .is_some()
        {
            return Err(Error::UsernameTaken);
        }

        let user = User {
            id: UserId::generate(),
            avatar: default_avatar_url(&first_name, &last_name),
            username,
            first_name,
            last_name,
            role: Role::Volunteer,
            password: Some(password),
            interests: Some(Vec::new()),
        };
        self.store.users.push(user.clone());
        self.store.session = Some(Session {
            user_id: user.id.clone(),
            role: Role::Volunteer,
            organization: self.store.managed_organization.clone(),
        });
        tracing::info!(user = %user.id, username = %user.username, "volunteer signed up");
        Ok(user)
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.store.session.take() {
            tracing::info!(user = %session.user_id, "signed out");
        }
    }

    /// Puts a remembered organizer session back in place. The organizer
    /// account is attached as-is, nothing is re-verified.
    pub fn attach(&mut self, persisted: PersistedSession) -> Option<Session> {
        if persisted.role != Role::Organizer {
            return None;
        }
        let organizer = self.store.organizer_account()?.id.clone();
        self.store.managed_organization = persisted.organization.clone();
        let session = Session {
            user_id: organizer,
            role: Role::Organizer,
            organization: persisted.organization,
        };
        self.store.session = Some(session.clone());
        Some(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::{Organization, OrganizationId};

    fn volunteer(username: &str, password: &str) -> Credentials {
        Credentials::Volunteer {
            username: username.into(),
            password: password.into(),
        }
    }

    #[test]
    fn ok_volunteer_login_ignores_username_case() {
        let mut store = Store::seeded();
        let session = LoginManager::new(&mut store)
            .login(volunteer("VS827", "123456"))
            .unwrap();
        assert_eq!(session.user_id, UserId::from("u_valentin"));
        assert_eq!(store.current_role(), Some(Role::Volunteer));
    }

    #[test]
    fn err_volunteer_login_wrong_password() {
        let mut store = Store::seeded();
        assert_eq!(
            LoginManager::new(&mut store).login(volunteer("vs827", "nope")),
            Err(Error::InvalidCredentials)
        );
        assert!(store.session.is_none());
    }

    #[test]
    fn err_volunteer_login_with_organizer_username() {
        let mut store = Store::seeded();
        assert_eq!(
            LoginManager::new(&mut store).login(volunteer("admin", "admin")),
            Err(Error::InvalidCredentials)
        );
    }

    #[test]
    fn ok_organizer_login_accepts_any_non_empty_pair() {
        let mut store = Store::seeded();
        let session = LoginManager::new(&mut store)
            .login(Credentials::Organizer {
                email: "whoever@example.com".into(),
                password: "x".into(),
            })
            .unwrap();
        assert_eq!(session.role, Role::Organizer);
        assert_eq!(session.user_id, UserId::from("admin1"));
        assert_eq!(session.organization, store.managed_organization);
    }

    #[test]
    fn err_organizer_login_empty_password() {
        let mut store = Store::seeded();
        assert_eq!(
            LoginManager::new(&mut store).login(Credentials::Organizer {
                email: "asso@bnevo.com".into(),
                password: String::new(),
            }),
            Err(Error::InvalidCredentials)
        );
    }

    #[test]
    fn ok_signup_logs_new_volunteer_in() {
        let mut store = Store::seeded();
        let user = LoginManager::new(&mut store)
            .signup_volunteer(SignupForm {
                first_name: "Alice".into(),
                last_name: "Durand".into(),
                username: "alice".into(),
                password: "pw".into(),
            })
            .unwrap();
        assert_eq!(user.interests, Some(Vec::new()));
        assert!(user.avatar.contains("Alice"));
        assert_eq!(store.current_user().map(|u| &u.id), Some(&user.id));
    }

    #[test]
    fn err_signup_duplicate_username_any_case() {
        let mut store = Store::seeded();
        let users_before = store.users.len();
        let result = LoginManager::new(&mut store).signup_volunteer(SignupForm {
            first_name: "Val".into(),
            username: "Vs827".into(),
            password: "pw".into(),
            ..Default::default()
        });
        assert_eq!(result, Err(Error::UsernameTaken));
        assert_eq!(store.users.len(), users_before);
    }

    #[test]
    fn err_signup_missing_first_name() {
        let mut store = Store::seeded();
        let result = LoginManager::new(&mut store).signup_volunteer(SignupForm {
            username: "nobody".into(),
            password: "pw".into(),
            ..Default::default()
        });
        assert_eq!(result, Err(Error::MissingField("first_name")));
    }

    #[test]
    fn logout_clears_session() {
        let mut store = Store::seeded();
        let mut manager = LoginManager::new(&mut store);
        manager.login(volunteer("maried", "password123")).unwrap();
        manager.logout();
        assert!(store.session.is_none());
    }

    #[test]
    fn attach_restores_organizer_with_persisted_organization() {
        let mut store = Store::seeded();
        let organization = Organization {
            id: OrganizationId::from("org-42"),
            name: "Les Jardins".into(),
            code: "NEW-2025".into(),
        };
        let session = LoginManager::new(&mut store)
            .attach(PersistedSession::organizer(organization.clone()))
            .unwrap();
        assert_eq!(session.user_id, UserId::from("admin1"));
        assert_eq!(store.managed_organization, organization);
    }
}
