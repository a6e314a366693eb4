use super::{seed, Mission, MissionId, Organization, Role, Session, User, UserId};

/// Everything one browser sees: users, missions, the managed organization and
/// whoever is signed in. Managers borrow it mutably for the length of a call.
#[derive(Debug, Clone)]
pub struct Store {
    pub users: Vec<User>,
    pub missions: Vec<Mission>,
    pub managed_organization: Organization,
    pub session: Option<Session>,
}

impl Store {
    pub fn seeded() -> Self {
        Self {
            users: seed::users(),
            missions: seed::missions(),
            managed_organization: seed::organization(),
            session: None,
        }
    }

    pub fn empty(organization: Organization) -> Self {
        Self {
            users: Vec::new(),
            missions: Vec::new(),
            managed_organization: organization,
            session: None,
        }
    }

    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|u| &u.id == id)
    }

    pub fn user_by_username(&self, username: &str, role: Role) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.role == role && u.username.to_lowercase() == username.to_lowercase())
    }

    pub fn organizer_account(&self) -> Option<&User> {
        self.users.iter().find(|u| u.role == Role::Organizer)
    }

    pub fn mission(&self, id: &MissionId) -> Option<&Mission> {
        self.missions.iter().find(|m| &m.id == id)
    }

    pub fn mission_mut(&mut self, id: &MissionId) -> Option<&mut Mission> {
        self.missions.iter_mut().find(|m| &m.id == id)
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session.as_ref().and_then(|s| self.user(&s.user_id))
    }

    pub fn current_role(&self) -> Option<Role> {
        self.session.as_ref().map(|s| s.role)
    }
}
