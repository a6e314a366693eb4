use chrono::{Datelike, Local};

use super::store::Store;
use super::{Organization, OrganizationId, Role, Session, User, UserId};

pub struct OrganizationManager<'a> {
    store: &'a mut Store,
}

impl<'a> OrganizationManager<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("an organization needs a name")]
    MissingName,
    #[error("only an organizer can do this")]
    NotOrganizer,
}

fn required_name(name: &str) -> Result<String, Error> {
    let name = name.trim();
    if name.is_empty() {
        Err(Error::MissingName)
    } else {
        Ok(name.to_owned())
    }
}

impl OrganizationManager<'_> {
    /// Starts a new organization from scratch: a fresh organizer account,
    /// no missions, and that organizer signed in.
    pub fn create_organization(&mut self, name: &str) -> Result<Session, Error> {
        let name = required_name(name)?;
        let organization = Organization {
            id: OrganizationId::generate(),
            code: format!("NEW-{}", Local::now().year()),
            name: name.clone(),
        };
        let admin = User {
            id: UserId(format!("admin-{}", uuid::Uuid::new_v4().simple())),
            username: "admin_new".to_owned(),
            first_name: "Admin".to_owned(),
            last_name: name,
            avatar: String::new(),
            role: Role::Organizer,
            password: None,
            interests: None,
        };

        let session = Session {
            user_id: admin.id.clone(),
            role: Role::Organizer,
            organization: organization.clone(),
        };
        // The new account must come first so it is the one sessions reattach to.
        self.store.users.insert(0, admin);
        self.store.missions.clear();
        self.store.managed_organization = organization;
        self.store.session = Some(session.clone());
        tracing::info!(organization = %session.organization.id, "organization created");
        Ok(session)
    }

    pub fn rename_organization(&mut self, name: &str) -> Result<Organization, Error> {
        let name = required_name(name)?;
        let session = self
            .store
            .session
            .as_mut()
            .filter(|s| s.role == Role::Organizer)
            .ok_or(Error::NotOrganizer)?;
        session.organization.name = name;
        let organization = session.organization.clone();
        self.store.managed_organization = organization.clone();
        tracing::info!(organization = %organization.id, name = %organization.name, "organization renamed");
        Ok(organization)
    }

    /// Withdraws the user from every mission and deletes their record.
    /// Returns false when the user did not exist.
    pub fn forget_organization(&mut self, user_id: &UserId) -> bool {
        let Some(index) = self.store.users.iter().position(|u| &u.id == user_id) else {
            return false;
        };
        for mission in self.store.missions.iter_mut() {
            mission.participants.retain(|p| p != user_id);
        }
        self.store.users.remove(index);
        if self.store.session.as_ref().map(|s| &s.user_id) == Some(user_id) {
            self.store.session = None;
        }
        tracing::info!(user = %user_id, "organization forgotten, volunteer removed");
        true
    }
}
