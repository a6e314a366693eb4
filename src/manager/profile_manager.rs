use super::store::Store;
use super::{User, UserId};

pub const MIN_INTERESTS: usize = 3;

pub struct ProfileManager<'a> {
    store: &'a mut Store,
}

impl<'a> ProfileManager<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("at least 3 interests are required, got {0}")]
    InsufficientInterests(usize),
}

/// Profile fields being edited, detached from the store until saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub avatar: String,
    pub interests: Option<Vec<String>>,
}

impl From<&User> for ProfileDraft {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            avatar: user.avatar.clone(),
            interests: user.interests.clone(),
        }
    }
}

impl ProfileDraft {
    pub fn add_interest(&mut self, tag: &str) {
        let tag = tag.trim();
        if tag.is_empty() {
            return;
        }
        if let Some(interests) = self.interests.as_mut() {
            if !interests.iter().any(|i| i == tag) {
                interests.push(tag.to_owned());
            }
        }
    }

    pub fn remove_interest(&mut self, tag: &str) {
        if let Some(interests) = self.interests.as_mut() {
            interests.retain(|i| i != tag);
        }
    }

    pub fn interests(&self) -> &[String] {
        self.interests.as_deref().unwrap_or_default()
    }
}

impl ProfileManager<'_> {
    /// Commits the draft over the matching user. An unknown user is a no-op.
    pub fn save(&mut self, draft: ProfileDraft) -> Result<Option<User>, Error> {
        if let Some(interests) = &draft.interests {
            if interests.len() < MIN_INTERESTS {
                return Err(Error::InsufficientInterests(interests.len()));
            }
        }

        let Some(user) = self.store.users.iter_mut().find(|u| u.id == draft.user_id) else {
            return Ok(None);
        };
        user.first_name = draft.first_name;
        user.last_name = draft.last_name;
        user.avatar = draft.avatar;
        user.interests = draft.interests;
        tracing::info!(user = %user.id, "profile saved");
        Ok(Some(user.clone()))
    }
}
