use std::fmt::Display;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod calendar;
pub mod chat_manager;
pub mod login_manager;
pub mod mission_manager;
pub mod organization_manager;
pub mod profile_manager;
mod seed;
pub mod session_manager;
pub mod store;

macro_rules! string_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn generate() -> Self {
                Self(format!(concat!($prefix, "-{}"), Uuid::new_v4().simple()))
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_owned()))
            }
        }
    };
}

string_id!(UserId, "u");
string_id!(MissionId, "m");
string_id!(MessageId, "c");
string_id!(OrganizationId, "org");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Organizer,
    Volunteer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: String,
    pub role: Role,
    /// Plaintext, compared as-is. Organizer accounts carry none.
    pub password: Option<String>,
    /// Organizer accounts carry no interest list at all.
    pub interests: Option<Vec<String>>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Event,
    Maintenance,
    Social,
    #[serde(rename = "Autre")]
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Social,
        Category::Maintenance,
        Category::Event,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Event => "Event",
            Category::Maintenance => "Maintenance",
            Category::Social => "Social",
            Category::Other => "Autre",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| format!("unknown category: {s}"))
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub user_id: UserId,
    pub user_name: String,
    pub user_avatar: String,
    pub text: String,
    pub time_created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mission {
    pub id: MissionId,
    pub title: String,
    pub location: String,
    pub date_start: NaiveDateTime,
    pub date_end: NaiveDateTime,
    pub description: String,
    pub category: Category,
    /// Informational only, registration never checks it.
    pub max_participants: Option<u32>,
    pub participants: Vec<UserId>,
    pub chat_messages: Vec<ChatMessage>,
}

impl Mission {
    pub fn is_registered(&self, user_id: &UserId) -> bool {
        self.participants.contains(user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub role: Role,
    pub organization: Organization,
}
