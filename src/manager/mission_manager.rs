use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use super::store::Store;
use super::{Category, Mission, MissionId, Role, User, UserId};
use crate::utils::parse_datetime_local;

/// Location used when a new mission is saved without one.
pub const LOCATION_PLACEHOLDER: &str = "À définir";

pub struct MissionManager<'a> {
    store: &'a mut Store,
}

impl<'a> MissionManager<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("a mission needs a title")]
    MissingTitle,
    #[error("a mission needs a start date")]
    MissingStart,
    #[error("the end date cannot precede the start date")]
    EndBeforeStart,
    #[error("invalid {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// An unsaved mission. With `id` set it edits that mission, otherwise saving
/// creates a new one. Unset fields leave the edited mission untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissionForm {
    pub id: Option<MissionId>,
    pub title: Option<String>,
    pub location: Option<String>,
    pub date_start: Option<NaiveDateTime>,
    pub date_end: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub max_participants: Option<u32>,
}

/// Mission fields as submitted, before any parsing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MissionInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub date_start: Option<String>,
    #[serde(default)]
    pub date_end: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub max_participants: Option<String>,
}

/// Blank means unset; anything else must parse.
fn parse_field<T>(
    field: &'static str,
    value: Option<&str>,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<Option<T>, Error> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse(v).map(Some).ok_or_else(|| Error::InvalidField {
            field,
            value: v.to_owned(),
        }),
    }
}

impl TryFrom<&MissionInput> for MissionForm {
    type Error = Error;

    fn try_from(input: &MissionInput) -> Result<Self, Error> {
        Ok(Self {
            id: parse_field("id", input.id.as_deref(), |v| Some(MissionId::from(v)))?,
            title: input.title.clone(),
            location: input.location.clone(),
            date_start: parse_field("start date", input.date_start.as_deref(), parse_datetime_local)?,
            date_end: parse_field("end date", input.date_end.as_deref(), parse_datetime_local)?,
            description: input.description.clone(),
            category: parse_field("category", input.category.as_deref(), Category::from_label)?,
            max_participants: parse_field("capacity", input.max_participants.as_deref(), |v| {
                v.parse().ok()
            })?,
        })
    }
}

impl MissionForm {
    pub fn blank() -> Self {
        Self {
            category: Some(Category::Event),
            ..Default::default()
        }
    }

    /// Draft prefilled from a calendar day, 09:00 to 12:00.
    pub fn for_day(day: NaiveDate) -> Self {
        let at = |h| NaiveTime::from_hms_opt(h, 0, 0).map(|t| day.and_time(t));
        Self {
            date_start: at(9),
            date_end: at(12),
            ..Self::blank()
        }
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }
}

impl From<&Mission> for MissionForm {
    fn from(mission: &Mission) -> Self {
        Self {
            id: Some(mission.id.clone()),
            title: Some(mission.title.clone()),
            location: Some(mission.location.clone()),
            date_start: Some(mission.date_start),
            date_end: Some(mission.date_end),
            description: Some(mission.description.clone()),
            category: Some(mission.category),
            max_participants: mission.max_participants,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(Mission),
    Updated(Mission),
    /// The edited mission no longer exists; nothing changed.
    Missing(MissionId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Registered,
    Withdrawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// `Tout`, blank or unknown labels mean no filter.
    pub fn from_label(label: Option<&str>) -> Self {
        label
            .and_then(Category::from_label)
            .map_or(CategoryFilter::All, CategoryFilter::Only)
    }

    pub fn label(&self) -> &'static str {
        match self {
            CategoryFilter::All => "Tout",
            CategoryFilter::Only(c) => c.label(),
        }
    }

    fn matches(&self, mission: &Mission) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => mission.category == *c,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_missions: usize,
    pub total_volunteers: usize,
    pub total_participations: usize,
    pub per_mission: Vec<(String, usize)>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl MissionManager<'_> {
    pub fn save_mission(&mut self, form: MissionForm) -> Result<SaveOutcome, Error> {
        let title = non_blank(form.title)
            .map(|t| t.trim().to_owned())
            .ok_or(Error::MissingTitle)?;
        let date_start = form.date_start.ok_or(Error::MissingStart)?;
        let date_end = form.date_end.unwrap_or(date_start);
        if date_end < date_start {
            return Err(Error::EndBeforeStart);
        }

        let Some(id) = form.id else {
            let mission = Mission {
                id: MissionId::generate(),
                title,
                location: non_blank(form.location)
                    .unwrap_or_else(|| LOCATION_PLACEHOLDER.to_owned()),
                date_start,
                date_end,
                description: form.description.unwrap_or_default(),
                category: form.category.unwrap_or_default(),
                max_participants: form.max_participants,
                participants: Vec::new(),
                chat_messages: Vec::new(),
            };
            tracing::info!(mission = %mission.id, title = %mission.title, "mission created");
            self.store.missions.push(mission.clone());
            return Ok(SaveOutcome::Created(mission));
        };

        let Some(mission) = self.store.mission_mut(&id) else {
            tracing::debug!(mission = %id, "edited mission is gone");
            return Ok(SaveOutcome::Missing(id));
        };
        mission.title = title;
        mission.date_start = date_start;
        mission.date_end = date_end;
        if let Some(location) = non_blank(form.location) {
            mission.location = location;
        }
        if let Some(description) = form.description {
            mission.description = description;
        }
        if let Some(category) = form.category {
            mission.category = category;
        }
        if form.max_participants.is_some() {
            mission.max_participants = form.max_participants;
        }
        tracing::info!(mission = %mission.id, "mission updated");
        Ok(SaveOutcome::Updated(mission.clone()))
    }

    /// Deleting an unknown id is a no-op.
    pub fn delete_mission(&mut self, id: &MissionId) -> Option<Mission> {
        let index = self.store.missions.iter().position(|m| &m.id == id)?;
        let mission = self.store.missions.remove(index);
        tracing::info!(mission = %mission.id, "mission deleted");
        Some(mission)
    }

    pub fn toggle_registration(
        &mut self,
        mission_id: &MissionId,
        user_id: &UserId,
    ) -> Option<Registration> {
        let mission = self.store.mission_mut(mission_id)?;
        let registration = if mission.is_registered(user_id) {
            mission.participants.retain(|p| p != user_id);
            Registration::Withdrawn
        } else {
            mission.participants.push(user_id.clone());
            Registration::Registered
        };
        tracing::info!(mission = %mission_id, user = %user_id, ?registration, "registration toggled");
        Some(registration)
    }

    pub fn missions_of(&self, user_id: &UserId) -> Vec<&Mission> {
        self.store
            .missions
            .iter()
            .filter(|m| m.is_registered(user_id))
            .collect()
    }

    pub fn available_missions(&self, user_id: &UserId, filter: CategoryFilter) -> Vec<&Mission> {
        self.store
            .missions
            .iter()
            .filter(|m| !m.is_registered(user_id) && filter.matches(m))
            .collect()
    }

    pub fn participants(&self, mission_id: &MissionId) -> Vec<&User> {
        let Some(mission) = self.store.mission(mission_id) else {
            return Vec::new();
        };
        self.store
            .users
            .iter()
            .filter(|u| mission.is_registered(&u.id))
            .collect()
    }

    pub fn stats(&self) -> DashboardStats {
        let missions = &self.store.missions;
        DashboardStats {
            total_missions: missions.len(),
            total_volunteers: self
                .store
                .users
                .iter()
                .filter(|u| u.role == Role::Volunteer)
                .count(),
            total_participations: missions.iter().map(|m| m.participants.len()).sum(),
            per_mission: missions
                .iter()
                .map(|m| (m.title.clone(), m.participants.len()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse_datetime_local;

    fn form(title: &str, start: &str) -> MissionForm {
        MissionForm {
            title: Some(title.into()),
            date_start: parse_datetime_local(start),
            ..MissionForm::blank()
        }
    }

    fn created(outcome: SaveOutcome) -> Mission {
        match outcome {
            SaveOutcome::Created(m) => m,
            other => panic!("expected a new mission, got {other:?}"),
        }
    }

    #[test]
    fn ok_create_defaults_end_location_and_collections() {
        let mut store = Store::seeded();
        let mission = created(
            MissionManager::new(&mut store)
                .save_mission(form("Nettoyage", "2025-06-15T09:00"))
                .unwrap(),
        );
        assert_eq!(mission.date_end, mission.date_start);
        assert_eq!(mission.location, LOCATION_PLACEHOLDER);
        assert_eq!(mission.category, Category::Event);
        assert!(mission.participants.is_empty());
        assert!(mission.chat_messages.is_empty());
        assert_eq!(store.missions.len(), 4);
    }

    #[test]
    fn err_create_without_title_or_start() {
        let mut store = Store::seeded();
        let mut manager = MissionManager::new(&mut store);
        assert_eq!(
            manager.save_mission(form("   ", "2025-06-15T09:00")),
            Err(Error::MissingTitle)
        );
        assert_eq!(
            manager.save_mission(MissionForm {
                title: Some("Sans date".into()),
                ..Default::default()
            }),
            Err(Error::MissingStart)
        );
        assert_eq!(store.missions.len(), 3);
    }

    #[test]
    fn input_parses_blank_as_unset_and_rejects_garbage() {
        let input = MissionInput {
            id: Some(String::new()),
            title: Some("Atelier".into()),
            date_start: Some("2025-07-01T10:00".into()),
            date_end: Some(" ".into()),
            category: Some("Social".into()),
            max_participants: Some("8".into()),
            ..Default::default()
        };
        let form = MissionForm::try_from(&input).unwrap();
        assert_eq!(form.id, None);
        assert_eq!(form.date_start, parse_datetime_local("2025-07-01T10:00"));
        assert_eq!(form.date_end, None);
        assert_eq!(form.category, Some(Category::Social));
        assert_eq!(form.max_participants, Some(8));

        let bad_date = MissionInput {
            date_start: Some("15/06/2025".into()),
            ..input.clone()
        };
        assert_eq!(
            MissionForm::try_from(&bad_date),
            Err(Error::InvalidField {
                field: "start date",
                value: "15/06/2025".into()
            })
        );
        let bad_capacity = MissionInput {
            max_participants: Some("beaucoup".into()),
            ..input
        };
        assert!(matches!(
            MissionForm::try_from(&bad_capacity),
            Err(Error::InvalidField { field: "capacity", .. })
        ));
    }

    #[test]
    fn err_end_before_start() {
        let mut store = Store::seeded();
        let result = MissionManager::new(&mut store).save_mission(MissionForm {
            date_end: parse_datetime_local("2025-06-14T09:00"),
            ..form("Nettoyage", "2025-06-15T09:00")
        });
        assert_eq!(result, Err(Error::EndBeforeStart));
    }

    #[test]
    fn ok_edit_keeps_identity_participants_and_chat() {
        let mut store = Store::seeded();
        let before = store.mission(&"m1".into()).unwrap().clone();
        let mut edit = MissionForm::from(&before);
        edit.title = Some("Grand nettoyage".into());
        edit.location = Some(String::new());
        edit.date_end = None;

        let outcome = MissionManager::new(&mut store).save_mission(edit).unwrap();
        let SaveOutcome::Updated(after) = outcome else {
            panic!("expected an update, got {outcome:?}");
        };
        assert_eq!(after.id, before.id);
        assert_eq!(after.title, "Grand nettoyage");
        assert_eq!(after.location, before.location);
        assert_eq!(after.date_end, before.date_start);
        assert_eq!(after.participants, before.participants);
        assert_eq!(after.chat_messages, before.chat_messages);
        assert_eq!(store.missions.len(), 3);
    }

    #[test]
    fn edit_of_missing_mission_changes_nothing() {
        let mut store = Store::seeded();
        let result = MissionManager::new(&mut store).save_mission(MissionForm {
            id: Some("gone".into()),
            ..form("Fantôme", "2025-06-15T09:00")
        });
        assert_eq!(result, Ok(SaveOutcome::Missing("gone".into())));
        assert_eq!(store.missions.len(), 3);
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = Store::seeded();
        let mut manager = MissionManager::new(&mut store);
        assert!(manager.delete_mission(&"m2".into()).is_some());
        assert!(manager.delete_mission(&"m2".into()).is_none());
        assert!(manager.delete_mission(&"nope".into()).is_none());
        assert_eq!(store.missions.len(), 2);
    }

    #[test]
    fn toggle_registration_twice_restores_participants() {
        let mut store = Store::seeded();
        for mission in ["m1", "m2", "m3"] {
            let id = MissionId::from(mission);
            let before = store.mission(&id).unwrap().participants.clone();
            let mut manager = MissionManager::new(&mut store);
            for user in ["u1", "u_valentin"] {
                manager.toggle_registration(&id, &user.into());
                manager.toggle_registration(&id, &user.into());
            }
            assert_eq!(store.mission(&id).unwrap().participants, before);
        }
    }

    #[test]
    fn scenario_register_then_withdraw() {
        let mut store = Store::seeded();
        let mut manager = MissionManager::new(&mut store);
        let mission = created(
            manager
                .save_mission(form("Nettoyage", "2025-06-15T09:00"))
                .unwrap(),
        );
        let u1 = UserId::from("u1");

        assert_eq!(
            manager.toggle_registration(&mission.id, &u1),
            Some(Registration::Registered)
        );
        assert_eq!(store.mission(&mission.id).unwrap().participants, vec![u1.clone()]);

        assert_eq!(
            MissionManager::new(&mut store).toggle_registration(&mission.id, &u1),
            Some(Registration::Withdrawn)
        );
        assert!(store.mission(&mission.id).unwrap().participants.is_empty());
    }

    #[test]
    fn registration_ignores_max_participants() {
        let mut store = Store::seeded();
        let m3 = MissionId::from("m3");
        let mut manager = MissionManager::new(&mut store);
        for user in ["u1", "u2", "u3", "u4"] {
            manager.toggle_registration(&m3, &user.into());
        }
        let mission = store.mission(&m3).unwrap();
        assert_eq!(mission.max_participants, Some(3));
        assert_eq!(mission.participants.len(), 4);
    }

    #[test]
    fn toggle_on_unknown_mission_is_none() {
        let mut store = Store::seeded();
        assert_eq!(
            MissionManager::new(&mut store).toggle_registration(&"nope".into(), &"u1".into()),
            None
        );
    }

    #[test]
    fn volunteer_views_split_registered_and_available() {
        let mut store = Store::seeded();
        let manager = MissionManager::new(&mut store);
        let u1 = UserId::from("u1");

        let mine: Vec<_> = manager.missions_of(&u1).iter().map(|m| m.id.0.clone()).collect();
        assert_eq!(mine, ["m1", "m2"]);

        let available = manager.available_missions(&u1, CategoryFilter::All);
        assert_eq!(available.len(), 1);
        assert!(manager
            .available_missions(&u1, CategoryFilter::Only(Category::Social))
            .is_empty());
    }

    #[test]
    fn category_filter_from_label() {
        assert_eq!(CategoryFilter::from_label(None), CategoryFilter::All);
        assert_eq!(CategoryFilter::from_label(Some("Tout")), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::from_label(Some("Autre")),
            CategoryFilter::Only(Category::Other)
        );
    }

    #[test]
    fn participants_resolve_to_users() {
        let mut store = Store::seeded();
        let manager = MissionManager::new(&mut store);
        let names: Vec<_> = manager
            .participants(&"m1".into())
            .iter()
            .map(|u| u.first_name.clone())
            .collect();
        assert_eq!(names, ["Marie", "Jean"]);
        assert!(manager.participants(&"nope".into()).is_empty());
    }

    #[test]
    fn stats_count_volunteers_and_participations() {
        let mut store = Store::seeded();
        let stats = MissionManager::new(&mut store).stats();
        assert_eq!(stats.total_missions, 3);
        assert_eq!(stats.total_volunteers, 5);
        assert_eq!(stats.total_participations, 5);
        assert_eq!(stats.per_mission[1], ("Distribution Alimentaire".to_owned(), 3));
    }

    #[test]
    fn calendar_draft_runs_nine_to_noon() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 18).unwrap();
        let draft = MissionForm::for_day(day);
        assert_eq!(draft.date_start, parse_datetime_local("2025-06-18T09:00"));
        assert_eq!(draft.date_end, parse_datetime_local("2025-06-18T12:00"));
        assert!(!draft.is_edit());
    }
}
