use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Extension,
};
use chrono::Local;
use serde::Deserialize;

use crate::manager::{
    calendar::{self, MonthGrid, YearMonth},
    mission_manager::{CategoryFilter, DashboardStats, MissionManager},
    session_manager::BrowserId,
    store::Store,
    Category, Mission, Role, UserId,
};
use crate::utils::empty_string_as_none;
use crate::AppState;

/// Display-ready mission, shared by both dashboards.
pub struct MissionCard {
    pub id: String,
    pub title: String,
    pub location: String,
    pub category: &'static str,
    pub when: String,
    pub description: String,
    pub participant_count: usize,
    pub capacity: String,
    pub registered: bool,
    pub avatars: Vec<String>,
    pub message_count: usize,
}

fn when(mission: &Mission) -> String {
    let (start, end) = (mission.date_start, mission.date_end);
    if start.date() == end.date() {
        format!(
            "{} {} - {}",
            start.format("%d/%m/%Y"),
            start.format("%H:%M"),
            end.format("%H:%M")
        )
    } else {
        format!(
            "{} → {}",
            start.format("%d/%m/%Y %H:%M"),
            end.format("%d/%m/%Y %H:%M")
        )
    }
}

impl MissionCard {
    pub fn new(mission: &Mission, store: &Store, viewer: Option<&UserId>) -> Self {
        let participant_count = mission.participants.len();
        Self {
            id: mission.id.to_string(),
            title: mission.title.clone(),
            location: mission.location.clone(),
            category: mission.category.label(),
            when: when(mission),
            description: mission.description.clone(),
            participant_count,
            capacity: match mission.max_participants {
                Some(max) => format!("{participant_count} / {max}"),
                None => participant_count.to_string(),
            },
            registered: viewer.is_some_and(|v| mission.is_registered(v)),
            avatars: mission
                .participants
                .iter()
                .filter_map(|id| store.user(id))
                .take(4)
                .map(|u| u.avatar.clone())
                .collect(),
            message_count: mission.chat_messages.len(),
        }
    }
}

pub struct CalendarCell {
    pub day: u32,
    pub date: String,
    pub active: bool,
    pub titles: String,
}

pub struct CalendarView {
    pub label: String,
    pub prev: YearMonth,
    pub next: YearMonth,
    pub cells: Vec<CalendarCell>,
}

impl CalendarView {
    pub fn new(month: YearMonth, missions: &[Mission]) -> Self {
        let grid = MonthGrid::of(month);
        let active = calendar::days_with_missions(month, missions);

        let blanks = (0..grid.leading_offset).map(|_| CalendarCell {
            day: 0,
            date: String::new(),
            active: false,
            titles: String::new(),
        });
        let days = (1..=grid.days_in_month).filter_map(|day| {
            let date = month.day(day)?;
            let titles = calendar::missions_on(date, missions)
                .iter()
                .map(|m| m.title.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            Some(CalendarCell {
                day,
                date: date.format("%Y-%m-%d").to_string(),
                active: active.contains(&day),
                titles,
            })
        });

        Self {
            label: month.label(),
            prev: month.shift(-1),
            next: month.shift(1),
            cells: blanks.chain(days).collect(),
        }
    }
}

pub struct ChartBar {
    pub label: String,
    pub count: usize,
    pub percent: usize,
}

fn chart(stats: &DashboardStats) -> Vec<ChartBar> {
    let max = stats
        .per_mission
        .iter()
        .map(|(_, c)| *c)
        .max()
        .unwrap_or(0)
        .max(1);
    stats
        .per_mission
        .iter()
        .map(|(title, count)| ChartBar {
            label: title.chars().take(10).collect(),
            count: *count,
            percent: count * 100 / max,
        })
        .collect()
}

pub struct FilterChip {
    pub label: &'static str,
    pub active: bool,
}

#[derive(Deserialize, Default)]
pub struct DashboardQuery {
    #[serde(default)]
    category: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    year: Option<i32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    month: Option<u32>,
}

impl DashboardQuery {
    fn month(&self) -> YearMonth {
        self.year
            .zip(self.month)
            .and_then(|(y, m)| YearMonth::new(y, m))
            .unwrap_or_else(|| YearMonth::of(Local::now().date_naive()))
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct LandingTemplate {
    organization_name: String,
}

#[derive(Template)]
#[template(path = "organizer/dashboard.html")]
pub struct OrganizerDashboardTemplate {
    organization_name: String,
    organization_code: String,
    total_missions: usize,
    total_volunteers: usize,
    total_participations: usize,
    bars: Vec<ChartBar>,
    calendar: CalendarView,
    missions: Vec<MissionCard>,
}

#[derive(Template)]
#[template(path = "volunteer/dashboard.html")]
pub struct VolunteerDashboardTemplate {
    user_name: String,
    avatar: String,
    organization_name: String,
    interests: Vec<String>,
    my_missions: Vec<MissionCard>,
    available: Vec<MissionCard>,
    filters: Vec<FilterChip>,
    selected: &'static str,
}

#[derive(Template)]
#[template(path = "organizer/calendar_fragment.html")]
pub struct CalendarTemplate {
    calendar: CalendarView,
}

fn organizer_dashboard(store: &mut Store, month: YearMonth) -> OrganizerDashboardTemplate {
    let stats = MissionManager::new(store).stats();
    let store: &Store = store;
    let organization = &store.managed_organization;
    OrganizerDashboardTemplate {
        organization_name: organization.name.clone(),
        organization_code: organization.code.clone(),
        total_missions: stats.total_missions,
        total_volunteers: stats.total_volunteers,
        total_participations: stats.total_participations,
        bars: chart(&stats),
        calendar: CalendarView::new(month, &store.missions),
        missions: store
            .missions
            .iter()
            .map(|m| MissionCard::new(m, store, None))
            .collect(),
    }
}

fn volunteer_dashboard(store: &mut Store, filter: CategoryFilter) -> Option<VolunteerDashboardTemplate> {
    let user = store.current_user()?.clone();
    let organization_name = store
        .session
        .as_ref()
        .map(|s| s.organization.name.clone())
        .unwrap_or_default();

    let manager = MissionManager::new(store);
    let mine: Vec<Mission> = manager.missions_of(&user.id).into_iter().cloned().collect();
    let available: Vec<Mission> = manager
        .available_missions(&user.id, filter)
        .into_iter()
        .cloned()
        .collect();

    let store: &Store = store;
    let card = |m: &Mission| MissionCard::new(m, store, Some(&user.id));
    let filters = std::iter::once(CategoryFilter::All)
        .chain(Category::ALL.into_iter().map(CategoryFilter::Only))
        .map(|f| FilterChip {
            label: f.label(),
            active: f == filter,
        })
        .collect();

    Some(VolunteerDashboardTemplate {
        user_name: user.full_name(),
        avatar: user.avatar.clone(),
        organization_name,
        interests: user.interests.clone().unwrap_or_default(),
        my_missions: mine.iter().map(card).collect(),
        available: available.iter().map(card).collect(),
        filters,
        selected: filter.label(),
    })
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    Extension(browser): Extension<BrowserId>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let mut workspace = state.workspaces.get(&browser).await;
    let store = &mut workspace.store;

    match store.current_role() {
        Some(Role::Organizer) => organizer_dashboard(store, query.month()).into_response(),
        Some(Role::Volunteer) => {
            let filter = CategoryFilter::from_label(query.category.as_deref());
            match volunteer_dashboard(store, filter) {
                Some(dashboard) => dashboard.into_response(),
                None => landing(store).into_response(),
            }
        }
        None => landing(store).into_response(),
    }
}

fn landing(store: &Store) -> LandingTemplate {
    LandingTemplate {
        organization_name: store.managed_organization.name.clone(),
    }
}

pub async fn calendar(
    State(state): State<Arc<AppState>>,
    Extension(browser): Extension<BrowserId>,
    Query(query): Query<DashboardQuery>,
) -> CalendarTemplate {
    let workspace = state.workspaces.get(&browser).await;
    CalendarTemplate {
        calendar: CalendarView::new(query.month(), &workspace.store.missions),
    }
}
