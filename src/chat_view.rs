use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Form,
};
use chrono::Local;
use serde::Deserialize;

use crate::manager::{
    chat_manager::ChatManager, session_manager::BrowserId, store::Store, MissionId,
};
use crate::AppState;

pub struct MessageView {
    author: String,
    avatar: String,
    text: String,
    time: String,
    mine: bool,
}

#[derive(Template)]
#[template(path = "chat_view/chat.html")]
pub struct ChatTemplate {
    mission_id: String,
    title: String,
    messages: Vec<MessageView>,
}

fn render_chat(store: &mut Store, mission_id: &MissionId) -> Option<ChatTemplate> {
    let me = store.session.as_ref()?.user_id.clone();
    let title = store.mission(mission_id)?.title.clone();
    let messages = ChatManager::new(store)
        .list_chats(mission_id)
        .iter()
        .map(|c| MessageView {
            author: c.user_name.clone(),
            avatar: c.user_avatar.clone(),
            text: c.text.clone(),
            time: c.time_created.with_timezone(&Local).format("%H:%M").to_string(),
            mine: c.user_id == me,
        })
        .collect();
    Some(ChatTemplate {
        mission_id: mission_id.to_string(),
        title,
        messages,
    })
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Extension(browser): Extension<BrowserId>,
    Path(mission_id): Path<MissionId>,
) -> Response {
    let mut workspace = state.workspaces.get(&browser).await;
    match render_chat(&mut workspace.store, &mission_id) {
        Some(chat) => chat.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[derive(Deserialize)]
pub struct NewMessageForm {
    text: String,
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(browser): Extension<BrowserId>,
    Path(mission_id): Path<MissionId>,
    Form(form): Form<NewMessageForm>,
) -> Response {
    let mut workspace = state.workspaces.get(&browser).await;
    let store = &mut workspace.store;
    if let Some(sender) = store.session.as_ref().map(|s| s.user_id.clone()) {
        ChatManager::new(store).send_message(&mission_id, &sender, &form.text);
    }
    match render_chat(store, &mission_id) {
        Some(chat) => chat.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
