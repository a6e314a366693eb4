use chrono::Utc;

use super::store::Store;
use super::{ChatMessage, MessageId, MissionId, UserId};

pub struct ChatManager<'a> {
    store: &'a mut Store,
}

impl<'a> ChatManager<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }
}

impl ChatManager<'_> {
    /// Appends to the mission's chat log. Blank text, a sender other than the
    /// signed-in user, or an unknown mission leave everything unchanged.
    pub fn send_message(
        &mut self,
        mission_id: &MissionId,
        sender_id: &UserId,
        text: &str,
    ) -> Option<ChatMessage> {
        if text.trim().is_empty() {
            return None;
        }
        let sender = self.store.current_user().filter(|u| &u.id == sender_id)?;
        let message = ChatMessage {
            id: MessageId::generate(),
            user_id: sender.id.clone(),
            user_name: sender.first_name.clone(),
            user_avatar: sender.avatar.clone(),
            text: text.to_owned(),
            time_created: Utc::now(),
        };

        let mission = self.store.mission_mut(mission_id)?;
        mission.chat_messages.push(message.clone());
        tracing::debug!(mission = %mission_id, user = %sender_id, "chat message sent");
        Some(message)
    }

    pub fn list_chats(&self, mission_id: &MissionId) -> &[ChatMessage] {
        self.store
            .mission(mission_id)
            .map(|m| m.chat_messages.as_slice())
            .unwrap_or_default()
    }
}
