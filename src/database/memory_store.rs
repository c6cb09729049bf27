use super::CalendarStore;
use crate::models::{Event, Reminder, ReminderPatch, ReminderSummary, TimeWindow, User, WindowMode};
use crate::utils::AppError;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    users: HashMap<ObjectId, User>,
    /// Kept in insertion order, which is creation order
    reminders: Vec<Reminder>,
    events: Vec<Event>,
}

/// Process-local store for development runs and tests
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) {
        self.state.write().await.users.insert(user.id, user);
    }

    #[cfg(test)]
    pub async fn insert_event(&self, event: Event) {
        self.state.write().await.events.push(event);
    }
}

fn is_owned(reminder: &Reminder, id: &ObjectId, owner: &ObjectId) -> bool {
    reminder.id.as_ref() == Some(id) && &reminder.created_by == owner
}

#[async_trait]
impl CalendarStore for MemoryStore {
    async fn find_user(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn insert_reminder(&self, mut reminder: Reminder) -> Result<Reminder, AppError> {
        reminder.id = Some(ObjectId::new());
        self.state.write().await.reminders.push(reminder.clone());
        Ok(reminder)
    }

    async fn list_reminders(&self, owner: &ObjectId) -> Result<Vec<Reminder>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .reminders
            .iter()
            .filter(|r| &r.created_by == owner)
            .cloned()
            .collect())
    }

    async fn find_reminder(&self, id: &ObjectId, owner: &ObjectId) -> Result<Option<Reminder>, AppError> {
        let state = self.state.read().await;
        Ok(state.reminders.iter().find(|r| is_owned(r, id, owner)).cloned())
    }

    async fn update_reminder(
        &self,
        id: &ObjectId,
        owner: &ObjectId,
        patch: &ReminderPatch,
        now: i64,
    ) -> Result<Option<Reminder>, AppError> {
        let mut state = self.state.write().await;
        Ok(state
            .reminders
            .iter_mut()
            .find(|r| is_owned(r, id, owner))
            .map(|reminder| {
                reminder.apply(patch, now);
                reminder.clone()
            }))
    }

    async fn delete_reminder(&self, id: &ObjectId, owner: &ObjectId) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let before = state.reminders.len();
        state.reminders.retain(|r| !is_owned(r, id, owner));
        Ok(state.reminders.len() < before)
    }

    async fn reminders_in_window(
        &self,
        owner: &ObjectId,
        window: TimeWindow,
        mode: WindowMode,
    ) -> Result<Vec<ReminderSummary>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .reminders
            .iter()
            .filter(|r| &r.created_by == owner)
            .filter(|r| window.matches_reminder(mode, r.start_time, r.end_time))
            .filter_map(ReminderSummary::from_reminder)
            .collect())
    }

    async fn events_in_window(&self, window: TimeWindow) -> Result<Vec<Event>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .events
            .iter()
            .filter(|e| window.matches_event(e.start_date, e.end_date))
            .cloned()
            .collect())
    }

    async fn events_by_ids_in_window(&self, ids: &[ObjectId], window: TimeWindow) -> Result<Vec<Event>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .events
            .iter()
            .filter(|e| ids.contains(&e.id))
            .filter(|e| window.matches_event(e.start_date, e.end_date))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
