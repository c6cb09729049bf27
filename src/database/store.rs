use crate::models::{Event, Reminder, ReminderPatch, ReminderSummary, TimeWindow, User, WindowMode};
use crate::utils::AppError;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

/// Persistence used by the calendar handlers.
///
/// Every reminder operation that takes an `owner` matches on both the
/// reminder id and `createdBy`, so a foreign reminder behaves exactly
/// like a missing one.
#[async_trait]
pub trait CalendarStore: Send + Sync {
    async fn find_user(&self, id: &ObjectId) -> Result<Option<User>, AppError>;

    /// Persists a new reminder and returns it with its generated id
    async fn insert_reminder(&self, reminder: Reminder) -> Result<Reminder, AppError>;

    /// All reminders of `owner`, oldest first
    async fn list_reminders(&self, owner: &ObjectId) -> Result<Vec<Reminder>, AppError>;

    async fn find_reminder(&self, id: &ObjectId, owner: &ObjectId) -> Result<Option<Reminder>, AppError>;

    /// Applies `patch` and returns the updated reminder, or `None` when not found
    async fn update_reminder(
        &self,
        id: &ObjectId,
        owner: &ObjectId,
        patch: &ReminderPatch,
        now: i64,
    ) -> Result<Option<Reminder>, AppError>;

    /// Returns whether a reminder was removed
    async fn delete_reminder(&self, id: &ObjectId, owner: &ObjectId) -> Result<bool, AppError>;

    async fn reminders_in_window(
        &self,
        owner: &ObjectId,
        window: TimeWindow,
        mode: WindowMode,
    ) -> Result<Vec<ReminderSummary>, AppError>;

    /// Events of any owner starting or ending inside `window`
    async fn events_in_window(&self, window: TimeWindow) -> Result<Vec<Event>, AppError>;

    /// Same as [`CalendarStore::events_in_window`], restricted to `ids`
    async fn events_by_ids_in_window(&self, ids: &[ObjectId], window: TimeWindow) -> Result<Vec<Event>, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}
