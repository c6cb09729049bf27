use super::{CalendarStore, MongoDB, EVENTS, REMINDERS, USERS};
use crate::models::{Event, Reminder, ReminderPatch, ReminderSummary, TimeWindow, User, WindowMode};
use crate::utils::AppError;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::ReturnDocument;

fn event_projection() -> mongodb::bson::Document {
    doc! { "name": 1, "startDate": 1, "endDate": 1, "topicName": 1 }
}

#[async_trait]
impl CalendarStore for MongoDB {
    async fn find_user(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        let user = self
            .collection::<User>(USERS)
            .find_one(doc! { "_id": *id })
            .await?;
        Ok(user)
    }

    async fn insert_reminder(&self, reminder: Reminder) -> Result<Reminder, AppError> {
        let result = self
            .collection::<Reminder>(REMINDERS)
            .insert_one(&reminder)
            .await?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AppError::DatabaseError("Inserted reminder has no ObjectId".to_string()))?;

        Ok(Reminder { id: Some(id), ..reminder })
    }

    async fn list_reminders(&self, owner: &ObjectId) -> Result<Vec<Reminder>, AppError> {
        let cursor = self
            .collection::<Reminder>(REMINDERS)
            .find(doc! { "createdBy": *owner })
            .sort(doc! { "createdAt": 1, "_id": 1 })
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn find_reminder(&self, id: &ObjectId, owner: &ObjectId) -> Result<Option<Reminder>, AppError> {
        let reminder = self
            .collection::<Reminder>(REMINDERS)
            .find_one(doc! { "_id": *id, "createdBy": *owner })
            .await?;
        Ok(reminder)
    }

    async fn update_reminder(
        &self,
        id: &ObjectId,
        owner: &ObjectId,
        patch: &ReminderPatch,
        now: i64,
    ) -> Result<Option<Reminder>, AppError> {
        let updated = self
            .collection::<Reminder>(REMINDERS)
            .find_one_and_update(
                doc! { "_id": *id, "createdBy": *owner },
                doc! { "$set": patch.to_set_document(now) },
            )
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated)
    }

    async fn delete_reminder(&self, id: &ObjectId, owner: &ObjectId) -> Result<bool, AppError> {
        let result = self
            .collection::<Reminder>(REMINDERS)
            .delete_one(doc! { "_id": *id, "createdBy": *owner })
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn reminders_in_window(
        &self,
        owner: &ObjectId,
        window: TimeWindow,
        mode: WindowMode,
    ) -> Result<Vec<ReminderSummary>, AppError> {
        let mut filter = window.reminder_filter(mode);
        filter.insert("createdBy", *owner);

        let cursor = self
            .collection::<ReminderSummary>(REMINDERS)
            .find(filter)
            .projection(ReminderSummary::projection())
            .sort(doc! { "createdAt": 1, "_id": 1 })
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn events_in_window(&self, window: TimeWindow) -> Result<Vec<Event>, AppError> {
        let cursor = self
            .collection::<Event>(EVENTS)
            .find(window.event_filter())
            .projection(event_projection())
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn events_by_ids_in_window(&self, ids: &[ObjectId], window: TimeWindow) -> Result<Vec<Event>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut filter = window.event_filter();
        filter.insert("_id", doc! { "$in": ids.to_vec() });

        let cursor = self
            .collection::<Event>(EVENTS)
            .find(filter)
            .projection(event_projection())
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.database().run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
