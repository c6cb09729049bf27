use crate::utils::AppError;
use mongodb::bson::{doc, oid::ObjectId, Document};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields a reminder owner may change after creation
pub const UPDATABLE_FIELDS: &[&str] = &["title", "startTime", "endTime", "venue"];

/// Reminder (stored in the "reminders" collection)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub title: String,

    /// Epoch milliseconds
    pub start_time: i64,
    pub end_time: i64,

    pub venue: Option<String>,
    pub color: Option<String>,

    /// Recurrence descriptor (e.g. "daily", "weekly")
    pub repeat: Option<String>,
    pub description: Option<String>,

    /// Lead time or on/off flag, stored as sent by the client
    pub reminder: Option<Value>,

    /// Owning user, never changed after creation
    pub created_by: ObjectId,

    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Reminder {
    pub fn new(request: CreateReminderRequest, owner: ObjectId, now: i64) -> Self {
        Reminder {
            id: None,
            title: request.title,
            start_time: request.start_time,
            end_time: request.end_time,
            venue: request.venue,
            color: request.color,
            repeat: request.repeat,
            description: request.description,
            reminder: request.reminder,
            created_by: owner,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: &ReminderPatch, now: i64) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(start_time) = patch.start_time {
            self.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            self.end_time = end_time;
        }
        if let Some(venue) = &patch.venue {
            self.venue = Some(venue.clone());
        }
        self.updated_at = now;
    }
}

/// Request body for creating a reminder. A `createdBy` sent by the client is ignored.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReminderRequest {
    pub title: String,
    pub start_time: i64,
    pub end_time: i64,
    pub venue: Option<String>,
    pub color: Option<String>,
    pub repeat: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub reminder: Option<Value>,
}

/// Partial update restricted to [`UPDATABLE_FIELDS`]
#[derive(Debug, Clone, Default, PartialEq, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReminderPatch {
    pub title: Option<String>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub venue: Option<String>,
}

impl ReminderPatch {
    /// Validates a raw update body. Any key outside the updatable set rejects the whole body.
    pub fn from_body(body: Map<String, Value>) -> Result<Self, AppError> {
        if body.keys().any(|key| !UPDATABLE_FIELDS.contains(&key.as_str())) {
            return Err(AppError::InvalidUpdate {
                allowed: UPDATABLE_FIELDS,
            });
        }

        if let Some((key, _)) = body.iter().find(|(_, value)| value.is_null()) {
            return Err(AppError::InvalidRequest(format!("Invalid update body: {} cannot be null", key)));
        }

        serde_json::from_value(Value::Object(body))
            .map_err(|e| AppError::InvalidRequest(format!("Invalid update body: {}", e)))
    }

    pub fn is_empty(&self) -> bool {
        self == &ReminderPatch::default()
    }

    /// `$set` document for the fields present, plus `updatedAt`
    pub fn to_set_document(&self, now: i64) -> Document {
        let mut set = doc! { "updatedAt": now };

        if let Some(title) = &self.title {
            set.insert("title", title.as_str());
        }
        if let Some(start_time) = self.start_time {
            set.insert("startTime", start_time);
        }
        if let Some(end_time) = self.end_time {
            set.insert("endTime", end_time);
        }
        if let Some(venue) = &self.venue {
            set.insert("venue", venue.as_str());
        }

        set
    }
}

/// Reminder as returned by the window listing (owner and bookkeeping fields left out)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSummary {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub start_time: i64,
    pub end_time: i64,
    pub venue: Option<String>,
    pub color: Option<String>,
    pub repeat: Option<String>,
    pub description: Option<String>,
    pub reminder: Option<Value>,
}

impl ReminderSummary {
    /// Projection used when reading summaries from MongoDB
    pub fn projection() -> Document {
        doc! {
            "title": 1,
            "startTime": 1,
            "endTime": 1,
            "venue": 1,
            "color": 1,
            "repeat": 1,
            "description": 1,
            "reminder": 1,
        }
    }

    pub fn from_reminder(reminder: &Reminder) -> Option<Self> {
        Some(ReminderSummary {
            id: reminder.id?,
            title: reminder.title.clone(),
            start_time: reminder.start_time,
            end_time: reminder.end_time,
            venue: reminder.venue.clone(),
            color: reminder.color.clone(),
            repeat: reminder.repeat.clone(),
            description: reminder.description.clone(),
            reminder: reminder.reminder.clone(),
        })
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReminderResponse {
    pub id: String,
    pub title: String,
    pub start_time: i64,
    pub end_time: i64,
    pub venue: Option<String>,
    pub color: Option<String>,
    pub repeat: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub reminder: Option<Value>,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Reminder> for ReminderResponse {
    fn from(reminder: Reminder) -> Self {
        ReminderResponse {
            id: reminder.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: reminder.title,
            start_time: reminder.start_time,
            end_time: reminder.end_time,
            venue: reminder.venue,
            color: reminder.color,
            repeat: reminder.repeat,
            description: reminder.description,
            reminder: reminder.reminder,
            created_by: reminder.created_by.to_hex(),
            created_at: reminder.created_at,
            updated_at: reminder.updated_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSummaryResponse {
    pub id: String,
    pub title: String,
    pub start_time: i64,
    pub end_time: i64,
    pub venue: Option<String>,
    pub color: Option<String>,
    pub repeat: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub reminder: Option<Value>,
}

impl From<ReminderSummary> for ReminderSummaryResponse {
    fn from(summary: ReminderSummary) -> Self {
        ReminderSummaryResponse {
            id: summary.id.to_hex(),
            title: summary.title,
            start_time: summary.start_time,
            end_time: summary.end_time,
            venue: summary.venue,
            color: summary.color,
            repeat: summary.repeat,
            description: summary.description,
            reminder: summary.reminder,
        }
    }
}
