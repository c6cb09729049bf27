use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Shared calendar event, read through the {name, startDate, endDate, topicName} projection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub start_date: i64,
    pub end_date: i64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub topic_name: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub name: String,
    pub start_date: i64,
    pub end_date: i64,
    pub topic_name: Option<String>,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        EventResponse {
            id: event.id.to_hex(),
            name: event.name,
            start_date: event.start_date,
            end_date: event.end_date,
            topic_name: event.topic_name,
        }
    }
}
