use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Account record from the "users" collection, owned by the identity service
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    /// Events the user starred (field name kept as stored)
    #[serde(rename = "staredEvents", default)]
    pub starred_events: Vec<ObjectId>,
}

/// Identity attached to a request once the token is verified and the user exists
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: ObjectId,
    pub starred_events: Vec<ObjectId>,
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        AuthenticatedUser {
            id: user.id,
            starred_events: user.starred_events,
        }
    }
}
