use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    /// No user matches the identity carried by the request
    Unauthenticated(String),
    /// Reminder does not exist or belongs to someone else (never distinguished)
    NotFoundOrForeign(String),
    /// Update body touched a field outside the updatable set
    InvalidUpdate { allowed: &'static [&'static str] },
    InvalidRequest(String),
    DatabaseError(String),
    Config(String),
}

/// Error body sent to clients: `{statusCode, name, message}`
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub name: String,
    pub message: String,
}

impl AppError {
    pub fn name(&self) -> &'static str {
        match self {
            AppError::Unauthenticated(_) => "Unauthenticated",
            AppError::NotFoundOrForeign(_) => "Failure",
            AppError::InvalidUpdate { .. } => "InvalidUpdate",
            AppError::InvalidRequest(_) => "BadRequest",
            AppError::DatabaseError(_) => "DatabaseError",
            AppError::Config(_) => "ConfigError",
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::Unauthenticated(msg)
            | AppError::NotFoundOrForeign(msg)
            | AppError::InvalidRequest(msg)
            | AppError::DatabaseError(msg)
            | AppError::Config(msg) => msg.clone(),
            AppError::InvalidUpdate { allowed } => format!(
                "Update fields do not match. Following can only be updated: {}",
                allowed.join(", ")
            ),
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            status_code: self.status_code().as_u16(),
            name: self.name().to_string(),
            message: self.message(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            AppError::NotFoundOrForeign(msg) => write!(f, "Not found: {}", msg),
            AppError::InvalidUpdate { .. } => write!(f, "Invalid update: {}", self.message()),
            AppError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) | AppError::NotFoundOrForeign(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidUpdate { .. } | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("❌ {}", self);
        } else {
            log::warn!("⚠️  {}", self);
        }
        HttpResponse::build(status).json(self.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_keeps_legacy_status() {
        let err = AppError::NotFoundOrForeign("Either id or the token is wrong".into());
        let body = err.body();
        assert_eq!(body.status_code, 401);
        assert_eq!(body.name, "Failure");
        assert_eq!(body.message, "Either id or the token is wrong");
    }

    #[test]
    fn test_invalid_update_lists_allowed_fields() {
        let err = AppError::InvalidUpdate { allowed: &["title", "venue"] };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.message().ends_with("title, venue"));
    }

    #[test]
    fn test_error_body_is_camel_case() {
        let json = serde_json::to_value(AppError::Unauthenticated("Authentication Failed".into()).body()).unwrap();
        assert_eq!(json["statusCode"], 401);
        assert_eq!(json["name"], "Unauthenticated");
        assert_eq!(json["message"], "Authentication Failed");
    }
}
