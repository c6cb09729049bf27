use actix_web::HttpResponse;
use serde::Serialize;

/// Success envelope shared by every calendar endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }

    pub fn ok(message: impl Into<String>, data: T) -> HttpResponse {
        HttpResponse::Ok().json(Self::new(message, data))
    }
}
