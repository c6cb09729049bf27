pub mod auth_service;
pub mod calendar_service;
