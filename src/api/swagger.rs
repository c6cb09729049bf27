use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Calendar Service API",
        version = "1.0.0",
        description = "Reminder and event calendar API.\n\n**Authentication:** calendar endpoints require a JWT Bearer token issued by the identity service.\n\n**Features:**\n- Reminder create, list, update and delete (owner only)\n- Reminders, events and starred events within a time window\n- Health monitoring"
    ),
    paths(
        // Health
        crate::api::health::health_check,

        // Calendar
        crate::api::calendar::create_reminder,
        crate::api::calendar::list_reminders,
        crate::api::calendar::update_reminder,
        crate::api::calendar::delete_reminder,
        crate::api::calendar::list_events_and_reminders,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::api::calendar::CalendarOverviewResponse,
            crate::models::CreateReminderRequest,
            crate::models::ReminderPatch,
            crate::models::ReminderResponse,
            crate::models::ReminderSummaryResponse,
            crate::models::EventResponse,
            crate::models::TimeWindow,
            crate::utils::ErrorBody,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint for monitoring service and storage status."),
        (name = "Calendar", description = "User reminders and shared events. Reminders are visible and mutable only by their creator."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build()
                ),
            );
        }
    }
}
