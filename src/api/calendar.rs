use crate::config::{AppConfig, JwtSettings};
use crate::database::CalendarStore;
use crate::middleware::AuthMiddleware;
use crate::models::{
    AuthenticatedUser, CreateReminderRequest, EventResponse, ReminderPatch, ReminderResponse,
    ReminderSummaryResponse, TimeWindow,
};
use crate::services::calendar_service::{self, CalendarOverview};
use crate::utils::{ApiResponse, AppError, ErrorBody};
use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CalendarOverviewResponse {
    pub reminders: Vec<ReminderSummaryResponse>,
    #[serde(rename = "staredEvents")]
    pub stared_events: Vec<EventResponse>,
    pub event: Vec<EventResponse>,
}

impl From<CalendarOverview> for CalendarOverviewResponse {
    fn from(overview: CalendarOverview) -> Self {
        CalendarOverviewResponse {
            reminders: overview.reminders.into_iter().map(Into::into).collect(),
            stared_events: overview.starred_events.into_iter().map(Into::into).collect(),
            event: overview.events.into_iter().map(Into::into).collect(),
        }
    }
}

/// Registers the calendar routes behind the auth middleware
pub fn configure(cfg: &mut web::ServiceConfig, jwt: JwtSettings) {
    cfg.service(
        web::scope("/api/v1/calendar")
            .app_data(json_config())
            .wrap(AuthMiddleware::new(jwt))
            .route("/reminders", web::post().to(create_reminder))
            .route("/reminders", web::get().to(list_reminders))
            .route("/reminders/{id}", web::patch().to(update_reminder))
            .route("/reminders/{id}", web::delete().to(delete_reminder))
            .route("/events", web::post().to(list_events_and_reminders)),
    );
}

/// Malformed JSON bodies get the same error shape as every other failure
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| AppError::InvalidRequest(err.to_string()).into())
}

/// POST /api/v1/calendar/reminders - Cria lembrete do usuário autenticado
#[utoipa::path(
    post,
    path = "/api/v1/calendar/reminders",
    tag = "Calendar",
    request_body = CreateReminderRequest,
    responses(
        (status = 200, description = "Reminder created", body = ReminderResponse),
        (status = 400, description = "Malformed body", body = ErrorBody),
        (status = 401, description = "Authentication failed", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_reminder(
    user: web::ReqData<AuthenticatedUser>,
    store: web::Data<dyn CalendarStore>,
    body: web::Json<CreateReminderRequest>,
) -> Result<HttpResponse, AppError> {
    let reminder = calendar_service::create_reminder(store.get_ref(), &user, body.into_inner()).await?;
    Ok(ApiResponse::ok("Reminder added successfully", ReminderResponse::from(reminder)))
}

/// GET /api/v1/calendar/reminders - Lista lembretes do usuário
#[utoipa::path(
    get,
    path = "/api/v1/calendar/reminders",
    tag = "Calendar",
    responses(
        (status = 200, description = "Reminders of the caller, oldest first", body = [ReminderResponse]),
        (status = 401, description = "Authentication failed", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_reminders(
    user: web::ReqData<AuthenticatedUser>,
    store: web::Data<dyn CalendarStore>,
) -> Result<HttpResponse, AppError> {
    let reminders: Vec<ReminderResponse> = calendar_service::list_reminders(store.get_ref(), &user)
        .await?
        .into_iter()
        .map(ReminderResponse::from)
        .collect();

    log::info!("📋 Listed {} reminders for user {}", reminders.len(), user.id);
    Ok(ApiResponse::ok("Successful", reminders))
}

/// PATCH /api/v1/calendar/reminders/{id} - Atualiza title, startTime, endTime ou venue
#[utoipa::path(
    patch,
    path = "/api/v1/calendar/reminders/{id}",
    tag = "Calendar",
    params(("id" = String, Path, description = "Reminder id")),
    request_body = ReminderPatch,
    responses(
        (status = 200, description = "Reminder updated", body = ReminderResponse),
        (status = 400, description = "Field outside title, startTime, endTime, venue", body = ErrorBody),
        (status = 401, description = "Authentication failed, or reminder missing or not owned", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_reminder(
    user: web::ReqData<AuthenticatedUser>,
    store: web::Data<dyn CalendarStore>,
    path: web::Path<String>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    let reminder =
        calendar_service::update_reminder(store.get_ref(), &user, &path.into_inner(), body.into_inner()).await?;
    Ok(ApiResponse::ok("Update successful", ReminderResponse::from(reminder)))
}

/// DELETE /api/v1/calendar/reminders/{id} - Remove lembrete (permanente)
#[utoipa::path(
    delete,
    path = "/api/v1/calendar/reminders/{id}",
    tag = "Calendar",
    params(("id" = String, Path, description = "Reminder id")),
    responses(
        (status = 200, description = "Reminder deleted"),
        (status = 401, description = "Authentication failed, or reminder missing or not owned", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_reminder(
    user: web::ReqData<AuthenticatedUser>,
    store: web::Data<dyn CalendarStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    calendar_service::delete_reminder(store.get_ref(), &user, &path.into_inner()).await?;
    Ok(ApiResponse::ok("Reminder deleted successfully", serde_json::json!({})))
}

/// POST /api/v1/calendar/events - Lembretes, eventos e eventos favoritos na janela
#[utoipa::path(
    post,
    path = "/api/v1/calendar/events",
    tag = "Calendar",
    request_body = TimeWindow,
    responses(
        (status = 200, description = "Reminders, events and starred events in the window", body = CalendarOverviewResponse),
        (status = 400, description = "Malformed body", body = ErrorBody),
        (status = 401, description = "Authentication failed", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_events_and_reminders(
    user: web::ReqData<AuthenticatedUser>,
    store: web::Data<dyn CalendarStore>,
    config: web::Data<AppConfig>,
    window: web::Json<TimeWindow>,
) -> Result<HttpResponse, AppError> {
    let overview =
        calendar_service::list_events_and_reminders(store.get_ref(), &user, window.into_inner(), config.window_mode)
            .await?;
    Ok(ApiResponse::ok("Successful", CalendarOverviewResponse::from(overview)))
}
