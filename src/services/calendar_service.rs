use crate::database::CalendarStore;
use crate::models::{
    AuthenticatedUser, CreateReminderRequest, Event, Reminder, ReminderPatch, ReminderSummary, TimeWindow,
    WindowMode,
};
use crate::utils::AppError;
use mongodb::bson::oid::ObjectId;
use serde_json::{Map, Value};

/// Result of the window listing
#[derive(Debug)]
pub struct CalendarOverview {
    pub reminders: Vec<ReminderSummary>,
    pub starred_events: Vec<Event>,
    pub events: Vec<Event>,
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn parse_reminder_id(reminder_id: &str, message: &str) -> Result<ObjectId, AppError> {
    // An id that cannot exist is reported like any other missing reminder
    ObjectId::parse_str(reminder_id).map_err(|_| AppError::NotFoundOrForeign(message.to_string()))
}

pub async fn create_reminder(
    store: &dyn CalendarStore,
    user: &AuthenticatedUser,
    request: CreateReminderRequest,
) -> Result<Reminder, AppError> {
    let reminder = Reminder::new(request, user.id, now_millis());
    let created = store.insert_reminder(reminder).await?;

    log::info!(
        "📝 Reminder {} created for user {}",
        created.id.map(|id| id.to_hex()).unwrap_or_default(),
        user.id
    );

    Ok(created)
}

pub async fn list_reminders(store: &dyn CalendarStore, user: &AuthenticatedUser) -> Result<Vec<Reminder>, AppError> {
    store.list_reminders(&user.id).await
}

/// Applies an update restricted to the updatable fields.
///
/// The body is validated before any lookup: a disallowed key rejects the
/// whole request and nothing is written.
pub async fn update_reminder(
    store: &dyn CalendarStore,
    user: &AuthenticatedUser,
    reminder_id: &str,
    body: Map<String, Value>,
) -> Result<Reminder, AppError> {
    const NOT_FOUND: &str = "Reminder with given id does not exist";

    let patch = ReminderPatch::from_body(body)?;
    let id = parse_reminder_id(reminder_id, NOT_FOUND)?;

    let updated = if patch.is_empty() {
        store.find_reminder(&id, &user.id).await?
    } else {
        store.update_reminder(&id, &user.id, &patch, now_millis()).await?
    };

    let reminder = updated.ok_or_else(|| AppError::NotFoundOrForeign(NOT_FOUND.to_string()))?;
    log::info!("🔧 Reminder {} updated by user {}", id, user.id);

    Ok(reminder)
}

pub async fn delete_reminder(
    store: &dyn CalendarStore,
    user: &AuthenticatedUser,
    reminder_id: &str,
) -> Result<(), AppError> {
    const NOT_FOUND: &str = "Either id or the token is wrong";

    let id = parse_reminder_id(reminder_id, NOT_FOUND)?;

    if !store.delete_reminder(&id, &user.id).await? {
        return Err(AppError::NotFoundOrForeign(NOT_FOUND.to_string()));
    }

    log::info!("🗑️  Reminder {} deleted by user {}", id, user.id);
    Ok(())
}

/// Reminders of the caller, all events and the caller's starred events in `window`.
/// The three reads are independent and run concurrently.
pub async fn list_events_and_reminders(
    store: &dyn CalendarStore,
    user: &AuthenticatedUser,
    window: TimeWindow,
    mode: WindowMode,
) -> Result<CalendarOverview, AppError> {
    let (reminders, events, starred_events) = futures::try_join!(
        store.reminders_in_window(&user.id, window, mode),
        store.events_in_window(window),
        store.events_by_ids_in_window(&user.starred_events, window),
    )?;

    log::debug!(
        "📅 Window [{}, {}] for user {}: {} reminders, {} events, {} starred",
        window.start_time,
        window.end_time,
        user.id,
        reminders.len(),
        events.len(),
        starred_events.len()
    );

    Ok(CalendarOverview {
        reminders,
        starred_events,
        events,
    })
}
