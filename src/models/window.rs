use mongodb::bson::{doc, Document};
use serde::Deserialize;
use std::str::FromStr;

/// How reminders are matched against a listing window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowMode {
    /// `startTime <= windowEnd AND endTime >= windowStart`
    #[default]
    Overlap,
    /// `startTime >= windowStart OR endTime <= windowEnd`, kept for older clients.
    /// Matches reminders lying entirely outside the window.
    Legacy,
}

impl FromStr for WindowMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overlap" => Ok(WindowMode::Overlap),
            "legacy" => Ok(WindowMode::Legacy),
            other => Err(format!(
                "Unknown REMINDER_WINDOW_MODE: {}. Supported: overlap, legacy",
                other
            )),
        }
    }
}

/// Inclusive time window, epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start_time: i64,
    pub end_time: i64,
}

impl TimeWindow {
    #[cfg(test)]
    pub fn new(start_time: i64, end_time: i64) -> Self {
        Self { start_time, end_time }
    }

    pub fn contains(&self, instant: i64) -> bool {
        instant >= self.start_time && instant <= self.end_time
    }

    pub fn matches_reminder(&self, mode: WindowMode, start_time: i64, end_time: i64) -> bool {
        match mode {
            WindowMode::Overlap => start_time <= self.end_time && end_time >= self.start_time,
            WindowMode::Legacy => start_time >= self.start_time || end_time <= self.end_time,
        }
    }

    /// An event matches when it starts or ends inside the window
    pub fn matches_event(&self, start_date: i64, end_date: i64) -> bool {
        self.contains(start_date) || self.contains(end_date)
    }

    /// MongoDB filter equivalent to [`TimeWindow::matches_reminder`]
    pub fn reminder_filter(&self, mode: WindowMode) -> Document {
        match mode {
            WindowMode::Overlap => doc! {
                "startTime": { "$lte": self.end_time },
                "endTime": { "$gte": self.start_time },
            },
            WindowMode::Legacy => doc! {
                "$or": [
                    { "startTime": { "$gte": self.start_time } },
                    { "endTime": { "$lte": self.end_time } },
                ]
            },
        }
    }

    /// MongoDB filter equivalent to [`TimeWindow::matches_event`]
    pub fn event_filter(&self) -> Document {
        doc! {
            "$or": [
                { "startDate": { "$gte": self.start_time, "$lte": self.end_time } },
                { "endDate": { "$gte": self.start_time, "$lte": self.end_time } },
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_excludes_reminder_outside_window() {
        let window = TimeWindow::new(10, 20);
        assert!(!window.matches_reminder(WindowMode::Overlap, 25, 26));
        assert!(!window.matches_reminder(WindowMode::Overlap, 1, 9));
        assert!(window.matches_reminder(WindowMode::Overlap, 5, 10));
        assert!(window.matches_reminder(WindowMode::Overlap, 20, 30));
        assert!(window.matches_reminder(WindowMode::Overlap, 0, 100));
    }

    #[test]
    fn test_legacy_includes_reminder_after_window() {
        // The legacy union matches anything starting after windowStart,
        // even when it lies entirely past windowEnd.
        let window = TimeWindow::new(10, 20);
        assert!(window.matches_reminder(WindowMode::Legacy, 25, 26));
        assert!(window.matches_reminder(WindowMode::Legacy, 1, 9));
        assert!(!window.matches_reminder(WindowMode::Legacy, 5, 25));
    }

    #[test]
    fn test_event_needs_an_endpoint_inside_window() {
        let window = TimeWindow::new(10, 20);
        assert!(window.matches_event(10, 40));
        assert!(window.matches_event(0, 20));
        assert!(!window.matches_event(0, 30));
        assert!(!window.matches_event(21, 22));
    }

    #[test]
    fn test_filters_mirror_predicates() {
        let window = TimeWindow::new(10, 20);
        assert_eq!(
            window.reminder_filter(WindowMode::Overlap),
            doc! { "startTime": { "$lte": 20_i64 }, "endTime": { "$gte": 10_i64 } }
        );
        let legacy = window.reminder_filter(WindowMode::Legacy);
        assert_eq!(legacy.get_array("$or").unwrap().len(), 2);
        let events = window.event_filter();
        assert_eq!(events.get_array("$or").unwrap().len(), 2);
    }

    #[test]
    fn test_window_mode_parsing() {
        assert_eq!("Legacy".parse::<WindowMode>(), Ok(WindowMode::Legacy));
        assert_eq!(" overlap ".parse::<WindowMode>(), Ok(WindowMode::Overlap));
        assert!("strict".parse::<WindowMode>().is_err());
    }
}
