use chrono::{DateTime, Duration, TimeZone, Utc};
use reminder_scheduler_domain::{Reminder, ReminderType, ID};

#[derive(Debug, Clone)]
pub struct ReminderFindQuery {
    pub organization_id: ID,
    pub reminder_type: Option<ReminderType>,
    pub is_active: Option<bool>,
    pub skip: usize,
    pub limit: usize,
}

impl ReminderFindQuery {
    pub fn matches(&self, reminder: &Reminder) -> bool {
        reminder.organization_id == self.organization_id
            && self
                .reminder_type
                .map(|reminder_type| reminder.reminder_type() == reminder_type)
                .unwrap_or(true)
            && self
                .is_active
                .map(|is_active| reminder.is_active == is_active)
                .unwrap_or(true)
    }
}

/// A page of `Reminder`s ordered by `next_run` ascending together with
/// the number of `Reminder`s matching the query
#[derive(Debug, Clone)]
pub struct ReminderPage {
    pub reminders: Vec<Reminder>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReminderStats {
    pub total: usize,
    pub active: usize,
    pub due_today: usize,
    pub overdue: usize,
}

/// Start (inclusive) and end (exclusive) of the UTC day holding `as_of`
pub fn utc_day_bounds(as_of: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = as_of
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| Utc.from_utc_datetime(&midnight))
        .unwrap_or(as_of);
    (start, start + Duration::days(1))
}
