use crate::error::SchedulerError;
use chrono::{DateTime, Utc};
use reminder_scheduler_domain::parse_datetime;

pub struct Guard {}

impl Guard {
    /// Resolves an optional `as_of` query parameter, falling back to `now`
    pub fn against_malformed_as_of(
        as_of: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, SchedulerError> {
        match as_of {
            Some(as_of) => {
                parse_datetime(as_of).map_err(|e| SchedulerError::BadClientData(e.to_string()))
            }
            None => Ok(now),
        }
    }
}
