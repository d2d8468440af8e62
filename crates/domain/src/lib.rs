mod date;
mod recurrence;
mod reminder;
mod shared;

pub use chrono_tz::Tz;
pub use date::{get_month_length, is_leap_year, parse_date, parse_datetime};
pub use recurrence::{NextRun, Recurrence, RecurrenceError, RecurrencePattern, ReminderType};
pub use reminder::{
    ExecutionOutcome, NewReminder, Reminder, ReminderExecution, ReminderState,
};
pub use shared::entity::{Entity, InvalidIDError, ID};
