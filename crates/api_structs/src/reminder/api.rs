use crate::dtos::{ExecutionDTO, ReminderDTO};
use chrono::{DateTime, Utc};
use reminder_scheduler_domain::{
    ExecutionOutcome, RecurrencePattern, Reminder, ReminderExecution, ReminderType, ID,
};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct ReminderResponse {
    pub reminder: ReminderDTO,
}

impl ReminderResponse {
    pub fn new(reminder: Reminder, now: DateTime<Utc>) -> Self {
        Self {
            reminder: ReminderDTO::new(reminder, now),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PathParams {
    pub reminder_id: ID,
}

/// Point in time used by the due, overdue and stats queries.
/// Defaults to the current time.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct AsOfQueryParams {
    pub as_of: Option<String>,
}

pub mod create_reminder {
    use super::*;

    #[derive(Debug, Deserialize, Serialize, Clone)]
    pub struct RequestBody {
        pub title: String,
        #[serde(default)]
        pub description: Option<String>,
        pub reminder_type: ReminderType,
        /// RFC 3339 timestamp or `YYYY-MM-DD`. Defaults to the current time.
        #[serde(default)]
        pub scheduled_date: Option<String>,
        #[serde(default)]
        pub recurrence_pattern: Option<RecurrencePattern>,
        /// IANA timezone name. Defaults to `UTC`.
        #[serde(default)]
        pub timezone: Option<String>,
        #[serde(default)]
        pub assigned_to: Option<ID>,
    }

    pub type APIResponse = ReminderResponse;
}

pub mod update_reminder {
    use super::*;

    pub type PathParams = super::PathParams;

    #[derive(Debug, Deserialize, Serialize, Clone, Default)]
    pub struct RequestBody {
        #[serde(default)]
        pub title: Option<String>,
        /// `null` clears the description, leaving it out keeps it
        #[serde(
            default,
            deserialize_with = "deserialize_nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub description: Option<Option<String>>,
        #[serde(default)]
        pub reminder_type: Option<ReminderType>,
        #[serde(default)]
        pub scheduled_date: Option<String>,
        #[serde(default)]
        pub recurrence_pattern: Option<RecurrencePattern>,
        #[serde(default)]
        pub timezone: Option<String>,
        /// `null` unassigns the reminder, leaving it out keeps the assignee
        #[serde(
            default,
            deserialize_with = "deserialize_nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub assigned_to: Option<Option<ID>>,
        #[serde(default)]
        pub is_active: Option<bool>,
    }

    /// Only called for fields present in the body, so an explicit `null`
    /// becomes `Some(None)`
    fn deserialize_nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }

    pub type APIResponse = ReminderResponse;

}

pub mod delete_reminder {
    use super::*;

    pub type PathParams = super::PathParams;

    pub type APIResponse = ReminderResponse;
}

pub mod get_reminder {
    use super::*;

    pub type PathParams = super::PathParams;

    #[derive(Debug, Deserialize, Serialize)]
    pub struct APIResponse {
        pub reminder: ReminderDTO,
        pub executions: Vec<ExecutionDTO>,
    }

    impl APIResponse {
        pub fn new(
            reminder: Reminder,
            executions: Vec<ReminderExecution>,
            now: DateTime<Utc>,
        ) -> Self {
            Self {
                reminder: ReminderDTO::new(reminder, now),
                executions: executions.into_iter().map(ExecutionDTO::new).collect(),
            }
        }
    }
}

pub mod get_reminders {
    use super::*;

    #[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum StatusFilter {
        Active,
        Inactive,
    }

    impl StatusFilter {
        pub fn is_active(&self) -> bool {
            *self == Self::Active
        }
    }

    #[derive(Debug, Deserialize, Serialize, Default)]
    pub struct QueryParams {
        #[serde(rename = "type", default)]
        pub reminder_type: Option<ReminderType>,
        #[serde(default)]
        pub status: Option<StatusFilter>,
        #[serde(default)]
        pub limit: Option<usize>,
        #[serde(default)]
        pub offset: Option<usize>,
    }

    #[derive(Debug, Deserialize, Serialize)]
    pub struct APIResponse {
        pub reminders: Vec<ReminderDTO>,
        pub total: usize,
        pub limit: usize,
        pub offset: usize,
    }

    impl APIResponse {
        pub fn new(
            reminders: Vec<Reminder>,
            total: usize,
            limit: usize,
            offset: usize,
            now: DateTime<Utc>,
        ) -> Self {
            Self {
                reminders: reminders
                    .into_iter()
                    .map(|r| ReminderDTO::new(r, now))
                    .collect(),
                total,
                limit,
                offset,
            }
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RemindersAsOfResponse {
    pub reminders: Vec<ReminderDTO>,
    pub as_of: DateTime<Utc>,
}

impl RemindersAsOfResponse {
    pub fn new(reminders: Vec<Reminder>, as_of: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            reminders: reminders
                .into_iter()
                .map(|r| ReminderDTO::new(r, now))
                .collect(),
            as_of,
        }
    }
}

pub mod get_due_reminders {
    use super::*;

    pub type QueryParams = AsOfQueryParams;

    pub type APIResponse = RemindersAsOfResponse;
}

pub mod get_overdue_reminders {
    use super::*;

    pub type QueryParams = AsOfQueryParams;

    pub type APIResponse = RemindersAsOfResponse;
}

pub mod get_reminder_stats {
    use super::*;

    pub type QueryParams = AsOfQueryParams;

    #[derive(Debug, Deserialize, Serialize)]
    pub struct APIResponse {
        pub total: usize,
        pub active: usize,
        pub due_today: usize,
        pub overdue: usize,
        pub as_of: DateTime<Utc>,
    }
}

pub mod set_reminder_active {
    use super::*;

    pub type PathParams = super::PathParams;

    #[derive(Debug, Deserialize, Serialize)]
    pub struct RequestBody {
        pub is_active: bool,
    }

    pub type APIResponse = ReminderResponse;
}

pub mod create_reminder_execution {
    use super::*;

    pub type PathParams = super::PathParams;

    #[derive(Debug, Deserialize, Serialize)]
    pub struct RequestBody {
        pub outcome: ExecutionOutcome,
        #[serde(default)]
        pub message: Option<String>,
        /// The `next_run` the caller read. The execution is rejected
        /// with a conflict when the stored value differs.
        #[serde(default)]
        pub next_run: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Deserialize, Serialize)]
    pub struct APIResponse {
        pub reminder: ReminderDTO,
        pub execution: ExecutionDTO,
    }

    impl APIResponse {
        pub fn new(reminder: Reminder, execution: ReminderExecution, now: DateTime<Utc>) -> Self {
            Self {
                reminder: ReminderDTO::new(reminder, now),
                execution: ExecutionDTO::new(execution),
            }
        }
    }
}

pub mod get_reminder_executions {
    use super::*;

    pub type PathParams = super::PathParams;

    #[derive(Debug, Deserialize, Serialize)]
    pub struct APIResponse {
        pub executions: Vec<ExecutionDTO>,
    }

    impl APIResponse {
        pub fn new(executions: Vec<ReminderExecution>) -> Self {
            Self {
                executions: executions.into_iter().map(ExecutionDTO::new).collect(),
            }
        }
    }
}
