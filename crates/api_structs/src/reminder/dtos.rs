use chrono::{DateTime, Utc};
use reminder_scheduler_domain::{
    ExecutionOutcome, RecurrencePattern, Reminder, ReminderExecution, ReminderState, ReminderType,
    ID,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReminderDTO {
    pub id: ID,
    pub organization_id: ID,
    pub title: String,
    pub description: Option<String>,
    pub reminder_type: ReminderType,
    pub recurrence_pattern: Option<RecurrencePattern>,
    pub timezone: String,
    pub scheduled_date: DateTime<Utc>,
    pub next_run: DateTime<Utc>,
    pub is_active: bool,
    pub state: ReminderState,
    pub completed_at: Option<DateTime<Utc>>,
    pub assigned_to: Option<ID>,
    pub created_by: ID,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReminderDTO {
    /// `now` decides whether an active `Reminder` is reported as due
    pub fn new(reminder: Reminder, now: DateTime<Utc>) -> Self {
        Self {
            state: reminder.state(now),
            reminder_type: reminder.reminder_type(),
            recurrence_pattern: reminder.recurrence.pattern(),
            timezone: reminder.timezone.name().to_string(),
            id: reminder.id,
            organization_id: reminder.organization_id,
            title: reminder.title,
            description: reminder.description,
            scheduled_date: reminder.scheduled_date,
            next_run: reminder.next_run,
            is_active: reminder.is_active,
            completed_at: reminder.completed_at,
            assigned_to: reminder.assigned_to,
            created_by: reminder.created_by,
            created_at: reminder.created_at,
            updated_at: reminder.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExecutionDTO {
    pub id: ID,
    pub reminder_id: ID,
    pub scheduled_for: DateTime<Utc>,
    pub executed_at: DateTime<Utc>,
    pub outcome: ExecutionOutcome,
    pub message: Option<String>,
}

impl ExecutionDTO {
    pub fn new(execution: ReminderExecution) -> Self {
        Self {
            id: execution.id,
            reminder_id: execution.reminder_id,
            scheduled_for: execution.scheduled_for,
            executed_at: execution.executed_at,
            outcome: execution.outcome,
            message: execution.message,
        }
    }
}
