use crate::{
    recurrence::{NextRun, Recurrence, ReminderType},
    shared::entity::{Entity, ID},
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// A `Reminder` is something an `Organization` wants to be notified about
/// once or repeatedly according to its `Recurrence`.
///
/// `next_run` is only ever written by `Reminder::new`, `Reminder::reschedule`
/// and `Reminder::execute` so that it never diverges from what the
/// `Recurrence` computes for the same inputs.
///
/// `version` is bumped on every change. Storage only accepts a write based
/// on the version it currently holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: ID,
    /// The tenant owning this `Reminder`, every query is scoped to it
    pub organization_id: ID,
    pub title: String,
    pub description: Option<String>,
    pub recurrence: Recurrence,
    /// Timezone used for the calendar arithmetic of the `Recurrence`
    pub timezone: Tz,
    /// Anchor of the `Recurrence`
    pub scheduled_date: DateTime<Utc>,
    /// The next (or only) time this `Reminder` should fire
    pub next_run: DateTime<Utc>,
    /// Inactive reminders are never due
    pub is_active: bool,
    /// Set when the `Reminder` will never fire again
    pub completed_at: Option<DateTime<Utc>>,
    pub assigned_to: Option<ID>,
    pub created_by: ID,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

impl Entity for Reminder {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderState {
    ActivePending,
    ActiveDue,
    Paused,
    Terminal,
}

pub struct NewReminder {
    pub organization_id: ID,
    pub title: String,
    pub description: Option<String>,
    pub recurrence: Recurrence,
    pub timezone: Tz,
    pub scheduled_date: DateTime<Utc>,
    pub assigned_to: Option<ID>,
    pub created_by: ID,
}

impl Reminder {
    pub fn new(params: NewReminder, now: DateTime<Utc>) -> Self {
        let next_run = params.recurrence.initial_run(params.scheduled_date);
        Self {
            id: Default::default(),
            organization_id: params.organization_id,
            title: params.title,
            description: params.description,
            recurrence: params.recurrence,
            timezone: params.timezone,
            scheduled_date: params.scheduled_date,
            next_run,
            is_active: true,
            completed_at: None,
            assigned_to: params.assigned_to,
            created_by: params.created_by,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub fn reminder_type(&self) -> ReminderType {
        self.recurrence.reminder_type()
    }

    pub fn is_terminal(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
        self.is_active && self.next_run <= as_of
    }

    pub fn is_overdue(&self, as_of: DateTime<Utc>) -> bool {
        self.is_active && self.next_run < as_of
    }

    pub fn state(&self, now: DateTime<Utc>) -> ReminderState {
        if self.is_terminal() {
            ReminderState::Terminal
        } else if !self.is_active {
            ReminderState::Paused
        } else if self.is_due(now) {
            ReminderState::ActiveDue
        } else {
            ReminderState::ActivePending
        }
    }

    /// Re-anchors the schedule. `next_run` is computed from the new
    /// scheduled date and never from the previous `next_run`.
    pub fn reschedule(&mut self, recurrence: Recurrence, scheduled_date: DateTime<Utc>, timezone: Tz) {
        self.next_run = recurrence.initial_run(scheduled_date);
        self.recurrence = recurrence;
        self.scheduled_date = scheduled_date;
        self.timezone = timezone;
    }

    /// Toggles the `Reminder` without touching `next_run`
    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    /// Marks the `Reminder` as changed at `now`
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.version += 1;
    }

    /// Consumes the current `next_run` slot and returns the `ReminderExecution`
    /// to record for it. Recurring reminders advance one step from the slot
    /// that was consumed, not from the wall clock, so missed slots are
    /// neither skipped nor fired as a backlog.
    pub fn execute(
        &mut self,
        outcome: ExecutionOutcome,
        message: Option<String>,
        now: DateTime<Utc>,
    ) -> ReminderExecution {
        let execution = ReminderExecution {
            id: Default::default(),
            reminder_id: self.id.clone(),
            scheduled_for: self.next_run,
            executed_at: now,
            outcome,
            message,
        };

        match self
            .recurrence
            .next_run(self.scheduled_date, self.next_run, &self.timezone)
        {
            NextRun::At(next_run) => self.next_run = next_run,
            NextRun::Exhausted => {
                self.is_active = false;
                self.completed_at = Some(now);
            }
        }
        self.touch(now);

        execution
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Succeeded,
    Failed,
    Skipped,
}

impl ExecutionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl Display for ExecutionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExecutionOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            "skipped" => Ok(Self::Skipped),
            _ => Err(format!("Unknown execution outcome: {}", s)),
        }
    }
}

/// Append only audit record of a `Reminder` firing
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderExecution {
    pub id: ID,
    pub reminder_id: ID,
    /// The `next_run` slot this execution consumed
    pub scheduled_for: DateTime<Utc>,
    pub executed_at: DateTime<Utc>,
    pub outcome: ExecutionOutcome,
    pub message: Option<String>,
}

impl Entity for ReminderExecution {
    fn id(&self) -> &ID {
        &self.id
    }
}
