use chrono::{DateTime, TimeZone, Utc};
use reminder_scheduler_domain::{
    NewReminder, Recurrence, RecurrencePattern, Reminder, ReminderExecution, ReminderType, Tz, ID,
};
use reminder_scheduler_infra::{
    IReminderRepo, ReminderFindQuery, ReminderPage, ReminderStats, SchedulerContext, StaticTimeSys,
};
use std::sync::Arc;

pub fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

/// Inmemory context with the clock frozen at `now`
pub fn setup_context_at(now: DateTime<Utc>) -> SchedulerContext {
    let mut ctx = SchedulerContext::create_inmemory();
    ctx.sys = Arc::new(StaticTimeSys(now.timestamp_millis()));
    ctx
}

/// Repository whose storage can not be reached
struct UnavailableReminderRepo;

fn unavailable<T>() -> anyhow::Result<T> {
    Err(anyhow::anyhow!("Connection refused"))
}

#[async_trait::async_trait]
impl IReminderRepo for UnavailableReminderRepo {
    async fn insert(&self, _: &Reminder) -> anyhow::Result<()> {
        unavailable()
    }

    async fn save(&self, _: &Reminder, _: i64) -> anyhow::Result<bool> {
        unavailable()
    }

    async fn find(&self, _: &ID, _: &ID) -> anyhow::Result<Option<Reminder>> {
        unavailable()
    }

    async fn find_by_query(&self, _: ReminderFindQuery) -> anyhow::Result<ReminderPage> {
        unavailable()
    }

    async fn find_due(&self, _: &ID, _: DateTime<Utc>) -> anyhow::Result<Vec<Reminder>> {
        unavailable()
    }

    async fn stats(&self, _: &ID, _: DateTime<Utc>) -> anyhow::Result<ReminderStats> {
        unavailable()
    }

    async fn delete(&self, _: &ID, _: &ID) -> anyhow::Result<Option<Reminder>> {
        unavailable()
    }

    async fn record_execution(
        &self,
        _: &Reminder,
        _: i64,
        _: &ReminderExecution,
    ) -> anyhow::Result<bool> {
        unavailable()
    }

    async fn find_executions(&self, _: &ID) -> anyhow::Result<Vec<ReminderExecution>> {
        unavailable()
    }
}

/// Like `setup_context_at` but every storage call fails
pub fn setup_unavailable_context(now: DateTime<Utc>) -> SchedulerContext {
    let mut ctx = setup_context_at(now);
    ctx.repos.reminders = Arc::new(UnavailableReminderRepo);
    ctx
}

pub async fn insert_reminder(
    ctx: &SchedulerContext,
    organization_id: &ID,
    reminder_type: ReminderType,
    scheduled_date: DateTime<Utc>,
    pattern: Option<RecurrencePattern>,
) -> Reminder {
    let reminder = Reminder::new(
        NewReminder {
            organization_id: organization_id.clone(),
            title: "Pay the rent".into(),
            description: None,
            recurrence: Recurrence::new(reminder_type, pattern.as_ref(), scheduled_date).unwrap(),
            timezone: Tz::UTC,
            scheduled_date,
            assigned_to: None,
            created_by: ID::default(),
        },
        ctx.sys.now(),
    );
    ctx.repos.reminders.insert(&reminder).await.unwrap();
    reminder
}
