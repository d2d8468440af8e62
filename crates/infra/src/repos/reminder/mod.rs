mod inmemory;
mod postgres;

use crate::repos::shared::query_structs::{ReminderFindQuery, ReminderPage, ReminderStats};
use chrono::{DateTime, Utc};
pub use inmemory::InMemoryReminderRepo;
pub use postgres::PostgresReminderRepo;
use reminder_scheduler_domain::{Reminder, ReminderExecution, ID};

#[async_trait::async_trait]
pub trait IReminderRepo: Send + Sync {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()>;
    /// Overwrites the stored `Reminder` only if it is still at
    /// `expected_version` and not terminal. Returns whether it was written.
    async fn save(&self, reminder: &Reminder, expected_version: i64) -> anyhow::Result<bool>;
    async fn find(&self, reminder_id: &ID, organization_id: &ID)
        -> anyhow::Result<Option<Reminder>>;
    async fn find_by_query(&self, query: ReminderFindQuery) -> anyhow::Result<ReminderPage>;
    /// Active `Reminder`s with `next_run <= as_of`, earliest first
    async fn find_due(&self, organization_id: &ID, as_of: DateTime<Utc>)
        -> anyhow::Result<Vec<Reminder>>;
    async fn stats(&self, organization_id: &ID, as_of: DateTime<Utc>)
        -> anyhow::Result<ReminderStats>;
    /// Deletes the `Reminder` together with its `ReminderExecution`s
    async fn delete(&self, reminder_id: &ID, organization_id: &ID)
        -> anyhow::Result<Option<Reminder>>;
    /// Atomically stores the schedule of the advanced `Reminder` and appends
    /// the `ReminderExecution`. Nothing is written unless the stored
    /// `Reminder` is active and still at `expected_version`. Returns whether
    /// it was written.
    async fn record_execution(
        &self,
        reminder: &Reminder,
        expected_version: i64,
        execution: &ReminderExecution,
    ) -> anyhow::Result<bool>;
    /// Newest first
    async fn find_executions(&self, reminder_id: &ID) -> anyhow::Result<Vec<ReminderExecution>>;
}

#[cfg(test)]
mod tests {
    use crate::{setup_context, ReminderFindQuery};
    use chrono::{DateTime, TimeZone, Utc};
    use chrono_tz::UTC;
    use reminder_scheduler_domain::{
        ExecutionOutcome, NewReminder, Recurrence, Reminder, ReminderType, ID,
    };

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn reminder_factory(
        organization_id: &ID,
        reminder_type: ReminderType,
        scheduled_date: DateTime<Utc>,
    ) -> Reminder {
        Reminder::new(
            NewReminder {
                organization_id: organization_id.clone(),
                title: "Renew insurance".into(),
                description: Some("Call the broker".into()),
                recurrence: Recurrence::new(reminder_type, None, scheduled_date).unwrap(),
                timezone: UTC,
                scheduled_date,
                assigned_to: None,
                created_by: Default::default(),
            },
            utc(2023, 12, 1, 0),
        )
    }

    #[tokio::test]
    async fn create_find_and_delete() {
        let ctx = setup_context().await;
        let organization_id = ID::default();
        let reminder = reminder_factory(&organization_id, ReminderType::Weekly, utc(2024, 1, 1, 9));

        // Insert
        assert!(ctx.repos.reminders.insert(&reminder).await.is_ok());

        // Find
        let res = ctx
            .repos
            .reminders
            .find(&reminder.id, &organization_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(res.id, reminder.id);
        assert_eq!(res.recurrence, reminder.recurrence);
        assert_eq!(res.next_run, reminder.next_run);
        assert_eq!(res.version, 0);

        // Other organizations can not see it
        assert!(ctx
            .repos
            .reminders
            .find(&reminder.id, &ID::default())
            .await
            .unwrap()
            .is_none());
        assert!(ctx
            .repos
            .reminders
            .delete(&reminder.id, &ID::default())
            .await
            .unwrap()
            .is_none());

        // Delete
        let res = ctx
            .repos
            .reminders
            .delete(&reminder.id, &organization_id)
            .await
            .unwrap();
        assert_eq!(res.unwrap().id, reminder.id);
        assert!(ctx
            .repos
            .reminders
            .find(&reminder.id, &organization_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn save_is_guarded_by_version() {
        let ctx = setup_context().await;
        let organization_id = ID::default();
        let reminder = reminder_factory(&organization_id, ReminderType::Daily, utc(2024, 1, 1, 9));
        ctx.repos.reminders.insert(&reminder).await.unwrap();

        let mut first = reminder.clone();
        first.title = "Renew car insurance".into();
        first.touch(utc(2023, 12, 2, 0));
        assert!(ctx.repos.reminders.save(&first, 0).await.unwrap());

        // Based on the version that was just replaced
        let mut second = reminder.clone();
        second.title = "Renew home insurance".into();
        second.touch(utc(2023, 12, 2, 0));
        assert!(!ctx.repos.reminders.save(&second, 0).await.unwrap());

        let res = ctx
            .repos
            .reminders
            .find(&reminder.id, &organization_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(res.title, "Renew car insurance");
        assert_eq!(res.version, 1);
    }

    #[tokio::test]
    async fn finds_due_reminders_in_order() {
        let ctx = setup_context().await;
        let organization_id = ID::default();
        let late = reminder_factory(&organization_id, ReminderType::Daily, utc(2024, 1, 3, 9));
        let early = reminder_factory(&organization_id, ReminderType::Weekly, utc(2024, 1, 1, 9));
        let future = reminder_factory(&organization_id, ReminderType::Daily, utc(2024, 2, 1, 9));
        let mut paused =
            reminder_factory(&organization_id, ReminderType::Daily, utc(2024, 1, 2, 9));
        paused.set_active(false);
        let other_org = reminder_factory(&ID::default(), ReminderType::Daily, utc(2024, 1, 1, 9));
        for reminder in &[&late, &early, &future, &paused, &other_org] {
            ctx.repos.reminders.insert(reminder).await.unwrap();
        }

        let due = ctx
            .repos
            .reminders
            .find_due(&organization_id, utc(2024, 1, 3, 9))
            .await
            .unwrap();
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].id, early.id);
        assert_eq!(due[1].id, late.id);

        let stats = ctx
            .repos
            .reminders
            .stats(&organization_id, utc(2024, 1, 3, 10))
            .await
            .unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.active, 3);
        assert_eq!(stats.due_today, 1);
        assert_eq!(stats.overdue, 2);
    }

    #[tokio::test]
    async fn finds_by_query() {
        let ctx = setup_context().await;
        let organization_id = ID::default();
        let mut reminders = Vec::new();
        for day in 1..=5 {
            let reminder_type = if day % 2 == 0 {
                ReminderType::Monthly
            } else {
                ReminderType::OneTime
            };
            let reminder = reminder_factory(&organization_id, reminder_type, utc(2024, 1, 6 - day, 9));
            ctx.repos.reminders.insert(&reminder).await.unwrap();
            reminders.push(reminder);
        }

        let query = ReminderFindQuery {
            organization_id: organization_id.clone(),
            reminder_type: None,
            is_active: None,
            skip: 1,
            limit: 2,
        };
        let page = ctx.repos.reminders.find_by_query(query).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.reminders.len(), 2);
        assert_eq!(page.reminders[0].next_run, utc(2024, 1, 2, 9));
        assert_eq!(page.reminders[1].next_run, utc(2024, 1, 3, 9));

        let query = ReminderFindQuery {
            organization_id: organization_id.clone(),
            reminder_type: Some(ReminderType::Monthly),
            is_active: Some(true),
            skip: 0,
            limit: 10,
        };
        let page = ctx.repos.reminders.find_by_query(query).await.unwrap();
        assert_eq!(page.total, 2);
        assert!(page
            .reminders
            .iter()
            .all(|r| r.reminder_type() == ReminderType::Monthly));
    }

    #[tokio::test]
    async fn records_execution_once() {
        let ctx = setup_context().await;
        let organization_id = ID::default();
        let reminder = reminder_factory(&organization_id, ReminderType::Weekly, utc(2024, 1, 1, 9));
        ctx.repos.reminders.insert(&reminder).await.unwrap();

        let mut first = reminder.clone();
        let first_execution = first.execute(ExecutionOutcome::Succeeded, None, utc(2024, 1, 1, 9));
        let mut second = reminder.clone();
        let second_execution = second.execute(ExecutionOutcome::Succeeded, None, utc(2024, 1, 1, 9));

        assert!(ctx
            .repos
            .reminders
            .record_execution(&first, reminder.version, &first_execution)
            .await
            .unwrap());
        assert!(!ctx
            .repos
            .reminders
            .record_execution(&second, reminder.version, &second_execution)
            .await
            .unwrap());

        let stored = ctx
            .repos
            .reminders
            .find(&reminder.id, &organization_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.next_run, utc(2024, 1, 8, 9));
        assert_eq!(stored.version, 1);
        let executions = ctx
            .repos
            .reminders
            .find_executions(&reminder.id)
            .await
            .unwrap();
        assert_eq!(executions.len(), 1);
        assert_eq!(executions[0].id, first_execution.id);

        // Executions are removed together with the reminder
        ctx.repos
            .reminders
            .delete(&reminder.id, &organization_id)
            .await
            .unwrap()
            .unwrap();
        assert!(ctx
            .repos
            .reminders
            .find_executions(&reminder.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn execution_based_on_an_outdated_copy_is_rejected() {
        let ctx = setup_context().await;
        let organization_id = ID::default();
        let reminder = reminder_factory(&organization_id, ReminderType::Daily, utc(2024, 1, 1, 9));
        ctx.repos.reminders.insert(&reminder).await.unwrap();

        // A dispatcher reads the reminder
        let mut outdated = ctx
            .repos
            .reminders
            .find(&reminder.id, &organization_id)
            .await
            .unwrap()
            .unwrap();

        // The schedule changes without moving next_run
        let mut edited = outdated.clone();
        edited.title = "Renew travel insurance".into();
        let recurrence =
            Recurrence::new(ReminderType::Monthly, None, edited.scheduled_date).unwrap();
        edited.reschedule(recurrence, edited.scheduled_date, UTC);
        edited.touch(utc(2023, 12, 2, 0));
        assert!(ctx.repos.reminders.save(&edited, 0).await.unwrap());
        assert_eq!(edited.next_run, outdated.next_run);

        // The dispatcher then records its execution
        let expected_version = outdated.version;
        let execution = outdated.execute(ExecutionOutcome::Succeeded, None, utc(2024, 1, 1, 9));
        assert!(!ctx
            .repos
            .reminders
            .record_execution(&outdated, expected_version, &execution)
            .await
            .unwrap());

        let stored = ctx
            .repos
            .reminders
            .find(&reminder.id, &organization_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.title, "Renew travel insurance");
        assert_eq!(stored.reminder_type(), ReminderType::Monthly);
        assert_eq!(stored.next_run, utc(2024, 1, 1, 9));
        assert!(ctx
            .repos
            .reminders
            .find_executions(&reminder.id)
            .await
            .unwrap()
            .is_empty());
    }
}
