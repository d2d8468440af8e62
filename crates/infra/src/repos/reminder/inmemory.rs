use super::IReminderRepo;
use crate::repos::shared::{
    inmemory_repo::*,
    query_structs::{utc_day_bounds, ReminderFindQuery, ReminderPage, ReminderStats},
};
use chrono::{DateTime, Utc};
use reminder_scheduler_domain::{Reminder, ReminderExecution, ID};
use std::sync::Mutex;

/// Locks are always taken in the order `reminders` then `executions`
pub struct InMemoryReminderRepo {
    reminders: Mutex<Vec<Reminder>>,
    executions: Mutex<Vec<ReminderExecution>>,
}

impl InMemoryReminderRepo {
    pub fn new() -> Self {
        Self {
            reminders: Mutex::new(Vec::new()),
            executions: Mutex::new(Vec::new()),
        }
    }
}

fn sort_by_next_run(reminders: &mut [Reminder]) {
    reminders.sort_by(|a, b| {
        a.next_run
            .cmp(&b.next_run)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

#[async_trait::async_trait]
impl IReminderRepo for InMemoryReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        insert(reminder, &self.reminders);
        Ok(())
    }

    async fn save(&self, reminder: &Reminder, expected_version: i64) -> anyhow::Result<bool> {
        let saved = save_if(reminder, &self.reminders, |stored| {
            stored.version == expected_version && !stored.is_terminal()
        });
        Ok(saved)
    }

    async fn find(
        &self,
        reminder_id: &ID,
        organization_id: &ID,
    ) -> anyhow::Result<Option<Reminder>> {
        Ok(find_one_by(&self.reminders, |r| {
            r.id == *reminder_id && r.organization_id == *organization_id
        }))
    }

    async fn find_by_query(&self, query: ReminderFindQuery) -> anyhow::Result<ReminderPage> {
        let mut reminders = find_by(&self.reminders, |r| query.matches(r));
        sort_by_next_run(&mut reminders);
        let total = reminders.len();
        let reminders = reminders
            .into_iter()
            .skip(query.skip)
            .take(query.limit)
            .collect();

        Ok(ReminderPage { reminders, total })
    }

    async fn find_due(
        &self,
        organization_id: &ID,
        as_of: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Reminder>> {
        let mut reminders = find_by(&self.reminders, |r| {
            r.organization_id == *organization_id && r.is_due(as_of)
        });
        sort_by_next_run(&mut reminders);
        Ok(reminders)
    }

    async fn stats(
        &self,
        organization_id: &ID,
        as_of: DateTime<Utc>,
    ) -> anyhow::Result<ReminderStats> {
        let (day_start, day_end) = utc_day_bounds(as_of);
        let reminders = find_by(&self.reminders, |r| r.organization_id == *organization_id);

        let mut stats = ReminderStats {
            total: reminders.len(),
            ..Default::default()
        };
        for reminder in reminders.iter().filter(|r| r.is_active) {
            stats.active += 1;
            if reminder.next_run >= day_start && reminder.next_run < day_end {
                stats.due_today += 1;
            }
            if reminder.is_overdue(as_of) {
                stats.overdue += 1;
            }
        }
        Ok(stats)
    }

    async fn delete(
        &self,
        reminder_id: &ID,
        organization_id: &ID,
    ) -> anyhow::Result<Option<Reminder>> {
        let deleted = delete_one_by(&self.reminders, reminder_id, |r| {
            r.organization_id == *organization_id
        });
        if deleted.is_some() {
            find_and_delete_by(&self.executions, |e| e.reminder_id == *reminder_id);
        }
        Ok(deleted)
    }

    async fn record_execution(
        &self,
        reminder: &Reminder,
        expected_version: i64,
        execution: &ReminderExecution,
    ) -> anyhow::Result<bool> {
        let mut reminders = self.reminders.lock().unwrap();
        let stored = match reminders.iter_mut().find(|r| r.id == reminder.id) {
            Some(stored) if stored.is_active && stored.version == expected_version => stored,
            _ => return Ok(false),
        };
        stored.next_run = reminder.next_run;
        stored.is_active = reminder.is_active;
        stored.completed_at = reminder.completed_at;
        stored.updated_at = reminder.updated_at;
        stored.version = reminder.version;
        insert(execution, &self.executions);
        Ok(true)
    }

    async fn find_executions(&self, reminder_id: &ID) -> anyhow::Result<Vec<ReminderExecution>> {
        let mut executions = find_by(&self.executions, |e| e.reminder_id == *reminder_id);
        executions.sort_by(|a, b| {
            b.executed_at
                .cmp(&a.executed_at)
                .then_with(|| b.scheduled_for.cmp(&a.scheduled_for))
        });
        Ok(executions)
    }
}
