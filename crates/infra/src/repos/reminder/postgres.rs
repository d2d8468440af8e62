use super::IReminderRepo;
use crate::repos::shared::query_structs::{
    utc_day_bounds, ReminderFindQuery, ReminderPage, ReminderStats,
};
use chrono::{DateTime, Utc};
use reminder_scheduler_domain::{
    ExecutionOutcome, Recurrence, Reminder, ReminderExecution, Tz, ID,
};
use sqlx::{
    types::{Json, Uuid},
    FromRow, PgPool,
};
use tracing::error;

pub struct PostgresReminderRepo {
    pool: PgPool,
}

impl PostgresReminderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReminderRaw {
    reminder_uid: Uuid,
    organization_uid: Uuid,
    title: String,
    description: Option<String>,
    recurrence: Json<Recurrence>,
    timezone: String,
    scheduled_date: DateTime<Utc>,
    next_run: DateTime<Utc>,
    is_active: bool,
    completed_at: Option<DateTime<Utc>>,
    assigned_to: Option<Uuid>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i64,
}

impl TryFrom<ReminderRaw> for Reminder {
    type Error = anyhow::Error;

    fn try_from(e: ReminderRaw) -> anyhow::Result<Self> {
        let timezone = e
            .timezone
            .parse::<Tz>()
            .map_err(|err| anyhow::anyhow!("Stored timezone is invalid: {}", err))?;
        Ok(Self {
            id: e.reminder_uid.into(),
            organization_id: e.organization_uid.into(),
            title: e.title,
            description: e.description,
            recurrence: e.recurrence.0,
            timezone,
            scheduled_date: e.scheduled_date,
            next_run: e.next_run,
            is_active: e.is_active,
            completed_at: e.completed_at,
            assigned_to: e.assigned_to.map(|id| id.into()),
            created_by: e.created_by.into(),
            created_at: e.created_at,
            updated_at: e.updated_at,
            version: e.version,
        })
    }
}

fn into_reminders(raws: Vec<ReminderRaw>) -> anyhow::Result<Vec<Reminder>> {
    raws.into_iter()
        .map(|raw| {
            Reminder::try_from(raw).map_err(|e| {
                error!("Unable to read stored reminder: {:?}", e);
                e
            })
        })
        .collect()
}

#[derive(Debug, FromRow)]
struct ExecutionRaw {
    execution_uid: Uuid,
    reminder_uid: Uuid,
    scheduled_for: DateTime<Utc>,
    executed_at: DateTime<Utc>,
    outcome: String,
    message: Option<String>,
}

impl TryFrom<ExecutionRaw> for ReminderExecution {
    type Error = anyhow::Error;

    fn try_from(e: ExecutionRaw) -> anyhow::Result<Self> {
        let outcome = e
            .outcome
            .parse::<ExecutionOutcome>()
            .map_err(anyhow::Error::msg)?;
        Ok(Self {
            id: e.execution_uid.into(),
            reminder_id: e.reminder_uid.into(),
            scheduled_for: e.scheduled_for,
            executed_at: e.executed_at,
            outcome,
            message: e.message,
        })
    }
}

#[derive(Debug, FromRow)]
struct StatsRaw {
    total: i64,
    active: i64,
    due_today: i64,
    overdue: i64,
}

#[async_trait::async_trait]
impl IReminderRepo for PostgresReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reminders(
                reminder_uid, organization_uid, title, description, reminder_type,
                recurrence, timezone, scheduled_date, next_run, is_active,
                completed_at, assigned_to, created_by, created_at, updated_at, version
            )
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(reminder.id.inner_ref())
        .bind(reminder.organization_id.inner_ref())
        .bind(&reminder.title)
        .bind(&reminder.description)
        .bind(reminder.reminder_type().as_str())
        .bind(Json(&reminder.recurrence))
        .bind(reminder.timezone.name())
        .bind(reminder.scheduled_date)
        .bind(reminder.next_run)
        .bind(reminder.is_active)
        .bind(reminder.completed_at)
        .bind(reminder.assigned_to.as_ref().map(|id| *id.inner_ref()))
        .bind(reminder.created_by.inner_ref())
        .bind(reminder.created_at)
        .bind(reminder.updated_at)
        .bind(reminder.version)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to insert reminder: {:?}", e);
            e
        })?;

        Ok(())
    }

    async fn save(&self, reminder: &Reminder, expected_version: i64) -> anyhow::Result<bool> {
        let rows = sqlx::query(
            r#"
            UPDATE reminders
            SET title = $3,
            description = $4,
            reminder_type = $5,
            recurrence = $6,
            timezone = $7,
            scheduled_date = $8,
            next_run = $9,
            is_active = $10,
            completed_at = $11,
            assigned_to = $12,
            updated_at = $13,
            version = $14
            WHERE reminder_uid = $1 AND version = $2 AND completed_at IS NULL
            "#,
        )
        .bind(reminder.id.inner_ref())
        .bind(expected_version)
        .bind(&reminder.title)
        .bind(&reminder.description)
        .bind(reminder.reminder_type().as_str())
        .bind(Json(&reminder.recurrence))
        .bind(reminder.timezone.name())
        .bind(reminder.scheduled_date)
        .bind(reminder.next_run)
        .bind(reminder.is_active)
        .bind(reminder.completed_at)
        .bind(reminder.assigned_to.as_ref().map(|id| *id.inner_ref()))
        .bind(reminder.updated_at)
        .bind(reminder.version)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to update reminder: {:?}", e);
            e
        })?
        .rows_affected();

        Ok(rows == 1)
    }

    async fn find(
        &self,
        reminder_id: &ID,
        organization_id: &ID,
    ) -> anyhow::Result<Option<Reminder>> {
        let reminder: Option<ReminderRaw> = sqlx::query_as(
            r#"
            SELECT * FROM reminders
            WHERE reminder_uid = $1 AND organization_uid = $2
            "#,
        )
        .bind(reminder_id.inner_ref())
        .bind(organization_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to find reminder: {:?}", e);
            e
        })?;

        Ok(into_reminders(reminder.into_iter().collect())?.pop())
    }

    async fn find_by_query(&self, query: ReminderFindQuery) -> anyhow::Result<ReminderPage> {
        let reminder_type = query.reminder_type.map(|t| t.as_str());
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM reminders
            WHERE organization_uid = $1
            AND ($2::text IS NULL OR reminder_type = $2)
            AND ($3::boolean IS NULL OR is_active = $3)
            "#,
        )
        .bind(query.organization_id.inner_ref())
        .bind(reminder_type)
        .bind(query.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to count reminders: {:?}", e);
            e
        })?;

        let reminders: Vec<ReminderRaw> = sqlx::query_as(
            r#"
            SELECT * FROM reminders
            WHERE organization_uid = $1
            AND ($2::text IS NULL OR reminder_type = $2)
            AND ($3::boolean IS NULL OR is_active = $3)
            ORDER BY next_run ASC, created_at ASC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(query.organization_id.inner_ref())
        .bind(reminder_type)
        .bind(query.is_active)
        .bind(query.limit as i64)
        .bind(query.skip as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to find reminders: {:?}", e);
            e
        })?;

        Ok(ReminderPage {
            reminders: into_reminders(reminders)?,
            total: total as usize,
        })
    }

    async fn find_due(
        &self,
        organization_id: &ID,
        as_of: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Reminder>> {
        let reminders: Vec<ReminderRaw> = sqlx::query_as(
            r#"
            SELECT * FROM reminders
            WHERE organization_uid = $1 AND is_active AND next_run <= $2
            ORDER BY next_run ASC, created_at ASC
            "#,
        )
        .bind(organization_id.inner_ref())
        .bind(as_of)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to find due reminders: {:?}", e);
            e
        })?;

        into_reminders(reminders)
    }

    async fn stats(
        &self,
        organization_id: &ID,
        as_of: DateTime<Utc>,
    ) -> anyhow::Result<ReminderStats> {
        let (day_start, day_end) = utc_day_bounds(as_of);
        let stats: StatsRaw = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE is_active) AS active,
                COUNT(*) FILTER (WHERE is_active AND next_run >= $2 AND next_run < $3) AS due_today,
                COUNT(*) FILTER (WHERE is_active AND next_run < $4) AS overdue
            FROM reminders
            WHERE organization_uid = $1
            "#,
        )
        .bind(organization_id.inner_ref())
        .bind(day_start)
        .bind(day_end)
        .bind(as_of)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to count reminder stats: {:?}", e);
            e
        })?;

        Ok(ReminderStats {
            total: stats.total as usize,
            active: stats.active as usize,
            due_today: stats.due_today as usize,
            overdue: stats.overdue as usize,
        })
    }

    async fn delete(
        &self,
        reminder_id: &ID,
        organization_id: &ID,
    ) -> anyhow::Result<Option<Reminder>> {
        // Executions are removed by the ON DELETE CASCADE foreign key
        let reminder: Option<ReminderRaw> = sqlx::query_as(
            r#"
            DELETE FROM reminders
            WHERE reminder_uid = $1 AND organization_uid = $2
            RETURNING *
            "#,
        )
        .bind(reminder_id.inner_ref())
        .bind(organization_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to delete reminder: {:?}", e);
            e
        })?;

        Ok(into_reminders(reminder.into_iter().collect())?.pop())
    }

    async fn record_execution(
        &self,
        reminder: &Reminder,
        expected_version: i64,
        execution: &ReminderExecution,
    ) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query(
            r#"
            UPDATE reminders
            SET next_run = $3,
            is_active = $4,
            completed_at = $5,
            updated_at = $6,
            version = $7
            WHERE reminder_uid = $1 AND version = $2 AND is_active
            "#,
        )
        .bind(reminder.id.inner_ref())
        .bind(expected_version)
        .bind(reminder.next_run)
        .bind(reminder.is_active)
        .bind(reminder.completed_at)
        .bind(reminder.updated_at)
        .bind(reminder.version)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if rows != 1 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO reminder_executions(
                execution_uid, reminder_uid, scheduled_for, executed_at, outcome, message
            )
            VALUES($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(execution.id.inner_ref())
        .bind(execution.reminder_id.inner_ref())
        .bind(execution.scheduled_for)
        .bind(execution.executed_at)
        .bind(execution.outcome.as_str())
        .bind(&execution.message)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Unable to insert reminder execution: {:?}", e);
            e
        })?;

        tx.commit().await?;
        Ok(true)
    }

    async fn find_executions(&self, reminder_id: &ID) -> anyhow::Result<Vec<ReminderExecution>> {
        let executions: Vec<ExecutionRaw> = sqlx::query_as(
            r#"
            SELECT * FROM reminder_executions
            WHERE reminder_uid = $1
            ORDER BY executed_at DESC, scheduled_for DESC
            "#,
        )
        .bind(reminder_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to find reminder executions: {:?}", e);
            e
        })?;

        executions
            .into_iter()
            .map(|raw| {
                ReminderExecution::try_from(raw).map_err(|e| {
                    error!("Unable to read stored reminder execution: {:?}", e);
                    e
                })
            })
            .collect()
    }
}
