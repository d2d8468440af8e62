use crate::{APIResponse, BaseClient};
use chrono::{DateTime, SecondsFormat, Utc};
use reminder_scheduler_api_structs::*;
use reminder_scheduler_domain::{ExecutionOutcome, ReminderType, ID};
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct ReminderClient {
    base: Arc<BaseClient>,
}

pub type CreateReminderInput = create_reminder::RequestBody;

pub struct UpdateReminderInput {
    pub reminder_id: ID,
    pub fields: update_reminder::RequestBody,
}

#[derive(Default)]
pub struct GetRemindersInput {
    pub reminder_type: Option<ReminderType>,
    pub status: Option<get_reminders::StatusFilter>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl GetRemindersInput {
    fn to_query_string(&self) -> String {
        let mut params = Vec::new();
        if let Some(reminder_type) = &self.reminder_type {
            params.push(format!("type={}", reminder_type.as_str()));
        }
        if let Some(status) = &self.status {
            let status = match status {
                get_reminders::StatusFilter::Active => "active",
                get_reminders::StatusFilter::Inactive => "inactive",
            };
            params.push(format!("status={}", status));
        }
        if let Some(limit) = self.limit {
            params.push(format!("limit={}", limit));
        }
        if let Some(offset) = self.offset {
            params.push(format!("offset={}", offset));
        }
        params.join("&")
    }
}

pub struct CreateExecutionInput {
    pub reminder_id: ID,
    pub outcome: ExecutionOutcome,
    pub message: Option<String>,
    /// The `next_run` read from the due list
    pub next_run: Option<DateTime<Utc>>,
}

fn as_of_query(as_of: Option<DateTime<Utc>>) -> String {
    match as_of {
        Some(as_of) => format!(
            "?as_of={}",
            as_of.to_rfc3339_opts(SecondsFormat::Millis, true)
        ),
        None => String::new(),
    }
}

impl ReminderClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn create(
        &self,
        input: CreateReminderInput,
    ) -> APIResponse<create_reminder::APIResponse> {
        self.base
            .post(input, "reminders".into(), StatusCode::CREATED)
            .await
    }

    pub async fn update(
        &self,
        input: UpdateReminderInput,
    ) -> APIResponse<update_reminder::APIResponse> {
        self.base
            .put(
                input.fields,
                format!("reminders/{}", input.reminder_id),
                StatusCode::OK,
            )
            .await
    }

    pub async fn delete(&self, reminder_id: ID) -> APIResponse<delete_reminder::APIResponse> {
        self.base
            .delete(format!("reminders/{}", reminder_id), StatusCode::OK)
            .await
    }

    pub async fn get(&self, reminder_id: ID) -> APIResponse<get_reminder::APIResponse> {
        self.base
            .get(format!("reminders/{}", reminder_id), StatusCode::OK)
            .await
    }

    pub async fn list(&self, input: GetRemindersInput) -> APIResponse<get_reminders::APIResponse> {
        self.base
            .get(
                format!("reminders?{}", input.to_query_string()),
                StatusCode::OK,
            )
            .await
    }

    pub async fn due(
        &self,
        as_of: Option<DateTime<Utc>>,
    ) -> APIResponse<get_due_reminders::APIResponse> {
        self.base
            .get(format!("reminders/due{}", as_of_query(as_of)), StatusCode::OK)
            .await
    }

    pub async fn overdue(
        &self,
        as_of: Option<DateTime<Utc>>,
    ) -> APIResponse<get_overdue_reminders::APIResponse> {
        self.base
            .get(
                format!("reminders/overdue{}", as_of_query(as_of)),
                StatusCode::OK,
            )
            .await
    }

    pub async fn stats(
        &self,
        as_of: Option<DateTime<Utc>>,
    ) -> APIResponse<get_reminder_stats::APIResponse> {
        self.base
            .get(
                format!("reminders/stats{}", as_of_query(as_of)),
                StatusCode::OK,
            )
            .await
    }

    pub async fn set_active(
        &self,
        reminder_id: ID,
        is_active: bool,
    ) -> APIResponse<set_reminder_active::APIResponse> {
        let body = set_reminder_active::RequestBody { is_active };
        self.base
            .put(
                body,
                format!("reminders/{}/active", reminder_id),
                StatusCode::OK,
            )
            .await
    }

    pub async fn create_execution(
        &self,
        input: CreateExecutionInput,
    ) -> APIResponse<create_reminder_execution::APIResponse> {
        let body = create_reminder_execution::RequestBody {
            outcome: input.outcome,
            message: input.message,
            next_run: input.next_run,
        };
        self.base
            .post(
                body,
                format!("reminders/{}/executions", input.reminder_id),
                StatusCode::CREATED,
            )
            .await
    }

    pub async fn get_executions(
        &self,
        reminder_id: ID,
    ) -> APIResponse<get_reminder_executions::APIResponse> {
        self.base
            .get(
                format!("reminders/{}/executions", reminder_id),
                StatusCode::OK,
            )
            .await
    }
}
