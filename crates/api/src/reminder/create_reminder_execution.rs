use crate::error::SchedulerError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use reminder_scheduler_api_structs::create_reminder_execution::*;
use reminder_scheduler_domain::{ExecutionOutcome, Reminder, ReminderExecution, ID};
use reminder_scheduler_infra::SchedulerContext;

fn handle_error(e: UseCaseError) -> SchedulerError {
    match e {
        UseCaseError::NotFound(reminder_id) => SchedulerError::NotFound(format!(
            "The reminder with id: {}, was not found.",
            reminder_id
        )),
        UseCaseError::Terminal(reminder_id) => SchedulerError::Conflict(format!(
            "The reminder with id: {} has completed and will not run again.",
            reminder_id
        )),
        UseCaseError::Paused(reminder_id) => SchedulerError::Conflict(format!(
            "The reminder with id: {} is paused.",
            reminder_id
        )),
        UseCaseError::StaleNextRun { expected, actual } => SchedulerError::Conflict(format!(
            "The given next_run: {} does not match the current next_run: {}. Fetch the reminder and try again.",
            expected.to_rfc3339(),
            actual.to_rfc3339()
        )),
        UseCaseError::Modified(reminder_id) => SchedulerError::Conflict(format!(
            "The reminder with id: {} was modified while it was being executed. Fetch the reminder and try again.",
            reminder_id
        )),
        UseCaseError::StorageError => SchedulerError::InternalError,
    }
}

pub async fn create_reminder_execution_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<SchedulerContext>,
) -> Result<HttpResponse, SchedulerError> {
    let caller = protect_route(&http_req)?;

    let body = body.0;
    let usecase = CreateReminderExecutionUseCase {
        reminder_id: path.reminder_id.clone(),
        organization_id: caller.organization_id,
        outcome: body.outcome,
        message: body.message,
        expected_next_run: body.next_run,
    };

    execute(usecase, &ctx)
        .await
        .map(|(reminder, execution)| {
            HttpResponse::Created().json(APIResponse::new(reminder, execution, ctx.sys.now()))
        })
        .map_err(handle_error)
}

/// Records that the `Reminder` fired and advances it one step from the
/// consumed `next_run`. The advance and the execution are stored together
/// only if no one else changed the `Reminder` in the meantime.
#[derive(Debug)]
struct CreateReminderExecutionUseCase {
    pub reminder_id: ID,
    pub organization_id: ID,
    pub outcome: ExecutionOutcome,
    pub message: Option<String>,
    /// The `next_run` the caller read before executing
    pub expected_next_run: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(ID),
    Terminal(ID),
    Paused(ID),
    StaleNextRun {
        expected: DateTime<Utc>,
        actual: DateTime<Utc>,
    },
    Modified(ID),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateReminderExecutionUseCase {
    type Response = (Reminder, ReminderExecution);

    type Error = UseCaseError;

    const NAME: &'static str = "CreateReminderExecution";

    async fn execute(&mut self, ctx: &SchedulerContext) -> Result<Self::Response, Self::Error> {
        let mut reminder = ctx
            .repos
            .reminders
            .find(&self.reminder_id, &self.organization_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?
            .ok_or_else(|| UseCaseError::NotFound(self.reminder_id.clone()))?;
        if reminder.is_terminal() {
            return Err(UseCaseError::Terminal(reminder.id));
        }
        if !reminder.is_active {
            return Err(UseCaseError::Paused(reminder.id));
        }

        let current_version = reminder.version;
        let current_next_run = reminder.next_run;
        if let Some(expected) = self.expected_next_run {
            if expected != current_next_run {
                return Err(UseCaseError::StaleNextRun {
                    expected,
                    actual: current_next_run,
                });
            }
        }

        let execution = reminder.execute(self.outcome, self.message.clone(), ctx.sys.now());
        let recorded = ctx
            .repos
            .reminders
            .record_execution(&reminder, current_version, &execution)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        if !recorded {
            let stored = ctx
                .repos
                .reminders
                .find(&self.reminder_id, &self.organization_id)
                .await
                .map_err(|_| UseCaseError::StorageError)?;
            return Err(match stored {
                Some(stored) if stored.next_run != current_next_run => {
                    UseCaseError::StaleNextRun {
                        expected: current_next_run,
                        actual: stored.next_run,
                    }
                }
                _ => UseCaseError::Modified(reminder.id),
            });
        }

        Ok((reminder, execution))
    }
}
