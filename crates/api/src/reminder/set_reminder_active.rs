use crate::error::SchedulerError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use reminder_scheduler_api_structs::set_reminder_active::*;
use reminder_scheduler_domain::{Reminder, ID};
use reminder_scheduler_infra::SchedulerContext;

fn handle_error(e: UseCaseError) -> SchedulerError {
    match e {
        UseCaseError::NotFound(reminder_id) => SchedulerError::NotFound(format!(
            "The reminder with id: {}, was not found.",
            reminder_id
        )),
        UseCaseError::Terminal(reminder_id) => SchedulerError::Conflict(format!(
            "The reminder with id: {} has completed and can not be reactivated.",
            reminder_id
        )),
        UseCaseError::Modified(reminder_id) => SchedulerError::Conflict(format!(
            "The reminder with id: {} was modified concurrently, fetch it and try again.",
            reminder_id
        )),
        UseCaseError::StorageError => SchedulerError::InternalError,
    }
}

pub async fn set_reminder_active_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<SchedulerContext>,
) -> Result<HttpResponse, SchedulerError> {
    let caller = protect_route(&http_req)?;

    let usecase = SetReminderActiveUseCase {
        reminder_id: path.reminder_id.clone(),
        organization_id: caller.organization_id,
        is_active: body.is_active,
    };

    execute(usecase, &ctx)
        .await
        .map(|reminder| HttpResponse::Ok().json(APIResponse::new(reminder, ctx.sys.now())))
        .map_err(handle_error)
}

/// Pauses or resumes a `Reminder`. The `next_run` is left untouched, so a
/// resumed `Reminder` that was due while paused is due immediately.
#[derive(Debug)]
struct SetReminderActiveUseCase {
    pub reminder_id: ID,
    pub organization_id: ID,
    pub is_active: bool,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(ID),
    Terminal(ID),
    Modified(ID),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for SetReminderActiveUseCase {
    type Response = Reminder;

    type Error = UseCaseError;

    const NAME: &'static str = "SetReminderActive";

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
        if reminder.is_active == self.is_active {
            return Ok(reminder);
        }

        let expected_version = reminder.version;
        reminder.set_active(self.is_active);
        reminder.touch(ctx.sys.now());

        let saved = ctx
            .repos
            .reminders
            .save(&reminder, expected_version)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        if !saved {
            return Err(UseCaseError::Modified(reminder.id));
        }

        Ok(reminder)
    }
}
