use crate::error::SchedulerError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use reminder_scheduler_api_structs::get_reminder::*;
use reminder_scheduler_domain::{Reminder, ReminderExecution, ID};
use reminder_scheduler_infra::SchedulerContext;

fn handle_error(e: UseCaseError) -> SchedulerError {
    match e {
        UseCaseError::NotFound(reminder_id) => SchedulerError::NotFound(format!(
            "The reminder with id: {}, was not found.",
            reminder_id
        )),
        UseCaseError::StorageError => SchedulerError::InternalError,
    }
}

pub async fn get_reminder_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<SchedulerContext>,
) -> Result<HttpResponse, SchedulerError> {
    let caller = protect_route(&http_req)?;

    let usecase = GetReminderUseCase {
        reminder_id: path.reminder_id.clone(),
        organization_id: caller.organization_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|(reminder, executions)| {
            HttpResponse::Ok().json(APIResponse::new(reminder, executions, ctx.sys.now()))
        })
        .map_err(handle_error)
}

#[derive(Debug)]
struct GetReminderUseCase {
    pub reminder_id: ID,
    pub organization_id: ID,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(ID),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetReminderUseCase {
    type Response = (Reminder, Vec<ReminderExecution>);

    type Error = UseCaseError;

    const NAME: &'static str = "GetReminder";

    async fn execute(&mut self, ctx: &SchedulerContext) -> Result<Self::Response, Self::Error> {
        let reminder = ctx
            .repos
            .reminders
            .find(&self.reminder_id, &self.organization_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?
            .ok_or_else(|| UseCaseError::NotFound(self.reminder_id.clone()))?;
        let executions = ctx
            .repos
            .reminders
            .find_executions(&reminder.id)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok((reminder, executions))
    }
}
