use crate::error::SchedulerError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use reminder_scheduler_api_structs::get_reminder_executions::*;
use reminder_scheduler_domain::{ReminderExecution, ID};
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

pub async fn get_reminder_executions_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<SchedulerContext>,
) -> Result<HttpResponse, SchedulerError> {
    let caller = protect_route(&http_req)?;

    let usecase = GetReminderExecutionsUseCase {
        reminder_id: path.reminder_id.clone(),
        organization_id: caller.organization_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|executions| HttpResponse::Ok().json(APIResponse::new(executions)))
        .map_err(handle_error)
}

#[derive(Debug)]
struct GetReminderExecutionsUseCase {
    pub reminder_id: ID,
    pub organization_id: ID,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(ID),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetReminderExecutionsUseCase {
    /// Newest first
    type Response = Vec<ReminderExecution>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetReminderExecutions";

    async fn execute(&mut self, ctx: &SchedulerContext) -> Result<Self::Response, Self::Error> {
        // Executions are only visible through a reminder of the caller's organization
        if ctx
            .repos
            .reminders
            .find(&self.reminder_id, &self.organization_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?
            .is_none()
        {
            return Err(UseCaseError::NotFound(self.reminder_id.clone()));
        }

        ctx.repos
            .reminders
            .find_executions(&self.reminder_id)
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}
