use crate::error::SchedulerError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use reminder_scheduler_api_structs::delete_reminder::*;
use reminder_scheduler_domain::{Reminder, ID};
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

pub async fn delete_reminder_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<SchedulerContext>,
) -> Result<HttpResponse, SchedulerError> {
    let caller = protect_route(&http_req)?;

    let usecase = DeleteReminderUseCase {
        reminder_id: path.reminder_id.clone(),
        organization_id: caller.organization_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|reminder| HttpResponse::Ok().json(APIResponse::new(reminder, ctx.sys.now())))
        .map_err(handle_error)
}

#[derive(Debug)]
struct DeleteReminderUseCase {
    pub reminder_id: ID,
    pub organization_id: ID,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(ID),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteReminderUseCase {
    type Response = Reminder;

    type Error = UseCaseError;

    const NAME: &'static str = "DeleteReminder";

    /// Deleting a `Reminder` also deletes its `ReminderExecution`s
    async fn execute(&mut self, ctx: &SchedulerContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .reminders
            .delete(&self.reminder_id, &self.organization_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?
            .ok_or_else(|| UseCaseError::NotFound(self.reminder_id.clone()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::reminder::test_helpers::{insert_reminder, setup_context_at, utc};
    use reminder_scheduler_domain::ReminderType;

    #[actix_web::main]
    #[test]
    async fn deletes_only_within_organization() {
        let ctx = setup_context_at(utc(2024, 1, 1, 0));
        let organization_id = ID::default();
        let reminder = insert_reminder(
            &ctx,
            &organization_id,
            ReminderType::Yearly,
            utc(2024, 2, 29, 9),
            None,
        )
        .await;

        let mut usecase = DeleteReminderUseCase {
            reminder_id: reminder.id.clone(),
            organization_id: ID::default(),
        };
        assert!(usecase.execute(&ctx).await.is_err());

        let mut usecase = DeleteReminderUseCase {
            reminder_id: reminder.id.clone(),
            organization_id: organization_id.clone(),
        };
        assert!(usecase.execute(&ctx).await.is_ok());
        assert!(ctx
            .repos
            .reminders
            .find(&reminder.id, &organization_id)
            .await
            .unwrap()
            .is_none());

        // Deleting twice is a not found
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::NotFound(_))
        ));
    }
}
