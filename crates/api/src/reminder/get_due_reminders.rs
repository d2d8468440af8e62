use crate::error::SchedulerError;
use crate::shared::{
    auth::protect_route,
    guard::Guard,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use reminder_scheduler_api_structs::get_due_reminders::*;
use reminder_scheduler_domain::{Reminder, ID};
use reminder_scheduler_infra::SchedulerContext;

fn handle_error(e: UseCaseError) -> SchedulerError {
    match e {
        UseCaseError::StorageError => SchedulerError::InternalError,
    }
}

pub async fn get_due_reminders_controller(
    http_req: HttpRequest,
    query: web::Query<QueryParams>,
    ctx: web::Data<SchedulerContext>,
) -> Result<HttpResponse, SchedulerError> {
    let caller = protect_route(&http_req)?;
    let now = ctx.sys.now();
    let as_of = Guard::against_malformed_as_of(query.as_of.as_deref(), now)?;

    let usecase = GetDueRemindersUseCase {
        organization_id: caller.organization_id,
        as_of,
        only_overdue: false,
    };

    execute(usecase, &ctx)
        .await
        .map(|reminders| HttpResponse::Ok().json(APIResponse::new(reminders, as_of, now)))
        .map_err(handle_error)
}

pub async fn get_overdue_reminders_controller(
    http_req: HttpRequest,
    query: web::Query<QueryParams>,
    ctx: web::Data<SchedulerContext>,
) -> Result<HttpResponse, SchedulerError> {
    let caller = protect_route(&http_req)?;
    let now = ctx.sys.now();
    let as_of = Guard::against_malformed_as_of(query.as_of.as_deref(), now)?;

    let usecase = GetDueRemindersUseCase {
        organization_id: caller.organization_id,
        as_of,
        only_overdue: true,
    };

    execute(usecase, &ctx)
        .await
        .map(|reminders| HttpResponse::Ok().json(APIResponse::new(reminders, as_of, now)))
        .map_err(handle_error)
}

/// Active `Reminder`s with `next_run <= as_of`, earliest first. With
/// `only_overdue` the `Reminder`s whose `next_run` equals `as_of` are left out.
#[derive(Debug)]
struct GetDueRemindersUseCase {
    pub organization_id: ID,
    pub as_of: DateTime<Utc>,
    pub only_overdue: bool,
}

#[derive(Debug)]
enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetDueRemindersUseCase {
    type Response = Vec<Reminder>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetDueReminders";

    async fn execute(&mut self, ctx: &SchedulerContext) -> Result<Self::Response, Self::Error> {
        let mut reminders = ctx
            .repos
            .reminders
            .find_due(&self.organization_id, self.as_of)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        if self.only_overdue {
            reminders.retain(|r| r.is_overdue(self.as_of));
        }

        Ok(reminders)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::reminder::test_helpers::{
        insert_reminder, setup_context_at, setup_unavailable_context, utc,
    };
    use actix_web::{http::StatusCode, ResponseError};
    use reminder_scheduler_domain::ReminderType;

    #[actix_web::main]
    #[test]
    async fn overdue_is_a_subset_of_due() {
        let ctx = setup_context_at(utc(2024, 3, 2, 0));
        let organization_id = ID::default();
        let missed = insert_reminder(
            &ctx,
            &organization_id,
            ReminderType::OneTime,
            utc(2024, 3, 1, 0),
            None,
        )
        .await;
        let due_now = insert_reminder(
            &ctx,
            &organization_id,
            ReminderType::Daily,
            utc(2024, 3, 2, 0),
            None,
        )
        .await;
        insert_reminder(
            &ctx,
            &organization_id,
            ReminderType::Daily,
            utc(2024, 3, 3, 0),
            None,
        )
        .await;

        let as_of = utc(2024, 3, 2, 0);
        let mut usecase = GetDueRemindersUseCase {
            organization_id: organization_id.clone(),
            as_of,
            only_overdue: false,
        };
        let due = usecase.execute(&ctx).await.unwrap();
        assert_eq!(
            due.iter().map(|r| r.id.clone()).collect::<Vec<_>>(),
            vec![missed.id.clone(), due_now.id.clone()]
        );

        let mut usecase = GetDueRemindersUseCase {
            organization_id,
            as_of,
            only_overdue: true,
        };
        let overdue = usecase.execute(&ctx).await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id, missed.id);
        assert!(overdue.iter().all(|o| due.iter().any(|d| d.id == o.id)));
    }

    #[actix_web::main]
    #[test]
    async fn unavailable_storage_is_an_internal_error() {
        let ctx = setup_unavailable_context(utc(2024, 3, 2, 0));
        let mut usecase = GetDueRemindersUseCase {
            organization_id: ID::default(),
            as_of: utc(2024, 3, 2, 0),
            only_overdue: false,
        };
        let res = usecase.execute(&ctx).await;
        assert!(matches!(res, Err(UseCaseError::StorageError)));
        assert_eq!(
            handle_error(UseCaseError::StorageError).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
