use crate::error::SchedulerError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use reminder_scheduler_api_structs::get_reminders::*;
use reminder_scheduler_domain::{ReminderType, ID};
use reminder_scheduler_infra::{ReminderFindQuery, ReminderPage, SchedulerContext};

fn handle_error(e: UseCaseError) -> SchedulerError {
    match e {
        UseCaseError::StorageError => SchedulerError::InternalError,
    }
}

pub async fn get_reminders_controller(
    http_req: HttpRequest,
    query: web::Query<QueryParams>,
    ctx: web::Data<SchedulerContext>,
) -> Result<HttpResponse, SchedulerError> {
    let caller = protect_route(&http_req)?;

    let usecase = GetRemindersUseCase {
        organization_id: caller.organization_id,
        reminder_type: query.reminder_type,
        is_active: query.status.map(|status| status.is_active()),
        limit: ctx.config.page_limit(query.limit),
        offset: query.offset.unwrap_or(0),
    };
    let (limit, offset) = (usecase.limit, usecase.offset);

    execute(usecase, &ctx)
        .await
        .map(|page| {
            HttpResponse::Ok().json(APIResponse::new(
                page.reminders,
                page.total,
                limit,
                offset,
                ctx.sys.now(),
            ))
        })
        .map_err(handle_error)
}

#[derive(Debug)]
struct GetRemindersUseCase {
    pub organization_id: ID,
    pub reminder_type: Option<ReminderType>,
    pub is_active: Option<bool>,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug)]
enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetRemindersUseCase {
    type Response = ReminderPage;

    type Error = UseCaseError;

    const NAME: &'static str = "GetReminders";

    async fn execute(&mut self, ctx: &SchedulerContext) -> Result<Self::Response, Self::Error> {
        let query = ReminderFindQuery {
            organization_id: self.organization_id.clone(),
            reminder_type: self.reminder_type,
            is_active: self.is_active,
            skip: self.offset,
            limit: self.limit,
        };

        ctx.repos
            .reminders
            .find_by_query(query)
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}
