use crate::error::SchedulerError;
use crate::shared::{
    auth::protect_route,
    guard::Guard,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use reminder_scheduler_api_structs::get_reminder_stats::*;
use reminder_scheduler_domain::ID;
use reminder_scheduler_infra::{ReminderStats, SchedulerContext};

fn handle_error(e: UseCaseError) -> SchedulerError {
    match e {
        UseCaseError::StorageError => SchedulerError::InternalError,
    }
}

pub async fn get_reminder_stats_controller(
    http_req: HttpRequest,
    query: web::Query<QueryParams>,
    ctx: web::Data<SchedulerContext>,
) -> Result<HttpResponse, SchedulerError> {
    let caller = protect_route(&http_req)?;
    let as_of = Guard::against_malformed_as_of(query.as_of.as_deref(), ctx.sys.now())?;

    let usecase = GetReminderStatsUseCase {
        organization_id: caller.organization_id,
        as_of,
    };

    execute(usecase, &ctx)
        .await
        .map(|stats| {
            HttpResponse::Ok().json(APIResponse {
                total: stats.total,
                active: stats.active,
                due_today: stats.due_today,
                overdue: stats.overdue,
                as_of,
            })
        })
        .map_err(handle_error)
}

#[derive(Debug)]
struct GetReminderStatsUseCase {
    pub organization_id: ID,
    pub as_of: DateTime<Utc>,
}

#[derive(Debug)]
enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetReminderStatsUseCase {
    type Response = ReminderStats;

    type Error = UseCaseError;

    const NAME: &'static str = "GetReminderStats";

    async fn execute(&mut self, ctx: &SchedulerContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .reminders
            .stats(&self.organization_id, self.as_of)
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}
