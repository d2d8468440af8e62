use crate::error::SchedulerError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use reminder_scheduler_api_structs::create_reminder::*;
use reminder_scheduler_domain::{
    parse_datetime, NewReminder, Recurrence, RecurrenceError, RecurrencePattern, Reminder,
    ReminderType, Tz, ID,
};
use reminder_scheduler_infra::SchedulerContext;

fn handle_error(e: UseCaseError) -> SchedulerError {
    match e {
        UseCaseError::EmptyTitle => {
            SchedulerError::BadClientData("The reminder title can not be empty".into())
        }
        UseCaseError::InvalidTimezone(timezone) => {
            SchedulerError::BadClientData(format!("Invalid timezone given: {}", timezone))
        }
        UseCaseError::InvalidRecurrence(e) => SchedulerError::BadClientData(e.to_string()),
        UseCaseError::StorageError => SchedulerError::InternalError,
    }
}

pub async fn create_reminder_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<SchedulerContext>,
) -> Result<HttpResponse, SchedulerError> {
    let caller = protect_route(&http_req)?;

    let body = body.0;
    let usecase = CreateReminderUseCase {
        organization_id: caller.organization_id,
        created_by: caller.user_id,
        title: body.title,
        description: body.description,
        reminder_type: body.reminder_type,
        scheduled_date: body.scheduled_date,
        recurrence_pattern: body.recurrence_pattern,
        timezone: body.timezone,
        assigned_to: body.assigned_to,
    };

    execute(usecase, &ctx)
        .await
        .map(|reminder| HttpResponse::Created().json(APIResponse::new(reminder, ctx.sys.now())))
        .map_err(handle_error)
}

#[derive(Debug)]
struct CreateReminderUseCase {
    pub organization_id: ID,
    pub created_by: ID,
    pub title: String,
    pub description: Option<String>,
    pub reminder_type: ReminderType,
    pub scheduled_date: Option<String>,
    pub recurrence_pattern: Option<RecurrencePattern>,
    pub timezone: Option<String>,
    pub assigned_to: Option<ID>,
}

#[derive(Debug)]
enum UseCaseError {
    EmptyTitle,
    InvalidTimezone(String),
    InvalidRecurrence(RecurrenceError),
    StorageError,
}

impl From<RecurrenceError> for UseCaseError {
    fn from(e: RecurrenceError) -> Self {
        Self::InvalidRecurrence(e)
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateReminderUseCase {
    type Response = Reminder;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateReminder";

    async fn execute(&mut self, ctx: &SchedulerContext) -> Result<Self::Response, Self::Error> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(UseCaseError::EmptyTitle);
        }

        let timezone = match &self.timezone {
            Some(timezone) => timezone
                .parse::<Tz>()
                .map_err(|_| UseCaseError::InvalidTimezone(timezone.clone()))?,
            None => Tz::UTC,
        };

        let now = ctx.sys.now();
        let scheduled_date = match &self.scheduled_date {
            Some(scheduled_date) => parse_datetime(scheduled_date)?,
            None => now,
        };
        let recurrence = Recurrence::new(
            self.reminder_type,
            self.recurrence_pattern.as_ref(),
            scheduled_date,
        )?;

        let reminder = Reminder::new(
            NewReminder {
                organization_id: self.organization_id.clone(),
                title: title.to_string(),
                description: self.description.clone(),
                recurrence,
                timezone,
                scheduled_date,
                assigned_to: self.assigned_to.clone(),
                created_by: self.created_by.clone(),
            },
            now,
        );

        ctx.repos
            .reminders
            .insert(&reminder)
            .await
            .map(|_| reminder)
            .map_err(|_| UseCaseError::StorageError)
    }
}
