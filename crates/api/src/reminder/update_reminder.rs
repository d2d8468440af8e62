use crate::error::SchedulerError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use reminder_scheduler_api_structs::update_reminder::*;
use reminder_scheduler_domain::{
    parse_datetime, Recurrence, RecurrenceError, RecurrencePattern, Reminder, ReminderType, Tz,
    ID,
};
use reminder_scheduler_infra::SchedulerContext;

fn handle_error(e: UseCaseError) -> SchedulerError {
    match e {
        UseCaseError::NotFound(reminder_id) => SchedulerError::NotFound(format!(
            "The reminder with id: {}, was not found.",
            reminder_id
        )),
        UseCaseError::Terminal(reminder_id) => SchedulerError::Conflict(format!(
            "The reminder with id: {} has completed and can not be changed.",
            reminder_id
        )),
        UseCaseError::Modified(reminder_id) => SchedulerError::Conflict(format!(
            "The reminder with id: {} was modified concurrently, fetch it and try again.",
            reminder_id
        )),
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

pub async fn update_reminder_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<SchedulerContext>,
) -> Result<HttpResponse, SchedulerError> {
    let caller = protect_route(&http_req)?;

    let body = body.0;
    let usecase = UpdateReminderUseCase {
        reminder_id: path.reminder_id.clone(),
        organization_id: caller.organization_id,
        title: body.title,
        description: body.description,
        reminder_type: body.reminder_type,
        scheduled_date: body.scheduled_date,
        recurrence_pattern: body.recurrence_pattern,
        timezone: body.timezone,
        assigned_to: body.assigned_to,
        is_active: body.is_active,
    };

    execute(usecase, &ctx)
        .await
        .map(|reminder| HttpResponse::Ok().json(APIResponse::new(reminder, ctx.sys.now())))
        .map_err(handle_error)
}

#[derive(Debug, Default)]
struct UpdateReminderUseCase {
    pub reminder_id: ID,
    pub organization_id: ID,
    pub title: Option<String>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
    pub reminder_type: Option<ReminderType>,
    pub scheduled_date: Option<String>,
    pub recurrence_pattern: Option<RecurrencePattern>,
    pub timezone: Option<String>,
    /// `Some(None)` unassigns the `Reminder`
    pub assigned_to: Option<Option<ID>>,
    pub is_active: Option<bool>,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(ID),
    Terminal(ID),
    Modified(ID),
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

impl UpdateReminderUseCase {
    fn touches_schedule(&self) -> bool {
        self.reminder_type.is_some()
            || self.scheduled_date.is_some()
            || self.recurrence_pattern.is_some()
            || self.timezone.is_some()
    }

    /// Re-anchors the schedule when the recurrence, scheduled date or
    /// timezone ends up different from the stored one
    fn reschedule(&self, reminder: &mut Reminder) -> Result<(), UseCaseError> {
        let timezone = match &self.timezone {
            Some(timezone) => timezone
                .parse::<Tz>()
                .map_err(|_| UseCaseError::InvalidTimezone(timezone.clone()))?,
            None => reminder.timezone,
        };
        let scheduled_date = match &self.scheduled_date {
            Some(scheduled_date) => parse_datetime(scheduled_date)?,
            None => reminder.scheduled_date,
        };
        let reminder_type = self.reminder_type.unwrap_or_else(|| reminder.reminder_type());
        let pattern = match &self.recurrence_pattern {
            Some(pattern) => Some(pattern.clone()),
            // The stored pattern only carries over when the type is kept
            None if reminder_type == reminder.reminder_type() => reminder.recurrence.pattern(),
            None => None,
        };
        let recurrence = Recurrence::new(reminder_type, pattern.as_ref(), scheduled_date)?;

        if recurrence != reminder.recurrence
            || scheduled_date != reminder.scheduled_date
            || timezone != reminder.timezone
        {
            reminder.reschedule(recurrence, scheduled_date, timezone);
        }
        Ok(())
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateReminderUseCase {
    type Response = Reminder;

    type Error = UseCaseError;

    const NAME: &'static str = "UpdateReminder";

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
        let expected_version = reminder.version;

        if let Some(title) = &self.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(UseCaseError::EmptyTitle);
            }
            reminder.title = title.to_string();
        }
        if let Some(description) = &self.description {
            reminder.description = description.clone();
        }
        if let Some(assigned_to) = &self.assigned_to {
            reminder.assigned_to = assigned_to.clone();
        }
        if self.touches_schedule() {
            self.reschedule(&mut reminder)?;
        }
        if let Some(is_active) = self.is_active {
            reminder.set_active(is_active);
        }
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
