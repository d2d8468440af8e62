mod base;
mod reminder;
mod status;

pub(crate) use base::BaseClient;
pub use base::{APIError, APIErrorVariant, APIResponse};
pub use reminder::{
    CreateExecutionInput, CreateReminderInput, GetRemindersInput, UpdateReminderInput,
};
use reminder::ReminderClient;
pub use reminder_scheduler_api_structs::dtos::*;
pub use reminder_scheduler_api_structs::get_reminders::StatusFilter;
pub use reminder_scheduler_api_structs::update_reminder::RequestBody as UpdateReminderFields;
pub use reminder_scheduler_domain::{
    ExecutionOutcome, RecurrencePattern, ReminderState, ReminderType, ID,
};
use status::StatusClient;
use std::sync::Arc;

// Domain
pub use reminder_scheduler_api_structs::dtos::ExecutionDTO as Execution;
pub use reminder_scheduler_api_structs::dtos::ReminderDTO as Reminder;

/// Reminder Scheduler Server SDK
///
/// The SDK contains methods for interacting with the Reminder Scheduler
/// server API on behalf of a user in an organization.
#[derive(Clone)]
pub struct ReminderSDK {
    pub reminder: ReminderClient,
    pub status: StatusClient,
}

impl ReminderSDK {
    pub fn new(address: String, organization_id: ID, user_id: ID) -> Self {
        let mut base = BaseClient::new(address);
        base.set_caller(organization_id, user_id);
        Self::from_base(base)
    }

    /// SDK that does not identify a caller, only able to reach public routes
    pub fn anonymous(address: String) -> Self {
        Self::from_base(BaseClient::new(address))
    }

    fn from_base(base: BaseClient) -> Self {
        let base = Arc::new(base);
        let reminder = ReminderClient::new(base.clone());
        let status = StatusClient::new(base);

        Self { reminder, status }
    }
}
