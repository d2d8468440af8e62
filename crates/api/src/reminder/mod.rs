mod create_reminder;
mod create_reminder_execution;
mod delete_reminder;
mod get_due_reminders;
mod get_reminder;
mod get_reminder_executions;
mod get_reminder_stats;
mod get_reminders;
mod set_reminder_active;
#[cfg(test)]
mod test_helpers;
mod update_reminder;

use actix_web::web;
use create_reminder::create_reminder_controller;
use create_reminder_execution::create_reminder_execution_controller;
use delete_reminder::delete_reminder_controller;
use get_due_reminders::{get_due_reminders_controller, get_overdue_reminders_controller};
use get_reminder::get_reminder_controller;
use get_reminder_executions::get_reminder_executions_controller;
use get_reminder_stats::get_reminder_stats_controller;
use get_reminders::get_reminders_controller;
use set_reminder_active::set_reminder_active_controller;
use update_reminder::update_reminder_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/reminders", web::post().to(create_reminder_controller));
    cfg.route("/reminders", web::get().to(get_reminders_controller));

    // Registered before `/reminders/{reminder_id}` so they are not taken as ids
    cfg.route("/reminders/due", web::get().to(get_due_reminders_controller));
    cfg.route(
        "/reminders/overdue",
        web::get().to(get_overdue_reminders_controller),
    );
    cfg.route(
        "/reminders/stats",
        web::get().to(get_reminder_stats_controller),
    );

    cfg.route(
        "/reminders/{reminder_id}",
        web::get().to(get_reminder_controller),
    );
    cfg.route(
        "/reminders/{reminder_id}",
        web::put().to(update_reminder_controller),
    );
    cfg.route(
        "/reminders/{reminder_id}",
        web::delete().to(delete_reminder_controller),
    );
    cfg.route(
        "/reminders/{reminder_id}/active",
        web::put().to(set_reminder_active_controller),
    );
    cfg.route(
        "/reminders/{reminder_id}/executions",
        web::post().to(create_reminder_execution_controller),
    );
    cfg.route(
        "/reminders/{reminder_id}/executions",
        web::get().to(get_reminder_executions_controller),
    );
}
