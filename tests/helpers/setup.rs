use reminder_scheduler_api::Application;
use reminder_scheduler_infra::{setup_context, Config};
use reminder_scheduler_sdk::{ReminderSDK, ID};

pub struct TestApp {
    pub config: Config,
    pub address: String,
}

impl TestApp {
    /// SDK acting as a new user in a new organization
    pub fn new_organization_sdk(&self) -> ReminderSDK {
        ReminderSDK::new(self.address.clone(), ID::default(), ID::default())
    }
}

// Launch the application as a background task
pub async fn spawn_app() -> (TestApp, ReminderSDK) {
    let mut ctx = setup_context().await;
    ctx.config.port = 0; // Random port

    let config = ctx.config.clone();
    let application = Application::new(ctx)
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    let app = TestApp { config, address };
    let sdk = app.new_organization_sdk();
    (app, sdk)
}
