mod config;
mod repos;
mod system;

pub use config::Config;
pub use repos::{IReminderRepo, ReminderFindQuery, ReminderPage, ReminderStats, Repos};
use std::sync::Arc;
pub use system::{ISys, RealSys, StaticTimeSys};
use tracing::info;

#[derive(Clone)]
pub struct SchedulerContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl SchedulerContext {
    /// Context backed by inmemory repositories and the real clock
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
        }
    }

    async fn create(params: ContextParams) -> Self {
        let repos = Repos::create_postgres(&params.postgres_connection_string)
            .await
            .expect("Postgres credentials must be set and valid");
        Self {
            repos,
            config: Config::new(),
            sys: Arc::new(RealSys {}),
        }
    }
}

/// Will setup the infrastructure context given the environment.
/// Runs with inmemory repositories when started with the `inmemory`
/// argument or when no `DATABASE_URL` is set.
pub async fn setup_context() -> SchedulerContext {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    let inmemory_arg = std::env::args().any(|arg| arg == "inmemory");
    match std::env::var(PSQL_CONNECTION_STRING) {
        Ok(postgres_connection_string) if !inmemory_arg => {
            info!("{} env var was provided, using postgres", PSQL_CONNECTION_STRING);
            SchedulerContext::create(ContextParams {
                postgres_connection_string,
            })
            .await
        }
        _ => {
            info!("Using inmemory repositories");
            SchedulerContext::create_inmemory()
        }
    }
}
