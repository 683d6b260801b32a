mod config;
mod repos;
mod services;
mod system;

pub use config::{Config, EmailSettings};
pub use repos::{IReminderRepo, IUserRepo, InMemoryReminderRepo, InMemoryUserRepo, Repos};
pub use services::*;
use std::sync::Arc;
pub use system::{ISys, ManualSys, RealSys};
use tracing::{info, warn};

#[derive(Clone)]
pub struct PillboxContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub notifications: Notifications,
}

struct ContextParams {
    pub postgres_connection_string: Option<String>,
}

impl PillboxContext {
    async fn create(params: ContextParams) -> Self {
        let config = Config::new();
        let repos = match params.postgres_connection_string {
            Some(connection_string) => Repos::create_postgres(&connection_string)
                .await
                .expect("Postgres credentials must be valid"),
            None => {
                warn!("DATABASE_URL is not set, reminders are kept in memory and will be lost on restart.");
                Repos::create_inmemory()
            }
        };
        let notifications = Notifications::from_config(&config);
        info!("Context created with config: {:?}", config);
        Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            notifications,
        }
    }

    /// Context backed by in memory repositories, used by tests
    pub fn create_inmemory() -> Self {
        let config = Config::new();
        Self {
            repos: Repos::create_inmemory(),
            notifications: Notifications::from_config(&config),
            config,
            sys: Arc::new(RealSys {}),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> PillboxContext {
    PillboxContext::create(ContextParams {
        postgres_connection_string: get_psql_connection_string(),
    })
    .await
}

fn get_psql_connection_string() -> Option<String> {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .ok()
        .filter(|s| !s.trim().is_empty())
}
