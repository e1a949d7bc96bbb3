use crate::config::Config;
use mongodb::{Client, Database};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub mongo_client: Client,
    pub db: Database,
}
