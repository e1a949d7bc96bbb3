use core_config::{FromEnv, env_required, server::ServerConfig};
use database::mongodb::MongoConfig;

pub use core_config::Environment;

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub mongodb: MongoConfig,
    /// Collection holding calendar events
    pub events_collection: String,
    pub server: ServerConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let events_collection = env_required("MONGODB_EVENTS_COLLECTION_NAME")?;
        let server = ServerConfig::from_env()?;

        Ok(Self {
            mongodb,
            events_collection,
            server,
            environment,
        })
    }
}
