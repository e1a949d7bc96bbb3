#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_optional, env_parse_or_default, env_required};

/// MongoDB connection settings
///
/// Built from discrete host/port/credential parts rather than a connection
/// string, so the password never has to be URL-encoded or logged.
///
/// # Example
///
/// ```ignore
/// use database::mongodb::MongoConfig;
///
/// let config = MongoConfig::new("localhost", "calendar")
///     .with_port(27018)
///     .with_credentials("root", "example", Some("admin"));
///
/// // From environment variables (requires `config` feature)
/// let config = MongoConfig::from_env()?;
/// ```
#[derive(Clone)]
pub struct MongoConfig {
    /// Server hostname
    pub host: String,

    /// Server port
    pub port: u16,

    /// Username for authentication; no credential is sent when unset
    pub username: Option<String>,

    /// Password for authentication
    pub password: Option<String>,

    /// Database the credentials are defined in (e.g. "admin")
    pub auth_source: Option<String>,

    /// Database name to use
    pub database: String,

    /// Optional application name for server logs
    pub app_name: Option<String>,

    /// Maximum number of connections in the pool
    pub max_pool_size: u32,

    /// Minimum number of connections in the pool
    pub min_pool_size: u32,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Server selection timeout in seconds
    pub server_selection_timeout_secs: u64,
}

pub const DEFAULT_PORT: u16 = 27017;

impl MongoConfig {
    /// Create a config for `host` on the default port, without credentials
    pub fn new(host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: None,
            password: None,
            auth_source: None,
            database: database.into(),
            app_name: None,
            max_pool_size: 100,
            min_pool_size: 5,
            connect_timeout_secs: 10,
            server_selection_timeout_secs: 30,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        auth_source: Option<&str>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self.auth_source = auth_source.map(str::to_string);
        self
    }

    /// Set the application name for server logs
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// "host:port" of the server
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the database name
    pub fn database(&self) -> &str {
        &self.database
    }
}

impl std::fmt::Debug for MongoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("auth_source", &self.auth_source)
            .field("database", &self.database)
            .field("app_name", &self.app_name)
            .field("max_pool_size", &self.max_pool_size)
            .field("min_pool_size", &self.min_pool_size)
            .finish_non_exhaustive()
    }
}

/// Load MongoConfig from environment variables
///
/// Environment variables:
/// - `MONGODB_HOSTNAME` (required)
/// - `MONGODB_PORT` (optional, default: 27017)
/// - `MONGODB_ROOT_USERNAME` / `MONGODB_ROOT_PASSWORD` (optional)
/// - `MONGODB_AUTHSOURCE` (optional)
/// - `MONGODB_DATABASE` (required)
/// - `MONGODB_APP_NAME` (optional)
/// - `MONGODB_MAX_POOL_SIZE` (optional, default: 100)
/// - `MONGODB_MIN_POOL_SIZE` (optional, default: 5)
/// - `MONGODB_CONNECT_TIMEOUT_SECS` (optional, default: 10)
/// - `MONGODB_SERVER_SELECTION_TIMEOUT_SECS` (optional, default: 30)
#[cfg(feature = "config")]
impl FromEnv for MongoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_required("MONGODB_HOSTNAME")?,
            port: env_parse_or_default("MONGODB_PORT", DEFAULT_PORT)?,
            username: env_optional("MONGODB_ROOT_USERNAME"),
            password: env_optional("MONGODB_ROOT_PASSWORD"),
            auth_source: env_optional("MONGODB_AUTHSOURCE"),
            database: env_required("MONGODB_DATABASE")?,
            app_name: env_optional("MONGODB_APP_NAME"),
            max_pool_size: env_parse_or_default("MONGODB_MAX_POOL_SIZE", 100)?,
            min_pool_size: env_parse_or_default("MONGODB_MIN_POOL_SIZE", 5)?,
            connect_timeout_secs: env_parse_or_default("MONGODB_CONNECT_TIMEOUT_SECS", 10)?,
            server_selection_timeout_secs: env_parse_or_default(
                "MONGODB_SERVER_SELECTION_TIMEOUT_SECS",
                30,
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mongo_config_new() {
        let config = MongoConfig::new("localhost", "calendar");
        assert_eq!(config.address(), "localhost:27017");
        assert_eq!(config.database(), "calendar");
        assert!(config.username.is_none());
        assert_eq!(config.max_pool_size, 100);
    }

    #[test]
    fn test_mongo_config_with_credentials() {
        let config = MongoConfig::new("mongo", "calendar")
            .with_port(27018)
            .with_credentials("root", "secret", Some("admin"));
        assert_eq!(config.address(), "mongo:27018");
        assert_eq!(config.username.as_deref(), Some("root"));
        assert_eq!(config.auth_source.as_deref(), Some("admin"));
    }

    #[test]
    fn test_mongo_config_debug_hides_password() {
        let config =
            MongoConfig::new("mongo", "calendar").with_credentials("root", "secret", None);
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("***"));
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_mongo_config_from_env() {
        temp_env::with_vars(
            [
                ("MONGODB_HOSTNAME", Some("mongo")),
                ("MONGODB_PORT", Some("27019")),
                ("MONGODB_ROOT_USERNAME", Some("root")),
                ("MONGODB_ROOT_PASSWORD", Some("example")),
                ("MONGODB_AUTHSOURCE", Some("admin")),
                ("MONGODB_DATABASE", Some("calendar")),
            ],
            || {
                let config = MongoConfig::from_env().unwrap();
                assert_eq!(config.address(), "mongo:27019");
                assert_eq!(config.password.as_deref(), Some("example"));
                assert_eq!(config.database, "calendar");
            },
        );
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_mongo_config_from_env_missing_hostname() {
        temp_env::with_vars(
            [
                ("MONGODB_HOSTNAME", None::<&str>),
                ("MONGODB_DATABASE", Some("calendar")),
            ],
            || {
                let err = MongoConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("MONGODB_HOSTNAME"));
            },
        );
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_mongo_config_from_env_invalid_port() {
        temp_env::with_vars(
            [
                ("MONGODB_HOSTNAME", Some("mongo")),
                ("MONGODB_PORT", Some("not-a-port")),
                ("MONGODB_DATABASE", Some("calendar")),
            ],
            || {
                let err = MongoConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("MONGODB_PORT"));
            },
        );
    }
}
