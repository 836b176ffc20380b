use crate::error::{Error, Result};
use config::{Config, FileFormat};
use pgshape_driver::PoolSettings;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;
use tracing::level_filters::LevelFilter;

pub(crate) static DEFAULT_CONFIG: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/resources/pgshape.toml"));

/// A builder for creating a [Configuration] instance.
#[derive(Clone, Debug, Default)]
pub struct ConfigurationBuilder {
    configuration: Configuration,
}

impl ConfigurationBuilder {
    #[must_use]
    pub fn new<S: Into<String>>(program_name: S, version: S) -> Self {
        let mut configuration = Configuration::default();
        configuration.program_name = program_name.into();
        configuration.version = version.into();
        Self { configuration }
    }

    /// Initialize configuration from the built in defaults, overridden by environment
    /// variables prefixed with the upper case program name (e.g. `PGSHAPE_POOL__HOST`).
    ///
    /// # Errors
    /// * if a value cannot be read into its setting
    pub fn with_config(self) -> Result<Self> {
        self.load(None)
    }

    /// Initialize configuration from the built in defaults, overridden by the TOML
    /// `config_file` and then by environment variables.
    ///
    /// # Errors
    /// * if the file cannot be read or a value cannot be read into its setting
    pub fn with_config_file<P: AsRef<Path>>(self, config_file: P) -> Result<Self> {
        self.load(Some(config_file.as_ref()))
    }

    fn load(mut self, config_file: Option<&Path>) -> Result<Self> {
        let prefix = self.configuration.program_name.to_uppercase().replace('-', "_");
        debug!("Configuration environment prefix: {prefix}");

        let mut builder =
            Config::builder().add_source(config::File::from_str(DEFAULT_CONFIG, FileFormat::Toml));
        if let Some(config_file) = config_file {
            debug!("Configuration file: {}", config_file.display());
            builder = builder.add_source(config::File::from(config_file).format(FileFormat::Toml));
            self.configuration.config_file = Some(config_file.to_path_buf());
        }
        let config = builder
            .add_source(
                config::Environment::with_prefix(prefix.as_str())
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        self.configuration.pool = config.get::<PoolSettings>("pool")?;
        let log_level = config.get_string("log.level")?;
        self.configuration.log_level =
            LevelFilter::from_str(log_level.as_str()).map_err(|error| Error::Configuration {
                message: format!("Invalid log.level: {log_level}; {error}"),
            })?;
        Ok(self)
    }

    /// Set the log level to use.
    #[must_use]
    pub fn with_log_level(mut self, log_level: LevelFilter) -> Self {
        self.configuration.log_level = log_level;
        self
    }

    #[must_use]
    pub fn with_host<S: Into<String>>(mut self, host: S) -> Self {
        self.configuration.pool.host = host.into();
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.configuration.pool.port = port;
        self
    }

    #[must_use]
    pub fn with_database<S: Into<String>>(mut self, database: S) -> Self {
        self.configuration.pool.database = Some(database.into());
        self
    }

    #[must_use]
    pub fn with_user<S: Into<String>>(mut self, user: S) -> Self {
        self.configuration.pool.user = user.into();
        self
    }

    #[must_use]
    pub fn with_password<S: Into<String>>(mut self, password: S) -> Self {
        self.configuration.pool.password = password.into();
        self
    }

    #[must_use]
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.configuration.pool.max_connections = max_connections;
        self
    }

    #[must_use]
    pub fn with_connect_timeout_ms(mut self, connect_timeout_ms: u64) -> Self {
        self.configuration.pool.connect_timeout_ms = connect_timeout_ms;
        self
    }

    /// Build a [Configuration] instance.
    #[must_use]
    pub fn build(self) -> Configuration {
        self.configuration
    }
}

/// The configuration for the application.
#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    pub program_name: String,
    pub version: String,
    pub config_file: Option<PathBuf>,
    pub log_level: LevelFilter,
    pub pool: PoolSettings,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            program_name: String::new(),
            version: String::new(),
            config_file: None,
            log_level: LevelFilter::OFF,
            pool: PoolSettings::default(),
        }
    }
}
