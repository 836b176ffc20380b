use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection pool settings handed to a driver when its pool is built
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default)]
pub struct PoolSettings {
    pub host: String,
    pub port: u16,
    pub database: Option<String>,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub idle_timeout_ms: u64,
    pub connect_timeout_ms: u64,
}

impl PoolSettings {
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Copy of the settings with every password character replaced by `*`
    #[must_use]
    pub fn masked(&self) -> Self {
        let password = "*".repeat(self.password.chars().count());
        Self {
            password,
            ..self.clone()
        }
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: None,
            user: "postgres".to_string(),
            password: String::new(),
            max_connections: 20,
            idle_timeout_ms: 30_000,
            connect_timeout_ms: 2_000,
        }
    }
}
