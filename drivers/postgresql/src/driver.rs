use crate::results::{convert_row, describe_columns};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use pgshape_driver::Error::{ConnectionError, QueryError};
use pgshape_driver::{PoolSettings, Result, StatementResult};
use sqlx::Connection as _;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Either, Executor as _, PgPool, Postgres, Row as _};
use tracing::{debug, instrument};

/// `PostgreSQL` connection pool backed by [`sqlx::PgPool`]
#[derive(Debug)]
pub struct Pool {
    settings: PoolSettings,
    pool: PgPool,
}

impl Pool {
    /// Builds the pool from settings. Connections are opened lazily on
    /// [`acquire`](pgshape_driver::Pool::acquire), so this never touches the network;
    /// it must be called from within a Tokio runtime.
    #[must_use]
    pub fn new(settings: PoolSettings) -> Self {
        let mut options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&settings.user)
            .password(&settings.password);
        if let Some(database) = &settings.database {
            options = options.database(database);
        }

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .idle_timeout(settings.idle_timeout())
            .acquire_timeout(settings.connect_timeout())
            .connect_lazy_with(options);

        Self { settings, pool }
    }

    /// Shuts the pool down, closing idle connections and waiting for checked out ones.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl pgshape_driver::Pool for Pool {
    fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    #[instrument(name = "acquire", level = "debug", skip(self))]
    async fn acquire(&self) -> Result<Box<dyn pgshape_driver::Connection>> {
        let connection = self
            .pool
            .acquire()
            .await
            .map_err(|error| ConnectionError(error_text(&error)))?;
        debug!(
            size = self.pool.size(),
            idle = self.pool.num_idle(),
            "acquired pooled connection"
        );
        Ok(Box::new(Connection::new(connection)))
    }
}

/// A connection checked out of a [`Pool`]
#[derive(Debug)]
pub struct Connection {
    connection: Option<PoolConnection<Postgres>>,
}

impl Connection {
    pub(crate) fn new(connection: PoolConnection<Postgres>) -> Self {
        Self {
            connection: Some(connection),
        }
    }
}

#[async_trait]
impl pgshape_driver::Connection for Connection {
    #[instrument(name = "execute", level = "debug", skip(self))]
    async fn execute(&mut self, statement: &str) -> Result<StatementResult> {
        let Some(connection) = self.connection.as_mut() else {
            return Err(ConnectionError("connection already released".to_string()));
        };

        let mut columns = Vec::new();
        let mut rows = Vec::new();
        let mut row_count = 0;
        let mut results = 0;
        {
            let mut stream = sqlx::raw_sql(statement).fetch_many(&mut **connection);
            while let Some(item) = stream
                .try_next()
                .await
                .map_err(|error| QueryError(error_text(&error)))?
            {
                match item {
                    Either::Left(done) => {
                        results += 1;
                        row_count += done.rows_affected();
                    }
                    Either::Right(row) => {
                        if columns.is_empty() {
                            columns = describe_columns(row.columns());
                        }
                        rows.push(convert_row(&row)?);
                    }
                }
            }
        }

        // Row descriptions are not surfaced when no rows come back. Multi-command text
        // cannot be described, and a failed describe would abort an open transaction.
        if rows.is_empty() && results == 1 {
            match (&mut **connection).describe(statement).await {
                Ok(describe) => columns = describe_columns(describe.columns()),
                Err(error) => debug!("statement not described: {error}"),
            }
        }

        debug!(rows = rows.len(), row_count, "statement completed");
        Ok(StatementResult::new(columns, rows, row_count))
    }

    #[instrument(name = "release", level = "debug", skip(self))]
    async fn release(&mut self, force: bool) -> Result<()> {
        let Some(connection) = self.connection.take() else {
            return Ok(());
        };

        if force {
            connection
                .detach()
                .close()
                .await
                .map_err(|error| ConnectionError(error_text(&error)))?;
        } else {
            drop(connection);
        }
        Ok(())
    }
}

/// Server errors are rendered with the `error: ` prefix used by libpq clients; every
/// other error keeps its own description.
pub(crate) fn error_text(error: &sqlx::Error) -> String {
    match error {
        sqlx::Error::Database(database_error) => format!("error: {}", database_error.message()),
        error => error.to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pgshape_driver::Pool as _;

    fn unreachable_settings() -> PoolSettings {
        PoolSettings {
            host: "127.0.0.1".to_string(),
            port: 1,
            database: Some("pgshape".to_string()),
            connect_timeout_ms: 250,
            ..PoolSettings::default()
        }
    }

    #[tokio::test]
    async fn test_pool_settings() {
        let settings = unreachable_settings();
        let pool = Pool::new(settings.clone());
        assert_eq!(pool.settings(), &settings);
        pool.close().await;
    }

    #[tokio::test]
    async fn test_acquire_unreachable() {
        let pool = Pool::new(unreachable_settings());
        let result = pool.acquire().await;
        assert!(matches!(result, Err(ConnectionError(_))));
    }

    #[test]
    fn test_error_text_non_database() {
        let error = sqlx::Error::PoolTimedOut;
        assert_eq!(error_text(&error), error.to_string());
    }

    #[test]
    fn test_error_text_row_not_found() {
        let error = sqlx::Error::RowNotFound;
        assert!(!error_text(&error).starts_with("error: "));
    }
}
