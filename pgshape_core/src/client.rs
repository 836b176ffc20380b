use crate::error::{Error, Result};
use crate::format::{Format, FormatOptions, Formatted};
use crate::history::QueryHistory;
use crate::response::Response;
use crate::results::QueryResult;
use crate::sanitize::sanitize;
use crate::status::{ALREADY_DISCONNECTED, ConnectionStatus, DISCONNECTED};
use crate::transform::Transform;
use pgshape_driver::{Connection, Pool, PoolSettings, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// A client holding at most one connection from a shared pool.
///
/// Every statement is recorded in the client's history, whether it succeeded or not.
/// Dropping the client drops its connection, which hands it back to the pool.
#[derive(Debug)]
pub struct Client {
    pool: Arc<dyn Pool>,
    connection: Option<Box<dyn Connection>>,
    status: ConnectionStatus,
    history: QueryHistory,
}

impl Client {
    #[must_use]
    pub fn new(pool: Arc<dyn Pool>) -> Self {
        Self {
            pool,
            connection: None,
            status: ConnectionStatus::default(),
            history: QueryHistory::new(),
        }
    }

    #[must_use]
    pub fn pool(&self) -> &Arc<dyn Pool> {
        &self.pool
    }

    /// The pool settings with the password masked
    #[must_use]
    pub fn pool_info(&self) -> PoolSettings {
        self.pool.settings().masked()
    }

    /// A snapshot of the connection status
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.status.clone()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.status.is_connected()
    }

    /// Acquire a connection, closing any connection already held first.
    #[instrument(skip(self))]
    pub async fn open(&mut self) -> ConnectionStatus {
        if self.connection.is_some() {
            if let Some(error) = self.close().await.error {
                warn!("Replacing a connection that failed to release: {error}");
            }
        }

        match self.pool.acquire().await {
            Ok(connection) => {
                self.connection = Some(connection);
                self.status = ConnectionStatus::connected();
                info!("Connected to {}", self.pool.settings().host);
            }
            Err(error) => {
                let error = Error::connection(&error);
                warn!("Connection failed: {error}");
                self.status = ConnectionStatus::failed(error);
            }
        }
        self.status.clone()
    }

    /// Release the held connection and discard its session.
    ///
    /// The connection is cleared and the status set to disconnected even when the
    /// release itself fails; that failure is still reported in the response.
    #[instrument(skip(self))]
    pub async fn close(&mut self) -> Response {
        let Some(mut connection) = self.connection.take() else {
            debug!("No connection to close");
            return Response::ok(ALREADY_DISCONNECTED);
        };

        let released = connection.release(true).await;
        self.status = ConnectionStatus::disconnected();
        match released {
            Ok(()) => {
                info!("Disconnected");
                Response::ok(DISCONNECTED)
            }
            Err(error) => {
                let error = Error::connection(&error);
                warn!("Connection release failed: {error}");
                Response::ko(error)
            }
        }
    }

    /// Execute a statement and return a copy of its record.
    ///
    /// Failures, including having no open connection, are recorded on the returned
    /// record rather than returned as errors.
    pub async fn execute(&mut self, statement: &str) -> QueryResult {
        let result = self.run(statement).await;
        let result = self.history.push(result);
        QueryResult::clone(&result)
    }

    /// Execute a statement and shape its record.
    ///
    /// # Errors
    /// * the recorded error if the statement failed
    /// * [`Error::InvalidTransform`] if the transform in `options` is unknown; the
    ///   record is marked failed as well
    pub async fn query(
        &mut self,
        statement: &str,
        format: Format,
        options: &FormatOptions,
    ) -> Result<Formatted> {
        self.shape(statement, Ok(format), options).await
    }

    /// Like [`query`](Client::query) with the format given by its identifier.
    ///
    /// # Errors
    /// * the recorded error if the statement failed
    /// * [`Error::InvalidFormat`] or [`Error::InvalidTransform`] if the format or
    ///   transform is unknown; the record is marked failed as well
    pub async fn query_named(
        &mut self,
        statement: &str,
        format: &str,
        options: &FormatOptions,
    ) -> Result<Formatted> {
        let format = format.parse::<Format>();
        self.shape(statement, format, options).await
    }

    /// Open, query and close in a single call.
    ///
    /// The first failure among the three steps is returned in the response; a failed
    /// statement is still followed by a close.
    pub async fn execute_once(
        &mut self,
        statement: &str,
        format: &str,
        options: &FormatOptions,
    ) -> Response<Formatted> {
        let opened = self.open().await;
        if !opened.is_connected() {
            return Response::ko(opened.to_error());
        }

        let shaped = self.query_named(statement, format, options).await;
        let closed = self.close().await;
        if let Some(error) = closed.error {
            return Response::ko(error);
        }

        match shaped {
            Ok(formatted) => Response::ok_with(formatted),
            Err(error) => Response::ko(error),
        }
    }

    /// The record `offset` steps back from the most recent one
    #[must_use]
    pub fn last_result(&self, offset: usize) -> Option<QueryResult> {
        self.history.last(offset).map(|result| QueryResult::clone(result))
    }

    /// The stored record `offset` steps back from the most recent one, without copying
    #[must_use]
    pub fn last_result_raw(&self, offset: usize) -> Option<Arc<QueryResult>> {
        self.history.last(offset).cloned()
    }

    /// The record `offset` steps forward from the oldest one
    #[must_use]
    pub fn first_result(&self, offset: usize) -> Option<QueryResult> {
        self.history.first(offset).map(|result| QueryResult::clone(result))
    }

    #[must_use]
    pub fn first_result_raw(&self, offset: usize) -> Option<Arc<QueryResult>> {
        self.history.first(offset).cloned()
    }

    /// Copies of every record, most recent first
    #[must_use]
    pub fn all_results(&self) -> Vec<QueryResult> {
        self.history
            .iter()
            .map(|result| QueryResult::clone(result))
            .collect()
    }

    #[must_use]
    pub fn all_results_raw(&self) -> Vec<Arc<QueryResult>> {
        self.history.iter().cloned().collect()
    }

    #[must_use]
    pub fn history(&self) -> &QueryHistory {
        &self.history
    }

    /// The count of the most recent record, or zero when there is none or it failed
    #[must_use]
    pub fn affected_rows(&self) -> u64 {
        self.history.last(0).map_or(0, |result| result.row_count())
    }

    #[must_use]
    #[expect(clippy::unused_self)]
    pub fn sanitize(&self, value: &Value) -> String {
        sanitize(value)
    }

    async fn shape(
        &mut self,
        statement: &str,
        format: Result<Format>,
        options: &FormatOptions,
    ) -> Result<Formatted> {
        let mut result = self.run(statement).await;
        let shaped = match result.error() {
            Some(error) => Err(error.clone()),
            None => {
                let resolved = format.and_then(|format| {
                    let transform = options
                        .transform
                        .as_ref()
                        .map(Transform::resolve)
                        .transpose()?;
                    Ok((format, transform))
                });
                if let Err(error) = &resolved {
                    warn!("Unable to format result: {error}");
                    result.fail(error.clone());
                }
                resolved
            }
        };

        let result = self.history.push(result);
        let (format, transform) = shaped?;
        debug!("Formatting result as {format}");
        Ok(format.apply(&result, options, transform.as_ref()))
    }

    #[instrument(skip(self))]
    async fn run(&mut self, statement: &str) -> QueryResult {
        let connection = match self.connection.as_mut() {
            Some(connection) if self.status.is_connected() => connection,
            _ => {
                debug!("Server is down; statement not sent");
                let error = Error::NotConnected {
                    status: Box::new(self.status.clone()),
                };
                return QueryResult::failed(statement, error);
            }
        };

        match connection.execute(statement).await {
            Ok(result) => {
                debug!("Statement returned {} rows", result.row_count());
                QueryResult::new(statement, result)
            }
            Err(error) => {
                let error = Error::query(&error);
                warn!("Statement failed: {error}");
                QueryResult::failed(statement, error)
            }
        }
    }
}
