use crate::error::Result;
use crate::{PoolSettings, Value};
use async_trait::async_trait;
use mockall::automock;
use std::fmt::Debug;

/// A single row of a statement result, in column order
pub type Row = Vec<Value>;

/// Name and database type of a result column
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnDescriptor {
    name: String,
    type_name: String,
}

impl ColumnDescriptor {
    #[must_use]
    pub fn new<S: Into<String>>(name: S, type_name: S) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

/// Everything a connection returns for one executed statement
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatementResult {
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Row>,
    row_count: u64,
}

impl StatementResult {
    #[must_use]
    pub fn new(columns: Vec<ColumnDescriptor>, rows: Vec<Row>, row_count: u64) -> Self {
        Self {
            columns,
            rows,
            row_count,
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Rows affected by a DML statement, or rows returned by a query
    #[must_use]
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<ColumnDescriptor>, Vec<Row>, u64) {
        (self.columns, self.rows, self.row_count)
    }
}

/// A connection checked out of a [`Pool`]
#[automock]
#[async_trait]
pub trait Connection: Debug + Send + Sync {
    /// Execute a raw statement and collect its rows, columns and row count
    async fn execute(&mut self, statement: &str) -> Result<StatementResult>;

    /// Hand the connection back to its pool. When `force` is set the underlying
    /// session is closed instead of being kept for reuse.
    async fn release(&mut self, force: bool) -> Result<()>;
}

/// An externally managed set of reusable connections
#[automock]
#[async_trait]
pub trait Pool: Debug + Send + Sync {
    fn settings(&self) -> &PoolSettings;
    async fn acquire(&self) -> Result<Box<dyn Connection>>;
}
