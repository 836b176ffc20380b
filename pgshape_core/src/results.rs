use crate::error::Error;
use indexmap::IndexMap;
use pgshape_driver::{ColumnDescriptor, StatementResult, Value};
use serde::Serialize;

/// A row keyed by column name, in result column order
pub type Row = IndexMap<String, Value>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Column {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
}

impl Column {
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

impl From<&ColumnDescriptor> for Column {
    fn from(descriptor: &ColumnDescriptor) -> Self {
        Column::new(descriptor.name(), descriptor.type_name())
    }
}

/// The record of one executed statement.
///
/// `count` is the number of rows returned or affected, and is absent when the
/// statement failed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryResult {
    rows: Vec<Row>,
    status: bool,
    count: Option<u64>,
    statement: String,
    columns: Vec<Column>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Error>,
}

impl QueryResult {
    /// Build a successful record from what a driver returned for `statement`
    #[must_use]
    pub fn new(statement: &str, result: StatementResult) -> Self {
        let (descriptors, values, row_count) = result.into_parts();
        let columns: Vec<Column> = descriptors.iter().map(Column::from).collect();
        let rows = values
            .into_iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| column.name.clone())
                    .zip(row)
                    .collect::<Row>()
            })
            .collect();

        Self {
            rows,
            status: true,
            count: Some(row_count),
            statement: statement.to_string(),
            columns,
            error: None,
        }
    }

    pub(crate) fn failed(statement: &str, error: Error) -> Self {
        Self {
            rows: Vec::new(),
            status: false,
            count: None,
            statement: statement.to_string(),
            columns: Vec::new(),
            error: Some(error),
        }
    }

    /// Mark the record as failed; rows and count are left as they were.
    pub(crate) fn fail(&mut self, error: Error) {
        self.status = false;
        self.error = Some(error);
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status
    }

    #[must_use]
    pub fn count(&self) -> Option<u64> {
        self.count
    }

    /// The count, or zero when the statement failed
    #[must_use]
    pub fn row_count(&self) -> u64 {
        self.count.unwrap_or(0)
    }

    #[must_use]
    pub fn statement(&self) -> &str {
        &self.statement
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn statement_result() -> StatementResult {
        StatementResult::new(
            vec![
                ColumnDescriptor::new("id", "INT4"),
                ColumnDescriptor::new("name", "TEXT"),
            ],
            vec![
                vec![Value::I32(1), Value::from("chacho")],
                vec![Value::I32(2), Value::from("loco")],
            ],
            2,
        )
    }

    #[test]
    fn test_new() {
        let result = QueryResult::new("SELECT id, name FROM test", statement_result());

        assert!(result.is_ok());
        assert_eq!(result.count(), Some(2));
        assert_eq!(result.statement(), "SELECT id, name FROM test");
        assert_eq!(
            result.columns(),
            &[Column::new("id", "INT4"), Column::new("name", "TEXT")]
        );
        let row = result.row(1).expect("second row");
        assert_eq!(row.get("id"), Some(&Value::I32(2)));
        assert_eq!(row.get_index(1), Some((&"name".to_string(), &Value::from("loco"))));
        assert!(result.row(2).is_none());
        assert!(result.error().is_none());
    }

    #[test]
    fn test_duplicate_column_names_keep_last_value() {
        let result = QueryResult::new(
            "SELECT 1 AS a, 2 AS a",
            StatementResult::new(
                vec![
                    ColumnDescriptor::new("a", "INT4"),
                    ColumnDescriptor::new("a", "INT4"),
                ],
                vec![vec![Value::I32(1), Value::I32(2)]],
                1,
            ),
        );
        let row = result.row(0).expect("row");
        assert_eq!(row.len(), 1);
        assert_eq!(row.get("a"), Some(&Value::I32(2)));
    }

    #[test]
    fn test_failed() {
        let error = Error::Query {
            message: "boom".to_string(),
            raw: "boom".to_string(),
        };
        let result = QueryResult::failed("SELECT", error.clone());

        assert!(!result.is_ok());
        assert_eq!(result.count(), None);
        assert_eq!(result.row_count(), 0);
        assert!(result.rows().is_empty());
        assert_eq!(result.error(), Some(&error));
    }

    #[test]
    fn test_fail_keeps_rows() {
        let mut result = QueryResult::new("SELECT id, name FROM test", statement_result());
        result.fail(Error::InvalidTransform {
            name: "chacho".to_string(),
            allowed: Vec::new(),
        });

        assert!(!result.is_ok());
        assert_eq!(result.count(), Some(2));
        assert_eq!(result.rows().len(), 2);
    }

    #[test]
    fn test_serialize() {
        let result = QueryResult::new("SELECT id, name FROM test", statement_result());
        assert_eq!(
            json!(result),
            json!({
                "rows": [{"id": 1, "name": "chacho"}, {"id": 2, "name": "loco"}],
                "status": true,
                "count": 2,
                "statement": "SELECT id, name FROM test",
                "columns": [{"name": "id", "type": "INT4"}, {"name": "name", "type": "TEXT"}]
            })
        );
    }
}
