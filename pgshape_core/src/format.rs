use crate::error::{Error, Result};
use crate::results::{QueryResult, Row};
use crate::transform::{Transform, TransformFn};
use indexmap::IndexMap;
use pgshape_driver::Value;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Column name used by the keyed formats when a positional key has no column
const DEFAULT_ID_COLUMN: &str = "id";

/// The shape a successful query result is returned in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Format {
    /// `true` when at least one row was returned or affected
    Bool,
    /// The number of rows returned or affected
    Count,
    /// One value from the first row
    Value,
    /// One value from every row
    Values,
    /// One value from every row, keyed by an id column
    ValuesById,
    /// Every row
    Array,
    /// Every row, keyed by an id column
    ArrayById,
    /// One row
    Row,
    /// One row without its falsy values.
    ///
    /// Null, `false`, zero, `NaN` and empty strings are all dropped, so a column
    /// holding a legitimate zero or empty value is indistinguishable from an absent one.
    RowStrict,
    /// The query result itself
    #[default]
    Default,
}

impl Format {
    pub const ALL: [Format; 10] = [
        Format::Bool,
        Format::Count,
        Format::Value,
        Format::Values,
        Format::ValuesById,
        Format::Array,
        Format::ArrayById,
        Format::Row,
        Format::RowStrict,
        Format::Default,
    ];

    #[must_use]
    pub fn identifier(self) -> &'static str {
        match self {
            Format::Bool => "bool",
            Format::Count => "count",
            Format::Value => "value",
            Format::Values => "values",
            Format::ValuesById => "valuesById",
            Format::Array => "array",
            Format::ArrayById => "arrayById",
            Format::Row => "row",
            Format::RowStrict => "rowStrict",
            Format::Default => "default",
        }
    }

    /// The identifiers of every format
    #[must_use]
    pub fn allowed() -> Vec<String> {
        Format::ALL
            .iter()
            .map(|format| format.identifier().to_string())
            .collect()
    }

    /// Shape a successful `result`.
    ///
    /// Missing rows and columns yield [`Value::Null`] or empty collections. When a
    /// transform is given, every output value goes through it; for `bool` and `count`
    /// the transformed scalar is returned as [`Formatted::Value`].
    #[must_use]
    pub fn apply(
        self,
        result: &QueryResult,
        options: &FormatOptions,
        transform: Option<&TransformFn>,
    ) -> Formatted {
        let map = |value: &Value| match transform {
            Some(transform) => transform(value),
            None => value.clone(),
        };
        let map_row = |row: &Row| -> Row {
            row.iter()
                .map(|(name, value)| (name.clone(), map(value)))
                .collect()
        };

        match self {
            Format::Bool => {
                let found = result.row_count() > 0;
                match transform {
                    Some(transform) => Formatted::Value(transform(&Value::Bool(found))),
                    None => Formatted::Bool(found),
                }
            }
            Format::Count => {
                let count = result.row_count();
                match transform {
                    Some(transform) => {
                        let count = i64::try_from(count).unwrap_or(i64::MAX);
                        Formatted::Value(transform(&Value::I64(count)))
                    }
                    None => Formatted::Count(count),
                }
            }
            Format::Value => {
                let value = result
                    .row(0)
                    .map_or(Value::Null, |row| lookup(row, &options.value_key));
                Formatted::Value(map(&value))
            }
            Format::Values => Formatted::Values(
                result
                    .rows()
                    .iter()
                    .map(|row| map(&lookup(row, &options.value_key)))
                    .collect(),
            ),
            Format::ValuesById => {
                let id_column = column_name(result, &options.value_id);
                let mut values = IndexMap::new();
                for row in result.rows() {
                    if let Some(id) = row.get(id_column) {
                        values.insert(id.to_string(), map(&lookup(row, &options.value_key)));
                    }
                }
                Formatted::ValuesById(values)
            }
            Format::Array => Formatted::Array(result.rows().iter().map(map_row).collect()),
            Format::ArrayById => {
                let id_column = column_name(result, &options.value_key);
                let mut rows = IndexMap::new();
                for row in result.rows() {
                    if let Some(id) = row.get(id_column) {
                        rows.insert(id.to_string(), map_row(row));
                    }
                }
                Formatted::ArrayById(rows)
            }
            Format::Row => Formatted::Row(
                result
                    .row(options.value_key.row_index())
                    .map(map_row)
                    .unwrap_or_default(),
            ),
            Format::RowStrict => {
                let mut row = result
                    .row(options.value_key.row_index())
                    .map(map_row)
                    .unwrap_or_default();
                row.retain(|_, value| !value.is_falsy());
                Formatted::Row(row)
            }
            Format::Default => Formatted::Result(result.clone()),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(format: &str) -> Result<Self> {
        Format::ALL
            .into_iter()
            .find(|candidate| candidate.identifier() == format)
            .ok_or_else(|| Error::InvalidFormat {
                format: format.to_string(),
                allowed: Format::allowed(),
            })
    }
}

/// Selects a column by position or by name
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Index(usize),
    Name(String),
}

impl Key {
    /// Digits select a position, empty text selects the first column, anything else is a name.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Key::Index(0);
        }
        if text.bytes().all(|byte| byte.is_ascii_digit()) {
            if let Ok(index) = text.parse() {
                return Key::Index(index);
            }
        }
        Key::Name(text.to_string())
    }

    /// Row index used by the single row formats; names select the first row.
    fn row_index(&self) -> usize {
        match self {
            Key::Index(index) => *index,
            Key::Name(_) => 0,
        }
    }
}

impl Default for Key {
    fn default() -> Self {
        Key::Index(0)
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

impl From<&str> for Key {
    fn from(text: &str) -> Self {
        Key::parse(text)
    }
}

impl From<String> for Key {
    fn from(text: String) -> Self {
        Key::parse(&text)
    }
}

/// The value found under `key` in `row`, or [`Value::Null`]
fn lookup(row: &Row, key: &Key) -> Value {
    let value = match key {
        Key::Index(index) => row.get_index(*index).map(|(_, value)| value),
        Key::Name(name) => row.get(name),
    };
    value.cloned().unwrap_or(Value::Null)
}

/// Resolve a key to a column name through the result's column metadata
fn column_name<'a>(result: &'a QueryResult, key: &'a Key) -> &'a str {
    match key {
        Key::Index(index) => result
            .columns()
            .get(*index)
            .map_or(DEFAULT_ID_COLUMN, |column| column.name()),
        Key::Name(name) => name,
    }
}

#[derive(Clone, Debug, Default)]
pub struct FormatOptions {
    pub value_key: Key,
    pub value_id: Key,
    pub transform: Option<Transform>,
}

impl FormatOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value_key<K: Into<Key>>(mut self, key: K) -> Self {
        self.value_key = key.into();
        self
    }

    #[must_use]
    pub fn with_value_id<K: Into<Key>>(mut self, key: K) -> Self {
        self.value_id = key.into();
        self
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }
}

/// A query result reshaped by a [`Format`]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Formatted {
    Bool(bool),
    Count(u64),
    Value(Value),
    Values(Vec<Value>),
    ValuesById(IndexMap<String, Value>),
    Array(Vec<Row>),
    ArrayById(IndexMap<String, Row>),
    Row(Row),
    Result(QueryResult),
}
