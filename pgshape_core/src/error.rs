use crate::status::ConnectionStatus;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Failures recorded on connection statuses and query results
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// The pool refused or dropped the connection
    #[error("{message}")]
    Connection { message: String, raw: String },
    /// The statement failed at the server
    #[error("{message}")]
    Query { message: String, raw: String },
    /// A statement was issued while no connection was open
    #[error("Server is down")]
    NotConnected { status: Box<ConnectionStatus> },
    /// The requested output format does not exist
    #[error("format is not allowed: {format}")]
    InvalidFormat { format: String, allowed: Vec<String> },
    /// The requested transform is not a known function
    #[error("transform must be a known function, not: {name}")]
    InvalidTransform { name: String, allowed: Vec<String> },
    /// Settings could not be loaded
    #[error("{message}")]
    Configuration { message: String },
}

impl Error {
    pub(crate) fn connection(error: &pgshape_driver::Error) -> Self {
        let (message, raw) = normalize(&error.to_string());
        Error::Connection { message, raw }
    }

    pub(crate) fn query(error: &pgshape_driver::Error) -> Self {
        let (message, raw) = normalize(&error.to_string());
        Error::Query { message, raw }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Connection { .. } => "connection",
            Error::Query { .. } => "query",
            Error::NotConnected { .. } => "not_connected",
            Error::InvalidFormat { .. } => "invalid_format",
            Error::InvalidTransform { .. } => "invalid_transform",
            Error::Configuration { .. } => "configuration",
        }
    }
}

/// Splits driver text into its first line and the untouched full text.
fn normalize(text: &str) -> (String, String) {
    let message = text.lines().next().unwrap_or_default().to_string();
    (message, text.to_string())
}

impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("kind", self.kind())?;
        map.serialize_entry("message", &self.to_string())?;
        match self {
            Error::Connection { raw, .. } | Error::Query { raw, .. } => {
                map.serialize_entry("raw", raw)?;
            }
            Error::NotConnected { status } => map.serialize_entry("status", status)?,
            Error::InvalidFormat { format, allowed } => {
                map.serialize_entry("format", format)?;
                map.serialize_entry("allowed", allowed)?;
            }
            Error::InvalidTransform { name, allowed } => {
                map.serialize_entry("name", name)?;
                map.serialize_entry("allowed", allowed)?;
            }
            Error::Configuration { .. } => {}
        }
        map.end()
    }
}

/// Converts a [`config::ConfigError`] into a [`Configuration`](Error::Configuration) error
impl From<config::ConfigError> for Error {
    fn from(error: config::ConfigError) -> Self {
        Error::Configuration {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_error_normalized() {
        let driver_error = pgshape_driver::Error::QueryError(
            "error: syntax error at or near \"FROMM\"\nLINE 1: SELECT * FROMM test\r\n".to_string(),
        );
        let error = Error::query(&driver_error);

        assert_eq!(error.to_string(), r#"error: syntax error at or near "FROMM""#);
        assert_eq!(error.kind(), "query");
        let Error::Query { raw, .. } = &error else {
            panic!("expected query error");
        };
        assert!(raw.contains("LINE 1"));
    }

    #[test]
    fn test_connection_error_normalized_crlf() {
        let driver_error =
            pgshape_driver::Error::ConnectionError("refused\r\nsecond line".to_string());
        let error = Error::connection(&driver_error);

        assert_eq!(error.to_string(), "refused");
        assert_eq!(error.kind(), "connection");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), (String::new(), String::new()));
    }

    #[test]
    fn test_not_connected_display() {
        let error = Error::NotConnected {
            status: Box::new(ConnectionStatus::default()),
        };
        assert_eq!(error.to_string(), "Server is down");
        assert_eq!(
            json!(error),
            json!({
                "kind": "not_connected",
                "message": "Server is down",
                "status": {"connected": false, "message": "Not connected yet."}
            })
        );
    }

    #[test]
    fn test_invalid_format_serialize() {
        let error = Error::InvalidFormat {
            format: "chacho".to_string(),
            allowed: vec!["bool".to_string()],
        };
        assert_eq!(
            json!(error),
            json!({
                "kind": "invalid_format",
                "message": "format is not allowed: chacho",
                "format": "chacho",
                "allowed": ["bool"]
            })
        );
    }

    #[test]
    fn test_from_config_error() {
        let error = Error::from(config::ConfigError::NotFound("pool".to_string()));
        assert_eq!(error.kind(), "configuration");
        assert!(error.to_string().contains("pool"));
    }
}
