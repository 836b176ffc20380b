use crate::error::Error;
use serde::Serialize;

pub(crate) const NOT_CONNECTED: &str = "Not connected yet.";
pub(crate) const CONNECTED: &str = "Connected successfully.";
pub(crate) const DISCONNECTED: &str = "Disconnected successfully.";
pub(crate) const ALREADY_DISCONNECTED: &str = "Is already disconnected.";

/// Whether the client holds a connection, with the message of the last transition
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConnectionStatus {
    connected: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Error>,
}

impl ConnectionStatus {
    pub(crate) fn connected() -> Self {
        Self {
            connected: true,
            message: CONNECTED.to_string(),
            error: None,
        }
    }

    pub(crate) fn disconnected() -> Self {
        Self {
            connected: false,
            message: DISCONNECTED.to_string(),
            error: None,
        }
    }

    pub(crate) fn failed(error: Error) -> Self {
        Self {
            connected: false,
            message: error.to_string(),
            error: Some(error),
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// The recorded error, or [`Error::NotConnected`] wrapping this status when none was recorded
    #[must_use]
    pub fn to_error(&self) -> Error {
        match &self.error {
            Some(error) => error.clone(),
            None => Error::NotConnected {
                status: Box::new(self.clone()),
            },
        }
    }
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self {
            connected: false,
            message: NOT_CONNECTED.to_string(),
            error: None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default() {
        let status = ConnectionStatus::default();
        assert!(!status.is_connected());
        assert_eq!(status.message(), "Not connected yet.");
        assert!(status.error().is_none());
    }

    #[test]
    fn test_transitions() {
        assert!(ConnectionStatus::connected().is_connected());
        assert_eq!(
            ConnectionStatus::connected().message(),
            "Connected successfully."
        );
        assert!(!ConnectionStatus::disconnected().is_connected());
        assert_eq!(
            ConnectionStatus::disconnected().message(),
            "Disconnected successfully."
        );
    }

    #[test]
    fn test_failed() {
        let error = Error::Connection {
            message: "connection refused".to_string(),
            raw: "connection refused\ndetail".to_string(),
        };
        let status = ConnectionStatus::failed(error.clone());
        assert!(!status.is_connected());
        assert_eq!(status.message(), "connection refused");
        assert_eq!(status.error(), Some(&error));
        assert_eq!(status.to_error(), error);
    }

    #[test]
    fn test_to_error_without_error() {
        let status = ConnectionStatus::disconnected();
        let Error::NotConnected { status: inner } = status.to_error() else {
            panic!("expected not connected");
        };
        assert_eq!(*inner, status);
    }
}
