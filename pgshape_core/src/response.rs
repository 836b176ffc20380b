use crate::error::Error;
use serde::Serialize;

/// Outcome of a lifecycle or one-shot operation
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Response<T = ()> {
    pub status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Error>,
}

impl<T> Response<T> {
    pub fn ok<S: Into<String>>(message: S) -> Self {
        Self {
            status: true,
            message: Some(message.into()),
            result: None,
            error: None,
        }
    }

    pub fn ok_with(result: T) -> Self {
        Self {
            status: true,
            message: None,
            result: Some(result),
            error: None,
        }
    }

    #[must_use]
    pub fn ko(error: Error) -> Self {
        Self {
            status: false,
            message: None,
            result: None,
            error: Some(error),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status
    }
}
