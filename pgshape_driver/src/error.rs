pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error acquiring or releasing a pooled connection
    #[error("{0}")]
    ConnectionError(String),
    /// Data type conversion error
    #[error("{0}")]
    ConversionError(String),
    /// IO error
    #[error("{0}")]
    IoError(String),
    /// Error reported while executing a statement
    #[error("{0}")]
    QueryError(String),
    /// Error when parsing an integer
    #[error(transparent)]
    TryFromIntError(#[from] std::num::TryFromIntError),
    /// Error when a column type is not supported
    #[error("column type [{column_type}] is not supported for column [{column_name}]")]
    UnsupportedColumnType {
        column_name: String,
        column_type: String,
    },
}

/// Converts a [`jiff::Error`] into an [`ConversionError`](Error::ConversionError)
impl From<jiff::Error> for Error {
    fn from(error: jiff::Error) -> Self {
        Error::ConversionError(error.to_string())
    }
}

/// Converts a [`std::io::Error`] into an [`IoError`](Error::IoError)
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::IoError(error.to_string())
    }
}

/// Convert [`utf8 errors`](std::string::FromUtf8Error) to [`IoError`](Error::IoError)
impl From<std::string::FromUtf8Error> for Error {
    fn from(error: std::string::FromUtf8Error) -> Self {
        Error::IoError(error.to_string())
    }
}
