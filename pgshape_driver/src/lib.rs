//! # pgshape Driver
//!
//! The pgshape driver library defines the boundary between the query wrapper and a
//! database client: a [`Pool`] that hands out pooled [`Connection`]s, the
//! [`StatementResult`] a connection returns, and the dynamically typed [`Value`]
//! carried in each row.

#![forbid(unsafe_code)]
#![forbid(clippy::allow_attributes)]
#![deny(clippy::pedantic)]

mod connection;
mod error;
mod settings;
mod value;

pub use connection::{
    ColumnDescriptor, Connection, MockConnection, MockPool, Pool, Row, StatementResult,
};
pub use error::{Error, Result};
pub use settings::PoolSettings;
pub use value::Value;
