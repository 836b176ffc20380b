//! # pgshape Core
//!
//! Holds one pooled connection at a time, records every executed statement in a
//! most-recent-first history and reshapes results into scalars, lists, maps and rows.
//!
//! ```no_run
//! # async fn run(pool: std::sync::Arc<dyn pgshape_core::Pool>) {
//! use pgshape_core::{Client, FormatOptions};
//!
//! let mut client = Client::new(pool);
//! let response = client
//!     .execute_once("SELECT id, name FROM users", "arrayById", &FormatOptions::default())
//!     .await;
//! assert!(response.status);
//! # }
//! ```

#![forbid(unsafe_code)]
#![forbid(clippy::allow_attributes)]
#![deny(clippy::pedantic)]

mod client;
pub mod configuration;
mod error;
mod format;
mod history;
mod response;
mod results;
mod sanitize;
mod status;
mod transform;

pub use client::Client;
pub use error::{Error, Result};
pub use format::{Format, FormatOptions, Formatted, Key};
pub use history::QueryHistory;
pub use response::Response;
pub use results::{Column, QueryResult, Row};
pub use sanitize::sanitize;
pub use status::ConnectionStatus;
pub use transform::{BUILTIN_TRANSFORMS, Transform, TransformFn};

pub use pgshape_driver::{Pool, PoolSettings, Value};
