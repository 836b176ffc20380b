mod driver;
mod results;

pub use driver::{Connection, Pool};
