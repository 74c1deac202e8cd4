pub mod book;
pub mod config;
pub mod error;
pub mod ingest;
pub mod processor;
pub mod query;
pub mod record;
pub mod report;
pub mod rpc;
pub mod server;
pub mod store;

pub use book::AttendanceBook;
pub use error::{AttendanceError, Result};
pub use record::{FieldValue, RawRow, Record};
