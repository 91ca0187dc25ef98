//! Load targets for the evstar star schema
//!
//! Every sink replaces tables wholesale: drop, recreate, insert. Tables are
//! written one after another and each write stands on its own.
//!
//! ## Features
//!
//! Enable database support via Cargo features:
//! - `postgres` - PostgreSQL support (tokio-postgres, optional TLS)
//!
//! The CSV directory sink and the mock sink are always available.
//!
//! ## Example
//!
//! ```rust,ignore
//! use evstar_sink::{connect_sink, load_tables};
//!
//! let sink = connect_sink(&sink_config).await?;
//! let report = load_tables(sink.as_ref(), &tables).await;
//! report.into_result()?;
//! ```

pub mod adapter;
pub mod csv_dir;
pub mod load;
pub mod mock;
pub mod postgres;

pub use adapter::{LoadError, TableIdentifier, TableSink};
pub use csv_dir::CsvDirectorySink;
pub use load::{connect_sink, load_tables, LoadReport};
pub use mock::MockSink;
pub use postgres::PostgresSink;
