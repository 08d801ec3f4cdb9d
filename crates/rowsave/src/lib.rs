//! # rowsave
//!
//! Save / insert / update / exists helpers that map plain Rust records to
//! parameterized SQL.
//!
//! ## Features
//!
//! - **Records, not models**: any struct with `#[derive(Record)]` (or a manual
//!   [`Record`] impl) can be saved; field descriptors are cached per type
//! - **Upsert by existence check**: `save` counts rows matching the key fields,
//!   then inserts or updates
//! - **Sync and async**: [`RecordExt`] for blocking executors, [`AsyncRecordExt`]
//!   for async ones; both send byte-identical SQL
//! - **Driver aware**: `@name` placeholders, `?name?` for ODBC, `$n` for Postgres
//! - **Transaction-friendly**: pass a transaction anywhere an executor is expected
//!
//! ## Example
//!
//! ```ignore
//! use rowsave::prelude::*;
//!
//! #[derive(Record)]
//! #[record(table = "entries")]
//! struct Entry {
//!     id: Option<i32>,
//!     name: String,
//!     value: String,
//! }
//!
//! let conn = WithIdentity::new(&client, "id");
//! let saved = conn
//!     .save(&Entry { id: None, name: "a".into(), value: "b".into() }, &["id"], &SaveOptions::new())
//!     .await?;
//! ```
//!
//! `save` is not atomic: the existence check and the write are separate
//! statements. Wrap it in a transaction when concurrent saves of the same key
//! are possible.

mod bind;
pub mod blocking;
pub mod builder;
pub mod client;
pub mod driver;
pub mod error;
pub mod fields;
pub mod ops;
pub mod params;
pub mod prelude;
pub mod record;
pub mod statements;
pub mod value;

pub use blocking::{BlockingClient, BlockingTransaction};
pub use builder::SqlBuilder;
pub use client::{AsyncExecutor, Executor, WithIdentity};
pub use driver::{Driver, IdentityFetch, parameter_name};
pub use error::{RecordError, RecordResult};
pub use ops::{AsyncRecordExt, RecordExt, SaveOptions, Saved};
pub use params::{DATETIME_HINT, Param, ParamSet, PrecisionHint, build_params};
pub use record::{FieldDescriptor, Record};
pub use value::{FieldKind, ToValue, Value};

#[cfg(feature = "derive")]
pub use rowsave_derive::Record;
