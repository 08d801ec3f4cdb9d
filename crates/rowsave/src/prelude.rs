//! Convenience re-exports.
//!
//! ```ignore
//! use rowsave::prelude::*;
//! ```

pub use crate::client::{AsyncExecutor, Executor, WithIdentity};
pub use crate::driver::{Driver, IdentityFetch};
pub use crate::error::{RecordError, RecordResult};
pub use crate::ops::{AsyncRecordExt, RecordExt, SaveOptions, Saved};
pub use crate::params::{ParamSet, build_params};
pub use crate::record::{FieldDescriptor, Record};
pub use crate::value::{ToValue, Value};

#[cfg(feature = "derive")]
pub use rowsave_derive::Record;
