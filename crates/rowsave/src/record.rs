//! Record trait and field descriptors.

use crate::value::{FieldKind, ToValue, Value};
use std::fmt;

/// A plain data type whose readable fields map to table columns.
///
/// This trait should typically be derived using `#[derive(Record)]`
/// from the `rowsave-derive` crate. A manual implementation only has to list
/// its fields; the list is cached per type by [`crate::fields::fields`].
///
/// # Example
///
/// ```ignore
/// use rowsave::{FieldDescriptor, Record, ToValue};
///
/// struct Entry {
///     id: Option<i32>,
///     name: String,
/// }
///
/// impl Record for Entry {
///     const TABLE: &'static str = "Entry";
///
///     fn describe() -> Vec<FieldDescriptor<Self>> {
///         vec![
///             FieldDescriptor::typed::<Option<i32>>("Id", |e: &Self| e.id.to_value()),
///             FieldDescriptor::typed::<String>("Name", |e: &Self| e.name.to_value()),
///         ]
///     }
/// }
/// ```
pub trait Record: Sized + 'static {
    /// Table used when the caller does not name one.
    const TABLE: &'static str;

    /// Enumerate the readable fields of this type, in declaration order.
    fn describe() -> Vec<FieldDescriptor<Self>>;
}

/// Name, declared type and getter of one record field.
pub struct FieldDescriptor<R> {
    name: &'static str,
    kind: FieldKind,
    getter: fn(&R) -> Value,
}

impl<R> FieldDescriptor<R> {
    pub fn new(name: &'static str, kind: FieldKind, getter: fn(&R) -> Value) -> Self {
        Self { name, kind, getter }
    }

    /// Same as [`FieldDescriptor::new`], taking the declared kind from `T`.
    pub fn typed<T: ToValue>(name: &'static str, getter: fn(&R) -> Value) -> Self {
        Self::new(name, T::KIND, getter)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Read this field's current value from `record`.
    pub fn get(&self, record: &R) -> Value {
        (self.getter)(record)
    }
}

impl<R> Clone for FieldDescriptor<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for FieldDescriptor<R> {}

impl<R> fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
