//! Derive macros for rowsave
//!
//! Provides `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod record;

/// Derive `Record` for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use rowsave::Record;
///
/// #[derive(Record)]
/// #[record(table = "entries", rename_all = "PascalCase")]
/// struct Entry {
///     id: Option<i32>,
///     name: String,
///     #[record(column = "Payload")]
///     value: Option<String>,
///     #[record(skip)]
///     dirty: bool,
/// }
/// ```
///
/// # Attributes
///
/// - `#[record(table = "name")]` - Table name (defaults to the struct name)
/// - `#[record(rename_all = "...")]` - `snake_case`, `camelCase`, `PascalCase`
///   or `SCREAMING_SNAKE_CASE` for every column without an explicit name
/// - `#[record(column = "name")]` - Map field to a different column name
/// - `#[record(skip)]` - Leave the field out of every statement
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
