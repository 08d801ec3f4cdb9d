//! Attribute parsing for the Record derive macro.
//!
//! Handles struct-level and field-level `#[record(...)]` attributes.

use heck::{ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use syn::{Attribute, LitStr, Result};

/// Column naming rule from `#[record(rename_all = "...")]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenameRule {
    Snake,
    LowerCamel,
    Pascal,
    ScreamingSnake,
}

impl RenameRule {
    fn parse(lit: &LitStr) -> Result<Self> {
        match lit.value().as_str() {
            "snake_case" => Ok(Self::Snake),
            "camelCase" => Ok(Self::LowerCamel),
            "PascalCase" => Ok(Self::Pascal),
            "SCREAMING_SNAKE_CASE" => Ok(Self::ScreamingSnake),
            other => Err(syn::Error::new_spanned(
                lit,
                format!(
                    "unknown rename_all rule `{other}`, expected one of: \
                     snake_case, camelCase, PascalCase, SCREAMING_SNAKE_CASE"
                ),
            )),
        }
    }

    pub(crate) fn apply(self, name: &str) -> String {
        match self {
            Self::Snake => name.to_snake_case(),
            Self::LowerCamel => name.to_lower_camel_case(),
            Self::Pascal => name.to_upper_camel_case(),
            Self::ScreamingSnake => name.to_shouty_snake_case(),
        }
    }
}

/// Struct-level options.
#[derive(Debug, Default)]
pub(crate) struct StructAttr {
    pub table: Option<String>,
    pub rename_all: Option<RenameRule>,
}

/// Field-level options.
#[derive(Debug, Default)]
pub(crate) struct FieldAttr {
    pub column: Option<String>,
    pub skip: bool,
}

pub(crate) fn parse_struct_attrs(attrs: &[Attribute]) -> Result<StructAttr> {
    let mut out = StructAttr::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("record")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let lit: LitStr = meta.value()?.parse()?;
                out.table = Some(lit.value());
                Ok(())
            } else if meta.path.is_ident("rename_all") {
                let lit: LitStr = meta.value()?.parse()?;
                out.rename_all = Some(RenameRule::parse(&lit)?);
                Ok(())
            } else {
                Err(meta.error("unsupported record attribute, expected `table` or `rename_all`"))
            }
        })?;
    }
    Ok(out)
}

pub(crate) fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttr> {
    let mut out = FieldAttr::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("record")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("column") {
                let lit: LitStr = meta.value()?.parse()?;
                out.column = Some(lit.value());
                Ok(())
            } else if meta.path.is_ident("skip") {
                out.skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported record field attribute, expected `column` or `skip`"))
            }
        })?;
    }
    Ok(out)
}
