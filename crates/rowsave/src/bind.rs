//! Named-to-positional placeholder rewriting for Postgres.
//!
//! Statements are generated with `@name` placeholders; tokio-postgres only
//! understands `$1, $2, ...`. Each distinct name gets the next index on first
//! use and keeps it for repeated uses. Text inside single-quoted literals and
//! double-quoted identifiers is copied verbatim.

use crate::error::{RecordError, RecordResult};
use crate::params::ParamSet;
use crate::value::Value;

/// Rewrite `sql` and collect the bound values in placeholder order.
///
/// Parameters that the statement never references are ignored.
pub(crate) fn to_positional<'p>(
    sql: &str,
    params: &'p ParamSet,
) -> RecordResult<(String, Vec<&'p Value>)> {
    let mut out = String::with_capacity(sql.len());
    let mut names: Vec<&str> = Vec::new();
    let mut values: Vec<&'p Value> = Vec::new();
    let mut chars = sql.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            '\'' | '"' => {
                out.push(c);
                // Copy up to the closing quote; a doubled quote is an escape and
                // simply reopens the literal on the next iteration.
                for (_, inner) in chars.by_ref() {
                    out.push(inner);
                    if inner == c {
                        break;
                    }
                }
            }
            '@' if chars
                .peek()
                .is_some_and(|&(_, next)| next == '_' || next.is_alphabetic()) =>
            {
                let name_start = start + 1;
                let mut name_end = name_start;
                while let Some(&(i, next)) = chars.peek() {
                    if next == '_' || next.is_alphanumeric() {
                        name_end = i + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let name = &sql[name_start..name_end];
                let index = match names.iter().position(|n| *n == name) {
                    Some(i) => i + 1,
                    None => {
                        let param = params.get(name).ok_or_else(|| {
                            RecordError::validation(format!("no value bound for parameter @{name}"))
                        })?;
                        names.push(name);
                        values.push(&param.value);
                        names.len()
                    }
                };
                out.push('$');
                out.push_str(&index.to_string());
            }
            _ => out.push(c),
        }
    }

    Ok((out, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ParamSet {
        let mut p = ParamSet::new();
        p.add("Id", 7_i32).add("Name", "a").add("Unused", true);
        p
    }

    #[test]
    fn numbers_in_first_use_order() {
        let params = params();
        let (sql, values) =
            to_positional("update t set Name=@Name where Id=@Id", &params).unwrap();
        assert_eq!(sql, "update t set Name=$1 where Id=$2");
        assert_eq!(values, [&Value::Text("a".into()), &Value::Int32(7)]);
    }

    #[test]
    fn repeated_names_share_an_index() {
        let params = params();
        let (sql, values) = to_positional("select @Id, @Name, @Id", &params).unwrap();
        assert_eq!(sql, "select $1, $2, $1");
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn quoted_text_is_left_alone() {
        let params = params();
        let (sql, values) =
            to_positional("select '@Id', \"@Name\", 'it''s @Id' where x=@Id", &params).unwrap();
        assert_eq!(sql, "select '@Id', \"@Name\", 'it''s @Id' where x=$1");
        assert_eq!(values, [&Value::Int32(7)]);
    }

    #[test]
    fn operators_are_not_placeholders() {
        let params = params();
        let (sql, values) = to_positional("select tags @> '{a}' and @ -5", &params).unwrap();
        assert_eq!(sql, "select tags @> '{a}' and @ -5");
        assert!(values.is_empty());
    }

    #[test]
    fn non_ascii_names_are_read_whole() {
        let mut params = ParamSet::new();
        params.add("Größe", 3_i32).add("Gr", 99_i32);
        let (sql, values) =
            to_positional("update t set Größe=@Größe where Gr=@Gr", &params).unwrap();
        assert_eq!(sql, "update t set Größe=$1 where Gr=$2");
        assert_eq!(values, [&Value::Int32(3), &Value::Int32(99)]);

        let mut params = ParamSet::new();
        params.add("Größe", 3_i32);
        let (sql, _) = to_positional("select @Größe", &params).unwrap();
        assert_eq!(sql, "select $1");
    }

    #[test]
    fn unbound_name_is_an_error() {
        let err = to_positional("select @Missing", &params()).unwrap_err();
        assert!(err.is_contract_violation());
    }
}
