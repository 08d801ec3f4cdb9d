//! SQL text for the existence check, insert and update.
//!
//! Both the blocking and the async operations render their statements here, so
//! the two paths always send identical SQL.

use crate::builder::SqlBuilder;
use crate::driver::{Driver, IdentityFetch};
use crate::error::{RecordError, RecordResult};
use crate::params::ParamSet;

/// `select count(*) from <table> where k1=<p1> and k2=<p2> ...`
pub fn exists_sql(driver: Driver, table: &str, keys: &[&str]) -> RecordResult<String> {
    if keys.is_empty() {
        return Err(RecordError::MissingKeys(format!(
            "existence check on `{table}` needs at least one key field"
        )));
    }
    let mut builder = SqlBuilder::new();
    for key in keys {
        builder.where_clause(format!("{key}={}", driver.parameter_name(key)));
    }
    Ok(builder.add_template(&format!("select count(*) from {table} /**where**/")))
}

/// Insert every parameter of `params`, in order, reading the identity back as
/// `identity` says.
pub fn insert_sql(
    driver: Driver,
    identity: &IdentityFetch,
    table: &str,
    params: &ParamSet,
) -> RecordResult<String> {
    if params.is_empty() {
        return Err(RecordError::validation(format!(
            "insert into `{table}` has no columns"
        )));
    }
    let mut builder = SqlBuilder::new();
    let placeholders = params
        .names()
        .map(|name| {
            builder.select(name);
            driver.parameter_name(name)
        })
        .collect::<Vec<_>>()
        .join(",");

    let template = match identity {
        IdentityFetch::ScopeIdentity => format!(
            "set nocount on;insert into {table}(/**select**/) values ({placeholders});select SCOPE_IDENTITY() id"
        ),
        IdentityFetch::Returning(column) => {
            format!("insert into {table}(/**select**/) values ({placeholders}) returning {column}")
        }
        IdentityFetch::None => format!("insert into {table}(/**select**/) values ({placeholders})"),
    };
    Ok(builder.add_template(&template))
}

/// `update <table> set f1=<p1>,... where k1=<pk1> and ...`
///
/// Parameters whose name matches a key (ASCII case-insensitively) go to the
/// `where` clause, the rest to `set`. Both clauses must end up non-empty.
pub fn update_sql(
    driver: Driver,
    table: &str,
    params: &ParamSet,
    keys: &[&str],
) -> RecordResult<String> {
    let mut builder = SqlBuilder::new();
    for name in params.names() {
        let fragment = format!("{name}={}", driver.parameter_name(name));
        if keys.iter().any(|key| key.eq_ignore_ascii_case(name)) {
            builder.where_clause(fragment);
        } else {
            builder.set(fragment);
        }
    }
    if !builder.has_where() {
        return Err(RecordError::MissingKeys(format!(
            "update of `{table}` has no key parameter for the where clause"
        )));
    }
    if !builder.has_set() {
        return Err(RecordError::EmptyUpdate(format!(
            "update of `{table}` has no non-key parameter to set"
        )));
    }
    Ok(builder.add_template(&format!("update {table} /**set**/ /**where**/")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_params() -> ParamSet {
        let mut params = ParamSet::new();
        params.add("Name", "a").add("Value", "b");
        params
    }

    #[test]
    fn exists_shape() {
        assert_eq!(
            exists_sql(Driver::SqlServer, "TestEntry", &["Id"]).unwrap(),
            "select count(*) from TestEntry where Id=@Id"
        );
        assert_eq!(
            exists_sql(Driver::Odbc, "t", &["A", "B"]).unwrap(),
            "select count(*) from t where A=?A? and B=?B?"
        );
    }

    #[test]
    fn exists_requires_keys() {
        let err = exists_sql(Driver::SqlServer, "t", &[]).unwrap_err();
        assert!(matches!(err, RecordError::MissingKeys(_)));
    }

    #[test]
    fn insert_scope_identity_shape() {
        let sql = insert_sql(
            Driver::SqlServer,
            &IdentityFetch::ScopeIdentity,
            "TestEntry",
            &entry_params(),
        )
        .unwrap();
        assert_eq!(
            sql,
            "set nocount on;insert into TestEntry(Name,Value) values (@Name,@Value);select SCOPE_IDENTITY() id"
        );
    }

    #[test]
    fn insert_odbc_placeholders() {
        let sql = insert_sql(
            Driver::Odbc,
            &IdentityFetch::ScopeIdentity,
            "t",
            &entry_params(),
        )
        .unwrap();
        assert_eq!(
            sql,
            "set nocount on;insert into t(Name,Value) values (?Name?,?Value?);select SCOPE_IDENTITY() id"
        );
    }

    #[test]
    fn insert_returning_and_plain_shapes() {
        let params = entry_params();
        assert_eq!(
            insert_sql(Driver::Postgres, &IdentityFetch::returning("id"), "t", &params).unwrap(),
            "insert into t(Name,Value) values (@Name,@Value) returning id"
        );
        assert_eq!(
            insert_sql(Driver::Postgres, &IdentityFetch::None, "t", &params).unwrap(),
            "insert into t(Name,Value) values (@Name,@Value)"
        );
    }

    #[test]
    fn insert_rejects_empty_params() {
        let err = insert_sql(Driver::Generic, &IdentityFetch::None, "t", &ParamSet::new())
            .unwrap_err();
        assert!(err.is_contract_violation());
    }

    #[test]
    fn update_shape() {
        let mut params = ParamSet::new();
        params.add("Id", 3_i32).add("Name", "c").add("Value", "b");
        assert_eq!(
            update_sql(Driver::SqlServer, "TestEntry", &params, &["Id"]).unwrap(),
            "update TestEntry set Name=@Name,Value=@Value where Id=@Id"
        );
    }

    #[test]
    fn update_key_match_ignores_case() {
        let mut params = ParamSet::new();
        params.add("Id", 3_i32).add("Region", "eu").add("Name", "c");
        assert_eq!(
            update_sql(Driver::Generic, "t", &params, &["id", "REGION"]).unwrap(),
            "update t set Name=@Name where Id=@Id and Region=@Region"
        );
    }

    #[test]
    fn update_without_keys_fails() {
        let err = update_sql(Driver::Generic, "t", &entry_params(), &["Id"]).unwrap_err();
        assert!(matches!(err, RecordError::MissingKeys(_)));
    }

    #[test]
    fn update_with_only_keys_fails() {
        let mut params = ParamSet::new();
        params.add("Id", 1_i32);
        let err = update_sql(Driver::Generic, "t", &params, &["Id"]).unwrap_err();
        assert!(matches!(err, RecordError::EmptyUpdate(_)));
    }
}
