//! Execution provider traits.
//!
//! The mapper never talks to a database directly. It renders SQL with named
//! placeholders and hands it, together with a [`ParamSet`], to an executor:
//!
//! - [`Executor`] for blocking callers
//! - [`AsyncExecutor`] for async callers
//!
//! A transaction is passed by using the transaction itself as the executor.
//! `AsyncExecutor` is implemented for `tokio_postgres::Client` and
//! `tokio_postgres::Transaction`; see [`crate::blocking`] for the blocking
//! Postgres provider.

use crate::bind::to_positional;
use crate::driver::{Driver, IdentityFetch};
use crate::error::{RecordError, RecordResult};
use crate::params::ParamSet;
use crate::value::Value;
use std::future::Future;
use tokio_postgres::Row;
use tokio_postgres::types::{ToSql, Type};

/// A blocking connection (or transaction) that runs parameterized SQL.
pub trait Executor {
    /// Driver family; picks the placeholder syntax.
    fn driver(&self) -> Driver;

    /// How inserts read back a generated identity.
    fn identity(&self) -> IdentityFetch {
        self.driver().default_identity()
    }

    /// Run `sql` and return the first column of the first row, if any.
    fn execute_scalar(&self, sql: &str, params: &ParamSet) -> RecordResult<Option<Value>>;

    /// Run `sql` and return the number of affected rows.
    fn execute(&self, sql: &str, params: &ParamSet) -> RecordResult<u64>;
}

/// An async connection (or transaction) that runs parameterized SQL.
///
/// Semantics match [`Executor`]; only the execution model differs.
pub trait AsyncExecutor: Send + Sync {
    /// Driver family; picks the placeholder syntax.
    fn driver(&self) -> Driver;

    /// How inserts read back a generated identity.
    fn identity(&self) -> IdentityFetch {
        self.driver().default_identity()
    }

    /// Run `sql` and return the first column of the first row, if any.
    fn execute_scalar(
        &self,
        sql: &str,
        params: &ParamSet,
    ) -> impl Future<Output = RecordResult<Option<Value>>> + Send;

    /// Run `sql` and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &ParamSet,
    ) -> impl Future<Output = RecordResult<u64>> + Send;
}

impl AsyncExecutor for tokio_postgres::Client {
    fn driver(&self) -> Driver {
        Driver::Postgres
    }

    async fn execute_scalar(&self, sql: &str, params: &ParamSet) -> RecordResult<Option<Value>> {
        pg_scalar(self, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &ParamSet) -> RecordResult<u64> {
        pg_execute(self, sql, params).await
    }
}

impl AsyncExecutor for tokio_postgres::Transaction<'_> {
    fn driver(&self) -> Driver {
        Driver::Postgres
    }

    async fn execute_scalar(&self, sql: &str, params: &ParamSet) -> RecordResult<Option<Value>> {
        pg_scalar(self, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &ParamSet) -> RecordResult<u64> {
        pg_execute(self, sql, params).await
    }
}

pub(crate) async fn pg_scalar<C>(
    client: &C,
    sql: &str,
    params: &ParamSet,
) -> RecordResult<Option<Value>>
where
    C: tokio_postgres::GenericClient + Sync,
{
    let (sql, values) = to_positional(sql, params)?;
    let refs: Vec<&(dyn ToSql + Sync)> = values.iter().map(|v| *v as &(dyn ToSql + Sync)).collect();
    let row = client
        .query_opt(sql.as_str(), &refs)
        .await
        .map_err(RecordError::from_db_error)?;
    match row {
        Some(row) => scalar_from_row(&row),
        None => Ok(None),
    }
}

pub(crate) async fn pg_execute<C>(client: &C, sql: &str, params: &ParamSet) -> RecordResult<u64>
where
    C: tokio_postgres::GenericClient + Sync,
{
    let (sql, values) = to_positional(sql, params)?;
    let refs: Vec<&(dyn ToSql + Sync)> = values.iter().map(|v| *v as &(dyn ToSql + Sync)).collect();
    client
        .execute(sql.as_str(), &refs)
        .await
        .map_err(RecordError::from_db_error)
}

fn scalar_from_row(row: &Row) -> RecordResult<Option<Value>> {
    let Some(column) = row.columns().first() else {
        return Ok(None);
    };
    let name = column.name();
    let ty = column.type_();

    macro_rules! get {
        ($t:ty, $variant:ident) => {
            row.try_get::<_, Option<$t>>(0)
                .map(|v| v.map(Value::$variant))
                .map_err(|e| RecordError::decode(name, e.to_string()))
        };
    }

    if *ty == Type::INT2 {
        get!(i16, Int16)
    } else if *ty == Type::INT4 {
        get!(i32, Int32)
    } else if *ty == Type::INT8 {
        get!(i64, Int64)
    } else if *ty == Type::FLOAT4 {
        get!(f32, Float32)
    } else if *ty == Type::FLOAT8 {
        get!(f64, Float64)
    } else if *ty == Type::BOOL {
        get!(bool, Bool)
    } else if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR {
        get!(String, Text)
    } else if *ty == Type::UUID {
        get!(uuid::Uuid, Uuid)
    } else {
        Err(RecordError::decode(
            name,
            format!("unsupported scalar type {ty}"),
        ))
    }
}

/// Executor adapter that reads generated identities with `returning <column>`.
///
/// The column must hold an integer (`serial`, `bigserial`, identity columns).
/// Any other type (a `uuid` key, say) still gets the row inserted, but the
/// insert then fails with [`RecordError::Decode`] because the id cannot be
/// returned as `i64`.
///
/// ```ignore
/// let conn = WithIdentity::new(&client, "id");
/// let id = conn.insert(&params, "entries").await?;
/// ```
#[derive(Debug)]
pub struct WithIdentity<'a, E: ?Sized> {
    inner: &'a E,
    column: String,
}

impl<'a, E: ?Sized> WithIdentity<'a, E> {
    pub fn new(inner: &'a E, column: impl Into<String>) -> Self {
        Self {
            inner,
            column: column.into(),
        }
    }

    pub fn inner(&self) -> &'a E {
        self.inner
    }
}

impl<E: Executor + ?Sized> Executor for WithIdentity<'_, E> {
    fn driver(&self) -> Driver {
        Executor::driver(self.inner)
    }

    fn identity(&self) -> IdentityFetch {
        IdentityFetch::returning(self.column.as_str())
    }

    fn execute_scalar(&self, sql: &str, params: &ParamSet) -> RecordResult<Option<Value>> {
        Executor::execute_scalar(self.inner, sql, params)
    }

    fn execute(&self, sql: &str, params: &ParamSet) -> RecordResult<u64> {
        Executor::execute(self.inner, sql, params)
    }
}

impl<E: AsyncExecutor + ?Sized> AsyncExecutor for WithIdentity<'_, E> {
    fn driver(&self) -> Driver {
        AsyncExecutor::driver(self.inner)
    }

    fn identity(&self) -> IdentityFetch {
        IdentityFetch::returning(self.column.as_str())
    }

    fn execute_scalar(
        &self,
        sql: &str,
        params: &ParamSet,
    ) -> impl Future<Output = RecordResult<Option<Value>>> + Send {
        AsyncExecutor::execute_scalar(self.inner, sql, params)
    }

    fn execute(
        &self,
        sql: &str,
        params: &ParamSet,
    ) -> impl Future<Output = RecordResult<u64>> + Send {
        AsyncExecutor::execute(self.inner, sql, params)
    }
}
