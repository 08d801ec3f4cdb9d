//! Save / insert / update / existence-check operations.
//!
//! [`RecordExt`] adds them to every blocking [`Executor`], [`AsyncRecordExt`]
//! to every [`AsyncExecutor`]. Both render SQL through [`crate::statements`].
//!
//! `save` is "check, then insert or update": the existence check and the write
//! are two statements on the same executor. Nothing here locks or retries; run
//! `save` inside a transaction if two callers may save the same key at once.

use crate::client::{AsyncExecutor, Executor};
use crate::driver::Driver;
use crate::error::{RecordError, RecordResult};
use crate::params::{ParamSet, build_params};
use crate::record::Record;
use crate::statements::{exists_sql, insert_sql, update_sql};
use crate::value::Value;
use std::future::Future;


/// Optional arguments of `save`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveOptions<'a> {
    table: Option<&'a str>,
    exclude: &'a [&'a str],
}

impl<'a> SaveOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table to write to instead of `Record::TABLE`.
    pub fn table(mut self, table: &'a str) -> Self {
        self.table = Some(table);
        self
    }

    /// Fields that are never sent.
    pub fn exclude(mut self, fields: &'a [&'a str]) -> Self {
        self.exclude = fields;
        self
    }
}

/// Outcome of `save`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Saved {
    /// No row matched the keys; the generated identity, if any.
    Inserted(Option<i64>),
    /// A row matched; the number of rows updated.
    Updated(u64),
}

impl Saved {
    pub fn is_insert(&self) -> bool {
        matches!(self, Saved::Inserted(_))
    }

    /// Generated id for inserts, affected rows for updates.
    pub fn value(&self) -> Option<i64> {
        match *self {
            Saved::Inserted(id) => id,
            Saved::Updated(rows) => i64::try_from(rows).ok(),
        }
    }
}

fn log_sql(op: &'static str, table: &str, sql: &str, params: &ParamSet) {
    tracing::debug!(
        target: "rowsave.sql",
        op,
        table,
        param_count = params.len(),
        sql = %sql,
    );
}

fn count_exists(scalar: Option<Value>) -> RecordResult<bool> {
    match scalar {
        None | Some(Value::Null) => Ok(false),
        Some(v) => v
            .as_i64()
            .map(|count| count > 0)
            .ok_or_else(|| RecordError::decode("count", format!("not a row count: {v:?}"))),
    }
}

fn identity_from(scalar: Option<Value>) -> RecordResult<Option<i64>> {
    match scalar {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| RecordError::decode("id", format!("not an integer identity: {v:?}"))),
    }
}

struct ExistsStatement {
    sql: String,
    params: ParamSet,
    table: String,
}

fn prepare_exists<R: Record>(
    driver: Driver,
    record: &R,
    keys: &[&str],
    table: Option<&str>,
) -> RecordResult<ExistsStatement> {
    let table = table.unwrap_or(R::TABLE);
    let sql = exists_sql(driver, table, keys)?;
    // The record itself is the parameter source: every field, nothing skipped.
    let params = build_params(record, &[], &[]);
    Ok(ExistsStatement {
        sql,
        params,
        table: table.to_string(),
    })
}

/// Blocking operations on any [`Executor`].
pub trait RecordExt: Executor {
    /// Whether a row with the record's key values exists in `table`
    /// (default `R::TABLE`). Fails if `keys` is empty.
    fn check_exists<R: Record>(
        &self,
        record: &R,
        keys: &[&str],
        table: Option<&str>,
    ) -> RecordResult<bool> {
        let stmt = prepare_exists(Executor::driver(self), record, keys, table)?;
        log_sql("check_exists", &stmt.table, &stmt.sql, &stmt.params);
        let scalar = Executor::execute_scalar(self, &stmt.sql, &stmt.params)?;
        count_exists(scalar)
    }

    /// Insert every parameter as a column; returns the generated identity, if
    /// the executor's identity step yields one.
    fn insert(&self, params: &ParamSet, table: &str) -> RecordResult<Option<i64>> {
        let identity = Executor::identity(self);
        let sql = insert_sql(Executor::driver(self), &identity, table, params)?;
        log_sql("insert", table, &sql, params);
        if identity.yields_scalar() {
            identity_from(Executor::execute_scalar(self, &sql, params)?)
        } else {
            Executor::execute(self, &sql, params)?;
            Ok(None)
        }
    }

    /// Update the row matched by the key parameters; returns affected rows.
    fn update(&self, params: &ParamSet, keys: &[&str], table: &str) -> RecordResult<u64> {
        let sql = update_sql(Executor::driver(self), table, params, keys)?;
        log_sql("update", table, &sql, params);
        Executor::execute(self, &sql, params)
    }

    /// Insert `record` if no row matches its keys, update it otherwise.
    fn save<R: Record>(
        &self,
        record: &R,
        keys: &[&str],
        options: &SaveOptions<'_>,
    ) -> RecordResult<Saved> {
        let table = options.table.unwrap_or(R::TABLE);
        let params = build_params(record, keys, options.exclude);
        if RecordExt::check_exists(self, record, keys, Some(table))? {
            tracing::debug!(target: "rowsave", table, "save: row exists, updating");
            RecordExt::update(self, &params, keys, table).map(Saved::Updated)
        } else {
            tracing::debug!(target: "rowsave", table, "save: no row, inserting");
            RecordExt::insert(self, &params, table).map(Saved::Inserted)
        }
    }
}

impl<E: Executor + ?Sized> RecordExt for E {}

/// Async operations on any [`AsyncExecutor`].
///
/// The only suspension points are the calls into the executor.
pub trait AsyncRecordExt: AsyncExecutor {
    /// See [`RecordExt::check_exists`].
    fn check_exists<R: Record>(
        &self,
        record: &R,
        keys: &[&str],
        table: Option<&str>,
    ) -> impl Future<Output = RecordResult<bool>> + Send {
        let prepared = prepare_exists(AsyncExecutor::driver(self), record, keys, table);
        async move {
            let stmt = prepared?;
            log_sql("check_exists", &stmt.table, &stmt.sql, &stmt.params);
            let scalar = AsyncExecutor::execute_scalar(self, &stmt.sql, &stmt.params).await?;
            count_exists(scalar)
        }
    }

    /// See [`RecordExt::insert`].
    fn insert(
        &self,
        params: &ParamSet,
        table: &str,
    ) -> impl Future<Output = RecordResult<Option<i64>>> + Send {
        async move {
            let identity = AsyncExecutor::identity(self);
            let sql = insert_sql(AsyncExecutor::driver(self), &identity, table, params)?;
            log_sql("insert", table, &sql, params);
            if identity.yields_scalar() {
                identity_from(AsyncExecutor::execute_scalar(self, &sql, params).await?)
            } else {
                AsyncExecutor::execute(self, &sql, params).await?;
                Ok(None)
            }
        }
    }

    /// See [`RecordExt::update`].
    fn update(
        &self,
        params: &ParamSet,
        keys: &[&str],
        table: &str,
    ) -> impl Future<Output = RecordResult<u64>> + Send {
        async move {
            let sql = update_sql(AsyncExecutor::driver(self), table, params, keys)?;
            log_sql("update", table, &sql, params);
            AsyncExecutor::execute(self, &sql, params).await
        }
    }

    /// See [`RecordExt::save`].
    fn save<R: Record>(
        &self,
        record: &R,
        keys: &[&str],
        options: &SaveOptions<'_>,
    ) -> impl Future<Output = RecordResult<Saved>> + Send {
        let table = options.table.unwrap_or(R::TABLE).to_string();
        let params = build_params(record, keys, options.exclude);
        let exists = prepare_exists(AsyncExecutor::driver(self), record, keys, Some(&table));
        async move {
            let stmt = exists?;
            log_sql("check_exists", &stmt.table, &stmt.sql, &stmt.params);
            let found =
                count_exists(AsyncExecutor::execute_scalar(self, &stmt.sql, &stmt.params).await?)?;
            if found {
                tracing::debug!(target: "rowsave", table = %table, "save: row exists, updating");
                AsyncRecordExt::update(self, &params, keys, &table)
                    .await
                    .map(Saved::Updated)
            } else {
                tracing::debug!(target: "rowsave", table = %table, "save: no row, inserting");
                AsyncRecordExt::insert(self, &params, &table)
                    .await
                    .map(Saved::Inserted)
            }
        }
    }
}

impl<E: AsyncExecutor + ?Sized> AsyncRecordExt for E {}
