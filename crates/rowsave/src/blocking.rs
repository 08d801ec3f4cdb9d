//! Blocking Postgres provider.
//!
//! [`BlockingClient`] owns a current-thread tokio runtime and drives a
//! tokio-postgres connection on it, so it can implement the synchronous
//! [`Executor`] trait. Do not use it from inside another async runtime.
//!
//! # Example
//! ```ignore
//! use rowsave::prelude::*;
//! use rowsave::blocking::BlockingClient;
//!
//! let mut client = BlockingClient::connect(&database_url)?.identity_column("id");
//! let tx = client.transaction()?;
//! tx.save(&entry, &["id"], &SaveOptions::new())?;
//! tx.commit()?;
//! ```

use crate::client::{Executor, pg_execute, pg_scalar};
use crate::driver::{Driver, IdentityFetch};
use crate::error::{RecordError, RecordResult};
use crate::params::ParamSet;
use crate::value::Value;
use tokio::runtime::{Builder, Runtime};

/// A synchronous Postgres connection.
pub struct BlockingClient {
    runtime: Runtime,
    client: tokio_postgres::Client,
    identity: IdentityFetch,
}

impl BlockingClient {
    /// Connect using a libpq-style connection string or URL (no TLS).
    pub fn connect(database_url: &str) -> RecordResult<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| RecordError::Connection(e.to_string()))?;
        let (client, connection) = runtime
            .block_on(tokio_postgres::connect(database_url, tokio_postgres::NoTls))
            .map_err(|e| RecordError::Connection(e.to_string()))?;
        runtime.spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(target: "rowsave", error = %e, "postgres connection error");
            }
        });
        Ok(Self {
            runtime,
            client,
            identity: IdentityFetch::None,
        })
    }

    /// Read generated identities back with `returning <column>`.
    ///
    /// The column must be an integer; see [`crate::WithIdentity`].
    pub fn identity_column(mut self, column: impl Into<String>) -> Self {
        self.identity = IdentityFetch::Returning(column.into());
        self
    }

    /// Run one or more statements without parameters (schema setup, cleanup).
    pub fn batch_execute(&self, sql: &str) -> RecordResult<()> {
        self.runtime
            .block_on(self.client.batch_execute(sql))
            .map_err(RecordError::from_db_error)
    }

    /// Begin a transaction. It rolls back when dropped without [`BlockingTransaction::commit`].
    pub fn transaction(&mut self) -> RecordResult<BlockingTransaction<'_>> {
        let Self {
            runtime,
            client,
            identity,
        } = self;
        let tx = runtime
            .block_on(client.transaction())
            .map_err(RecordError::from_db_error)?;
        Ok(BlockingTransaction {
            runtime,
            tx,
            identity: identity.clone(),
        })
    }
}

impl Executor for BlockingClient {
    fn driver(&self) -> Driver {
        Driver::Postgres
    }

    fn identity(&self) -> IdentityFetch {
        self.identity.clone()
    }

    fn execute_scalar(&self, sql: &str, params: &ParamSet) -> RecordResult<Option<Value>> {
        self.runtime.block_on(pg_scalar(&self.client, sql, params))
    }

    fn execute(&self, sql: &str, params: &ParamSet) -> RecordResult<u64> {
        self.runtime.block_on(pg_execute(&self.client, sql, params))
    }
}

/// A transaction on a [`BlockingClient`].
pub struct BlockingTransaction<'a> {
    runtime: &'a Runtime,
    tx: tokio_postgres::Transaction<'a>,
    identity: IdentityFetch,
}

impl BlockingTransaction<'_> {
    pub fn commit(self) -> RecordResult<()> {
        self.runtime
            .block_on(self.tx.commit())
            .map_err(RecordError::from_db_error)
    }

    pub fn rollback(self) -> RecordResult<()> {
        self.runtime
            .block_on(self.tx.rollback())
            .map_err(RecordError::from_db_error)
    }
}

impl Executor for BlockingTransaction<'_> {
    fn driver(&self) -> Driver {
        Driver::Postgres
    }

    fn identity(&self) -> IdentityFetch {
        self.identity.clone()
    }

    fn execute_scalar(&self, sql: &str, params: &ParamSet) -> RecordResult<Option<Value>> {
        self.runtime.block_on(pg_scalar(&self.tx, sql, params))
    }

    fn execute(&self, sql: &str, params: &ParamSet) -> RecordResult<u64> {
        self.runtime.block_on(pg_execute(&self.tx, sql, params))
    }
}
