//! Driver families and their SQL dialect differences.

/// Driver family behind an execution provider.
///
/// Only two things depend on it: placeholder syntax and the default way a
/// generated identity is read back after an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Driver {
    /// Native SQL Server client
    SqlServer,
    /// ODBC connection; placeholders are written as `?name?`
    Odbc,
    /// tokio-postgres; `@name` placeholders are renumbered to `$n` at bind time
    Postgres,
    /// Any other provider using `@name` placeholders
    Generic,
}

impl Driver {
    pub fn is_odbc(self) -> bool {
        matches!(self, Driver::Odbc)
    }

    /// Render `name` as a placeholder for this driver.
    pub fn parameter_name(self, name: &str) -> String {
        parameter_name(self, name)
    }

    /// Identity step used when the provider doesn't pick one.
    pub fn default_identity(self) -> IdentityFetch {
        match self {
            Driver::SqlServer | Driver::Odbc => IdentityFetch::ScopeIdentity,
            Driver::Postgres | Driver::Generic => IdentityFetch::None,
        }
    }
}

/// Render `name` as a placeholder: `?name?` for ODBC, `@name` for everything else.
pub fn parameter_name(driver: Driver, name: &str) -> String {
    if driver.is_odbc() {
        format!("?{name}?")
    } else {
        format!("@{name}")
    }
}

/// How an insert reads back the database-generated identity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IdentityFetch {
    /// Plain insert; no identity is returned.
    #[default]
    None,
    /// SQL Server batch: `set nocount on;insert ...;select SCOPE_IDENTITY() id`
    ScopeIdentity,
    /// `insert ... returning <column>`
    Returning(String),
}

impl IdentityFetch {
    pub fn returning(column: impl Into<String>) -> Self {
        IdentityFetch::Returning(column.into())
    }

    /// Whether the insert statement yields a scalar.
    pub fn yields_scalar(&self) -> bool {
        !matches!(self, IdentityFetch::None)
    }
}
