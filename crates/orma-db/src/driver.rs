//! The driver adapter contract.
//!
//! The runtime owns none of the database transport; each concrete backend
//! implements [`Driver`] and the core calls through it. A driver receives
//! fully-built [`Query`] values and is responsible for execution, parameter
//! binding, and transaction mechanics. All serialization of access to the
//! physical store is the driver's concern; the core holds no locks.

use orma_core::{OrmError, OrmResult};

use crate::query::Query;
use crate::value::Value;

/// A generic result row passed from a driver back to the runtime.
///
/// `Row` holds column names and their corresponding values; hydration
/// accesses them by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a new row from column names and values.
    ///
    /// # Panics
    ///
    /// Panics if the number of columns does not match the number of values.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        assert_eq!(
            columns.len(),
            values.len(),
            "row column count must match value count"
        );
        Self { columns, values }
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the value of the named column, if present.
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }

    /// Returns the value at the given position, if present.
    pub fn value_at(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Returns the value of the named column, or a driver error.
    pub fn get(&self, column: &str) -> OrmResult<&Value> {
        self.value(column)
            .ok_or_else(|| OrmError::DriverError(format!("column '{column}' not found in row")))
    }
}

/// The interface every concrete database backend implements.
///
/// The runtime builds a [`Query`], hands it over, and awaits the result;
/// each call is one short-lived round trip. Write paths are bracketed by
/// `begin_transaction`/`commit` (or `rollback` on failure) through
/// [`with_transaction`](crate::crud::with_transaction), so a driver must
/// make `execute` and `last_insert_id` observe the open transaction.
#[async_trait::async_trait]
pub trait Driver: Send + Sync {
    /// Executes a select and returns all result rows.
    async fn select(&self, query: &Query) -> OrmResult<Vec<Row>>;

    /// Executes an insert, update, or delete. Returns the number of rows
    /// affected.
    async fn execute(&self, query: &Query) -> OrmResult<u64>;

    /// Returns the identifier generated by the most recent insert on this
    /// connection.
    async fn last_insert_id(&self) -> OrmResult<i64>;

    /// Begins a transaction.
    async fn begin_transaction(&self) -> OrmResult<()>;

    /// Commits the current transaction.
    async fn commit(&self) -> OrmResult<()>;

    /// Rolls back the current transaction.
    async fn rollback(&self) -> OrmResult<()>;
}

/// Connection parameters for constructing a concrete driver.
///
/// The runtime never reads these; they exist so applications can describe a
/// backend connection in one backend-agnostic value and hand it to whichever
/// adapter they instantiate.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// The database name or file path.
    pub database: String,
    /// The database host (for network-based backends).
    pub host: Option<String>,
    /// The database port.
    pub port: Option<u16>,
    /// The database user.
    pub user: Option<String>,
    /// The database password.
    pub password: Option<String>,
    /// Additional free-form connection options.
    pub options: std::collections::HashMap<String, String>,
}

impl DriverConfig {
    /// Creates a configuration for a local (file or embedded) database.
    pub fn local(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            host: None,
            port: None,
            user: None,
            password: None,
            options: std::collections::HashMap::new(),
        }
    }

    /// Creates a configuration for a networked database server.
    pub fn server(
        database: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            host: Some(host.into()),
            port: Some(port),
            user: Some(user.into()),
            password: Some(password.into()),
            options: std::collections::HashMap::new(),
        }
    }

    /// Adds a free-form connection option.
    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}
