//! Mortar - Write MySQL queries faster
//!
//! Mortar renders SELECT, INSERT and UPDATE statements from chained builder
//! calls and runs them over a single MySQL connection.
//!
//! ```
//! use mortar::prelude::*;
//! use mortar::{Connection, Mortar, Result, Row, SortDirection};
//!
//! struct Offline;
//!
//! impl Connection for Offline {
//!     fn fetch_all(&self, _sql: &str) -> Result<Vec<Row>> { Ok(Vec::new()) }
//!     fn execute(&self, _sql: &str) -> Result<u64> { Ok(0) }
//! }
//!
//! let db = Mortar::new(Offline);
//! let sql = db
//!     .get_all("users")
//!     .where_(("username", "<>", "Tadhg"))?
//!     .order_by("first_name", SortDirection::Asc)
//!     .limit(5)
//!     .build();
//!
//! assert_eq!(
//!     sql,
//!     "SELECT * FROM `users` WHERE `username` <> 'Tadhg' ORDER BY `first_name` ASC LIMIT 5"
//! );
//! # Ok::<(), mortar::Error>(())
//! ```

pub use mortar_core::*;

use mortar_core::util::WILDCARD;

/// Result of a raw statement run through [`Mortar::execute`]
#[derive(Debug, Clone, PartialEq)]
pub enum RawOutcome {
    /// Rows returned by a SELECT
    Rows(Vec<Row>),
    /// Rows affected by an INSERT or UPDATE
    Affected(u64),
}

impl RawOutcome {
    pub fn rows(self) -> Option<Vec<Row>> {
        match self {
            RawOutcome::Rows(rows) => Some(rows),
            RawOutcome::Affected(_) => None,
        }
    }

    pub fn affected(&self) -> Option<u64> {
        match self {
            RawOutcome::Affected(count) => Some(*count),
            RawOutcome::Rows(_) => None,
        }
    }
}

/// Entry point owning the connection every builder runs against
pub struct Mortar<C: Connection> {
    connection: C,
}

impl<C: Connection> Mortar<C> {
    pub fn new(connection: C) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn into_connection(self) -> C {
        self.connection
    }

    /// SELECT every column from `table`
    pub fn get_all(&self, table: &str) -> SelectQuery<'_> {
        self.get_some(table, [WILDCARD])
    }

    /// SELECT the named columns from `table`
    pub fn get_some<I, S>(&self, table: &str, columns: I) -> SelectQuery<'_>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        SelectQuery::new(&self.connection, table, columns)
    }

    /// INSERT one row of column/value pairs into `table`
    pub fn insert<I, K, V>(&self, table: &str, row: I) -> InsertQuery<'_>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        InsertQuery::new(&self.connection, table).insert(row)
    }

    /// UPDATE `table`, assigning column/value pairs
    pub fn update<I, K, V>(&self, table: &str, values: I) -> UpdateQuery<'_>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        UpdateQuery::new(&self.connection, table).update(values)
    }

    /// Run a hand-written statement, dispatching on its first keyword
    ///
    /// Only SELECT, INSERT and UPDATE are accepted. The statement is sent
    /// verbatim.
    pub fn execute(&self, sql: &str) -> Result<RawOutcome> {
        let token = sql.split_whitespace().next().unwrap_or_default();
        tracing::debug!(target: executor::SQL_TARGET, %token, "dispatching raw statement");

        match token.to_ascii_uppercase().as_str() {
            "SELECT" => SelectQuery::raw(&self.connection, sql)
                .execute()
                .map(RawOutcome::Rows),
            "INSERT" => InsertQuery::raw(&self.connection, sql)
                .execute()
                .map(RawOutcome::Affected),
            "UPDATE" => UpdateQuery::raw(&self.connection, sql)
                .execute()
                .map(RawOutcome::Affected),
            _ => Err(Error::UnsupportedStatement {
                token: token.to_string(),
            }),
        }
    }
}

#[cfg(feature = "mysql")]
impl Mortar<MySqlConnection> {
    /// Connect to MySQL with explicit settings
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        MySqlConnection::connect(config).map(Self::new)
    }

    /// Connect to MySQL using `MORTAR_DB_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::connect(&ConnectionConfig::from_env()?)
    }
}
