//! Statement execution and the connection interface

use serde_json::Map;

use crate::Result;

/// A fetched row: column name to decoded value, in result-set order
pub type Row = Map<String, serde_json::Value>;

/// Tracing target every submitted statement is logged under
pub const SQL_TARGET: &str = "mortar::sql";

/// A live database session builders submit rendered SQL to
///
/// Implementations decide how to reach the server. Builders hold a shared
/// reference, so methods take `&self`.
pub trait Connection {
    /// Run a statement that produces rows
    fn fetch_all(&self, sql: &str) -> Result<Vec<Row>>;

    /// Run a statement that modifies rows, returning how many were affected
    fn execute(&self, sql: &str) -> Result<u64>;
}

impl<C: Connection + ?Sized> Connection for &C {
    fn fetch_all(&self, sql: &str) -> Result<Vec<Row>> {
        (**self).fetch_all(sql)
    }

    fn execute(&self, sql: &str) -> Result<u64> {
        (**self).execute(sql)
    }
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn fetch_all(&self, sql: &str) -> Result<Vec<Row>> {
        (**self).fetch_all(sql)
    }

    fn execute(&self, sql: &str) -> Result<u64> {
        (**self).execute(sql)
    }
}

/// Submit a row-producing statement, logging it
pub(crate) fn fetch_rows(connection: &dyn Connection, sql: &str) -> Result<Vec<Row>> {
    tracing::debug!(target: SQL_TARGET, %sql, "fetching rows");

    match connection.fetch_all(sql) {
        Ok(rows) => {
            tracing::debug!(target: SQL_TARGET, rows = rows.len(), "fetched");
            Ok(rows)
        }
        Err(err) => {
            tracing::warn!(target: SQL_TARGET, %sql, error = %err, "statement failed");
            Err(err)
        }
    }
}

/// Submit a modifying statement, logging it
pub(crate) fn execute_statement(connection: &dyn Connection, sql: &str) -> Result<u64> {
    tracing::debug!(target: SQL_TARGET, %sql, "executing statement");

    match connection.execute(sql) {
        Ok(affected) => {
            tracing::debug!(target: SQL_TARGET, affected, "executed");
            Ok(affected)
        }
        Err(err) => {
            tracing::warn!(target: SQL_TARGET, %sql, error = %err, "statement failed");
            Err(err)
        }
    }
}

#[cfg(feature = "mysql")]
pub mod mysql {
    use std::cell::RefCell;

    use serde_json::Value as JsonValue;
    use sqlx::mysql::{MySqlConnectOptions, MySqlRow};
    use sqlx::{Column, Connection as _, Row as _, TypeInfo};
    use tokio::runtime::Runtime;

    use super::{Connection, Row, SQL_TARGET};
    use crate::config::ConnectionConfig;
    use crate::{Error, Result};

    /// A single MySQL session driven by sqlx
    ///
    /// Statements run to completion on a private current-thread runtime, so
    /// this type must not be used from inside another tokio runtime.
    pub struct MySqlConnection {
        // Dropped before the runtime it was opened on
        inner: RefCell<sqlx::mysql::MySqlConnection>,
        runtime: Runtime,
    }

    impl MySqlConnection {
        /// Open a session using `config`
        pub fn connect(config: &ConnectionConfig) -> Result<Self> {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(sqlx::Error::Io)?;

            let options = MySqlConnectOptions::new()
                .host(&config.host)
                .port(config.port)
                .database(&config.database)
                .username(&config.username)
                .password(&config.password);

            tracing::info!(
                target: SQL_TARGET,
                host = %config.host,
                port = config.port,
                database = %config.database,
                "connecting to MySQL"
            );
            let inner = runtime.block_on(sqlx::mysql::MySqlConnection::connect_with(&options))?;

            Ok(Self {
                inner: RefCell::new(inner),
                runtime,
            })
        }

        /// Open a session from a `mysql://` URL
        pub fn connect_url(url: &str) -> Result<Self> {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(sqlx::Error::Io)?;
            let inner = runtime.block_on(sqlx::mysql::MySqlConnection::connect(url))?;

            Ok(Self {
                inner: RefCell::new(inner),
                runtime,
            })
        }

        /// Close the session cleanly
        pub fn close(self) -> Result<()> {
            let Self { inner, runtime } = self;
            runtime.block_on(inner.into_inner().close())?;
            Ok(())
        }
    }

    impl Connection for MySqlConnection {
        fn fetch_all(&self, sql: &str) -> Result<Vec<Row>> {
            let mut conn = self.inner.borrow_mut();
            // A bare &str carries no arguments, so the statement goes over
            // the text protocol and every value arrives as text
            let rows = self
                .runtime
                .block_on(sqlx::Executor::fetch_all(&mut *conn, sql))
                .map_err(|err| Error::execution_failed(sql, err.to_string()))?;

            Ok(rows.iter().map(decode_row).collect())
        }

        fn execute(&self, sql: &str) -> Result<u64> {
            let mut conn = self.inner.borrow_mut();
            let done = self
                .runtime
                .block_on(sqlx::Executor::execute(&mut *conn, sql))
                .map_err(|err| Error::execution_failed(sql, err.to_string()))?;

            Ok(done.rows_affected())
        }
    }

    fn decode_row(row: &MySqlRow) -> Row {
        let mut decoded = Row::new();

        for column in row.columns() {
            let type_name = column.type_info().name();
            let value = decode_column(row, column.ordinal(), type_name).unwrap_or_else(|err| {
                tracing::warn!(
                    target: SQL_TARGET,
                    column = column.name(),
                    column_type = type_name,
                    error = %err,
                    "could not decode column, using null"
                );
                JsonValue::Null
            });
            decoded.insert(column.name().to_string(), value);
        }

        decoded
    }

    /// How a result column is read out of a text-protocol row
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) enum ColumnDecode {
        Null,
        Bool,
        Signed,
        Unsigned,
        Float,
        Text,
    }

    pub(crate) fn column_decode(type_name: &str) -> ColumnDecode {
        match type_name {
            "NULL" => ColumnDecode::Null,
            "BOOLEAN" => ColumnDecode::Bool,
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => ColumnDecode::Signed,
            "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
            | "BIGINT UNSIGNED" => ColumnDecode::Unsigned,
            "FLOAT" | "DOUBLE" => ColumnDecode::Float,
            // DECIMAL, DATE, DATETIME, TIMESTAMP, TIME and YEAR stay as their text form
            _ => ColumnDecode::Text,
        }
    }

    fn decode_column(
        row: &MySqlRow,
        index: usize,
        type_name: &str,
    ) -> std::result::Result<JsonValue, sqlx::Error> {
        let value = match column_decode(type_name) {
            ColumnDecode::Null => None,
            ColumnDecode::Bool => row.try_get::<Option<bool>, _>(index)?.map(JsonValue::from),
            ColumnDecode::Signed => row.try_get::<Option<i64>, _>(index)?.map(JsonValue::from),
            ColumnDecode::Unsigned => row.try_get::<Option<u64>, _>(index)?.map(JsonValue::from),
            ColumnDecode::Float => row.try_get::<Option<f64>, _>(index)?.map(JsonValue::from),
            ColumnDecode::Text => row
                .try_get_unchecked::<Option<String>, _>(index)?
                .map(JsonValue::from),
        };

        Ok(value.unwrap_or(JsonValue::Null))
    }

    #[cfg(test)]
    mod mysql_tests {
        use super::*;
        use serde_json::json;

        #[test]
        fn test_temporal_columns_decode_as_text() {
            for name in ["DATE", "DATETIME", "TIMESTAMP", "TIME", "YEAR", "DECIMAL"] {
                assert_eq!(column_decode(name), ColumnDecode::Text, "{name}");
            }
            assert_eq!(column_decode("INT UNSIGNED"), ColumnDecode::Unsigned);
            assert_eq!(column_decode("BOOLEAN"), ColumnDecode::Bool);
        }

        // Needs a reachable server configured through MORTAR_DB_*
        #[test]
        #[ignore]
        fn test_live_temporal_values_are_strings() {
            let config = ConnectionConfig::from_env().unwrap();
            let conn = MySqlConnection::connect(&config).unwrap();
            let rows = conn
                .fetch_all(
                    "SELECT CAST('2024-01-02' AS DATE) AS day, \
                     CAST('2024-01-02 03:04:05' AS DATETIME) AS at, \
                     CAST('12:30:00' AS TIME) AS clock, 7 AS n",
                )
                .unwrap();

            assert_eq!(rows[0]["day"], json!("2024-01-02"));
            assert_eq!(rows[0]["at"], json!("2024-01-02 03:04:05"));
            assert_eq!(rows[0]["clock"], json!("12:30:00"));
            assert_eq!(rows[0]["n"], json!(7));
        }
    }
}
