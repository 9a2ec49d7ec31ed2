//! INSERT query builder implementation

use std::fmt;

use super::common::{impl_into_branch, Query, Source};
use crate::executor::{self, Connection};
use crate::util::{self, BACKTICK};
use crate::{Result, Value};

/// Builder for INSERT statements
pub struct InsertQuery<'c> {
    connection: &'c dyn Connection,
    source: Source,
    values: Vec<(String, Value)>,
    on_duplicate: Vec<(String, Value)>,
}

impl<'c> InsertQuery<'c> {
    pub fn new(connection: &'c dyn Connection, table: &str) -> Self {
        Self {
            connection,
            source: Source::Table(table.to_string()),
            values: Vec::new(),
            on_duplicate: Vec::new(),
        }
    }

    /// Wrap a pre-formed INSERT statement; `build()` returns it verbatim
    pub fn raw(connection: &'c dyn Connection, sql: &str) -> Self {
        Self {
            connection,
            source: Source::Raw(sql.to_string()),
            values: Vec::new(),
            on_duplicate: Vec::new(),
        }
    }

    /// Append column/value pairs to the row being inserted
    pub fn insert<I, K, V>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.values
            .extend(row.into_iter().map(|(column, value)| (column.into(), value.into())));
        self
    }

    /// Assignments applied when the row collides with an existing key
    ///
    /// Replaces any pairs set by an earlier call.
    pub fn on_duplicate_key<I, K, V>(mut self, assignments: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.on_duplicate = assignments
            .into_iter()
            .map(|(column, value)| (column.into(), value.into()))
            .collect();
        self
    }

    fn values_fragment(&self) -> String {
        let columns = self
            .values
            .iter()
            .map(|(column, _)| util::escape(column, BACKTICK))
            .collect::<Vec<_>>();
        let values = self
            .values
            .iter()
            .map(|(_, value)| value.to_literal())
            .collect::<Vec<_>>();

        format!("({}) VALUES ({})", columns.join(", "), values.join(", "))
    }

    fn on_duplicate_fragment(&self) -> String {
        if self.on_duplicate.is_empty() {
            return String::new();
        }
        format!(
            "ON DUPLICATE KEY UPDATE {}",
            util::render_assignments(&self.on_duplicate)
        )
    }
}

impl<'c> Query for InsertQuery<'c> {
    type Output = u64;

    fn build(&self) -> String {
        let table = match &self.source {
            Source::Raw(sql) => return sql.clone(),
            Source::Table(table) => table,
        };

        util::assemble([
            format!("INSERT INTO {}", util::escape(table, BACKTICK)),
            self.values_fragment(),
            self.on_duplicate_fragment(),
        ])
    }

    fn execute(self) -> Result<u64> {
        let sql = self.build();
        executor::execute_statement(self.connection, &sql)
    }

    fn reset(self) -> Self {
        Self {
            values: Vec::new(),
            on_duplicate: Vec::new(),
            ..self
        }
    }
}

impl fmt::Display for InsertQuery<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}

impl_into_branch!(InsertQuery);
