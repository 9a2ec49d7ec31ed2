//! UPDATE query builder module

use std::fmt;

use super::common::{impl_into_branch, HasWhereClauses, Query, Source, WhereClause};
use crate::executor::{self, Connection};
use crate::util::{self, BACKTICK};
use crate::{Error, Result, Value};

/// UPDATE query builder
///
/// `execute()` refuses to run without a WHERE clause unless `all_rows()` was
/// called first.
pub struct UpdateQuery<'c> {
    connection: &'c dyn Connection,
    source: Source,
    assignments: Vec<(String, Value)>,
    where_clauses: Vec<WhereClause>,
    all_rows: bool,
}

impl<'c> UpdateQuery<'c> {
    pub fn new(connection: &'c dyn Connection, table: &str) -> Self {
        Self::empty(connection, Source::Table(table.to_string()))
    }

    /// Wrap a pre-formed UPDATE statement; `build()` returns it verbatim
    pub fn raw(connection: &'c dyn Connection, sql: &str) -> Self {
        Self::empty(connection, Source::Raw(sql.to_string()))
    }

    fn empty(connection: &'c dyn Connection, source: Source) -> Self {
        Self {
            connection,
            source,
            assignments: Vec::new(),
            where_clauses: Vec::new(),
            all_rows: false,
        }
    }

    /// Append `column = value` assignments
    pub fn update<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.assignments
            .extend(values.into_iter().map(|(column, value)| (column.into(), value.into())));
        self
    }

    /// Allow `execute()` to run with no WHERE clause
    pub fn all_rows(mut self) -> Self {
        self.all_rows = true;
        self
    }
}

impl HasWhereClauses for UpdateQuery<'_> {
    fn where_clauses_mut(&mut self) -> &mut Vec<WhereClause> {
        &mut self.where_clauses
    }
}

impl<'c> Query for UpdateQuery<'c> {
    type Output = u64;

    fn build(&self) -> String {
        let table = match &self.source {
            Source::Raw(sql) => return sql.clone(),
            Source::Table(table) => table,
        };

        util::assemble([
            format!("UPDATE {} SET", util::escape(table, BACKTICK)),
            util::render_assignments(&self.assignments),
            util::render_where_clause(&self.where_clauses),
        ])
    }

    fn execute(self) -> Result<u64> {
        if let Source::Table(table) = &self.source {
            if self.where_clauses.is_empty() && !self.all_rows {
                return Err(Error::UnconstrainedUpdate {
                    table: table.clone(),
                });
            }
        }

        let sql = self.build();
        executor::execute_statement(self.connection, &sql)
    }

    fn reset(self) -> Self {
        Self::empty(self.connection, self.source)
    }
}

impl fmt::Display for UpdateQuery<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}

impl_into_branch!(UpdateQuery);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::mock::RecordingConnection;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_update_with_where() {
        let conn = RecordingConnection::new();
        let query = UpdateQuery::new(&conn, "users")
            .update([("username", "thebossman")])
            .where_(("username", "<>", "Aberdeener"))
            .unwrap();

        assert_eq!(
            query.build(),
            "UPDATE `users` SET `username` = 'thebossman' WHERE `username` <> 'Aberdeener'"
        );
    }

    #[test]
    fn test_multiple_assignments_and_or_where() {
        let conn = RecordingConnection::new();
        let query = UpdateQuery::new(&conn, "users")
            .update([("visits", Value::from(0)), ("banned", Value::from(true))])
            .where_eq("id", 1)
            .or_like("email", "%@spam.example");

        assert_eq!(
            query.build(),
            "UPDATE `users` SET `visits` = '0', `banned` = '1' WHERE `id` = '1' OR `email` LIKE '%@spam.example'"
        );
    }

    #[test]
    fn test_unconstrained_update_is_refused() {
        let conn = RecordingConnection::with_affected(12);
        let err = UpdateQuery::new(&conn, "users")
            .update([("visits", 0)])
            .execute()
            .unwrap_err();

        assert!(matches!(err, Error::UnconstrainedUpdate { ref table } if table == "users"));
        assert!(conn.statements().is_empty());
    }

    #[test]
    fn test_all_rows_opt_in() {
        let conn = RecordingConnection::with_affected(12);
        let affected = UpdateQuery::new(&conn, "users")
            .update([("visits", 0)])
            .all_rows()
            .execute()
            .unwrap();

        assert_eq!(affected, 12);
        assert_eq!(conn.statements(), vec!["UPDATE `users` SET `visits` = '0'"]);
    }

    #[test]
    fn test_raw_update_is_not_guarded() {
        let conn = RecordingConnection::with_affected(2);
        let affected = UpdateQuery::raw(&conn, "UPDATE users SET visits = 0")
            .execute()
            .unwrap();
        assert_eq!(affected, 2);
    }

    #[test]
    fn test_reset_clears_opt_in() {
        let conn = RecordingConnection::new();
        let query = UpdateQuery::new(&conn, "users")
            .update([("visits", 0)])
            .all_rows()
            .reset();

        assert_eq!(query.build(), "UPDATE `users` SET");
        assert!(matches!(query.execute(), Err(Error::UnconstrainedUpdate { .. })));
    }
}
