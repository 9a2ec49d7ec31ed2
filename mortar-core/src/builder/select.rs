//! SELECT query builder implementation

use std::fmt;

use serde::de::DeserializeOwned;

use super::common::{
    impl_into_branch, HasWhereClauses, OrderByClause, Query, SortDirection, Source, WhereClause,
};
use super::join::{Join, JoinClause, JoinKind, JoinRegistry};
use crate::cast::{apply_casts, CastType};
use crate::executor::{self, Connection, Row};
use crate::util::{self, BACKTICK, WILDCARD};
use crate::{Error, Result};

/// Builder for SELECT statements
///
/// # Examples
/// ```
/// use mortar_core::{Connection, Query, Result, Row, SelectQuery};
///
/// struct Offline;
///
/// impl Connection for Offline {
///     fn fetch_all(&self, _sql: &str) -> Result<Vec<Row>> { Ok(Vec::new()) }
///     fn execute(&self, _sql: &str) -> Result<u64> { Ok(0) }
/// }
///
/// let conn = Offline;
/// let query = SelectQuery::new(&conn, "users", ["username", "full_name"]).limit(5);
/// assert_eq!(query.build(), "SELECT `username`, `full_name` FROM `users` LIMIT 5");
/// ```
pub struct SelectQuery<'c> {
    connection: &'c dyn Connection,
    source: Source,
    columns: Vec<String>,
    joins: Vec<JoinClause>,
    where_clauses: Vec<WhereClause>,
    group_by: Option<String>,
    order_by: Option<OrderByClause>,
    limit: Option<u64>,
    casts: Vec<(String, CastType)>,
}

impl<'c> SelectQuery<'c> {
    /// Start a SELECT of `columns` from `table`
    pub fn new<I, S>(connection: &'c dyn Connection, table: &str, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::empty(connection, Source::Table(table.to_string())).columns(columns)
    }

    /// Wrap a pre-formed SELECT statement; `build()` returns it verbatim
    pub fn raw(connection: &'c dyn Connection, sql: &str) -> Self {
        Self::empty(connection, Source::Raw(sql.to_string()))
    }

    fn empty(connection: &'c dyn Connection, source: Source) -> Self {
        Self {
            connection,
            source,
            columns: Vec::new(),
            joins: Vec::new(),
            where_clauses: Vec::new(),
            group_by: None,
            order_by: None,
            limit: None,
            casts: Vec::new(),
        }
    }

    /// Add columns to the selection, skipping any already selected
    ///
    /// Selecting `*` replaces every named column, and named columns are
    /// ignored once `*` is selected.
    pub fn columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            if name == WILDCARD {
                self.columns.clear();
                self.columns.push(WILDCARD.to_string());
            } else if !self.columns.iter().any(|c| c == name || c == WILDCARD) {
                self.columns.push(name.to_string());
            }
        }
        self
    }

    pub fn column(self, name: &str) -> Self {
        self.columns([name])
    }

    /// Selected columns, in render order
    pub fn selected(&self) -> &[String] {
        &self.columns
    }

    pub fn inner_join<F>(self, configure: F) -> Result<Self>
    where
        F: FnOnce(&mut Join<'_>) -> Result<()>,
    {
        self.add_join(JoinKind::Inner, configure)
    }

    pub fn left_outer_join<F>(self, configure: F) -> Result<Self>
    where
        F: FnOnce(&mut Join<'_>) -> Result<()>,
    {
        self.add_join(JoinKind::LeftOuter, configure)
    }

    pub fn right_outer_join<F>(self, configure: F) -> Result<Self>
    where
        F: FnOnce(&mut Join<'_>) -> Result<()>,
    {
        self.add_join(JoinKind::RightOuter, configure)
    }

    pub fn full_outer_join<F>(self, configure: F) -> Result<Self>
    where
        F: FnOnce(&mut Join<'_>) -> Result<()>,
    {
        self.add_join(JoinKind::FullOuter, configure)
    }

    pub fn outer_join<F>(self, configure: F) -> Result<Self>
    where
        F: FnOnce(&mut Join<'_>) -> Result<()>,
    {
        self.add_join(JoinKind::Outer, configure)
    }

    /// Alias for `inner_join`
    pub fn join<F>(self, configure: F) -> Result<Self>
    where
        F: FnOnce(&mut Join<'_>) -> Result<()>,
    {
        self.add_join(JoinKind::Inner, configure)
    }

    /// Join using a keyword such as `"LEFT OUTER"`
    pub fn join_with<F>(self, keyword: &str, configure: F) -> Result<Self>
    where
        F: FnOnce(&mut Join<'_>) -> Result<()>,
    {
        let kind = keyword.parse()?;
        self.add_join(kind, configure)
    }

    fn add_join<F>(mut self, kind: JoinKind, configure: F) -> Result<Self>
    where
        F: FnOnce(&mut Join<'_>) -> Result<()>,
    {
        // Joins recorded before a failure are discarded with the builder
        let mut join = Join::new(kind, &mut self);
        configure(&mut join)?;
        Ok(self)
    }

    pub fn group_by(mut self, column: &str) -> Self {
        self.group_by = Some(column.to_string());
        self
    }

    /// Set the ORDER BY clause, replacing any earlier one
    pub fn order_by(mut self, column: &str, direction: SortDirection) -> Self {
        self.order_by = Some(OrderByClause {
            column: column.to_string(),
            direction,
        });
        self
    }

    pub fn order_by_asc(self, column: &str) -> Self {
        self.order_by(column, SortDirection::Asc)
    }

    pub fn order_by_desc(self, column: &str) -> Self {
        self.order_by(column, SortDirection::Desc)
    }

    pub fn limit(mut self, count: u64) -> Self {
        self.limit = Some(count);
        self
    }

    /// Coerce `column` in every fetched row
    pub fn cast(mut self, column: &str, cast: CastType) -> Self {
        match self.casts.iter_mut().find(|(name, _)| name == column) {
            Some(existing) => existing.1 = cast,
            None => self.casts.push((column.to_string(), cast)),
        }
        self
    }

    pub fn casts<I, S>(self, casts: I) -> Self
    where
        I: IntoIterator<Item = (S, CastType)>,
        S: AsRef<str>,
    {
        casts
            .into_iter()
            .fold(self, |query, (column, cast)| query.cast(column.as_ref(), cast))
    }

    /// Execute and deserialize every row into `T`
    pub fn fetch<T>(self) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        self.execute()?
            .into_iter()
            .map(|row| serde_json::from_value(serde_json::Value::Object(row)).map_err(Error::from))
            .collect()
    }

    fn select_fragment(&self) -> String {
        if self.columns.is_empty() {
            return format!("SELECT {}", WILDCARD);
        }
        format!("SELECT {}", util::escape_all(&self.columns, BACKTICK).join(", "))
    }
}

impl JoinRegistry for SelectQuery<'_> {
    fn primary_table(&self) -> &str {
        self.source.table()
    }

    fn register_join(&mut self, join: JoinClause) {
        self.joins.push(join);
    }
}

impl HasWhereClauses for SelectQuery<'_> {
    fn where_clauses_mut(&mut self) -> &mut Vec<WhereClause> {
        &mut self.where_clauses
    }
}

impl<'c> Query for SelectQuery<'c> {
    type Output = Vec<Row>;

    fn build(&self) -> String {
        let table = match &self.source {
            Source::Raw(sql) => return sql.clone(),
            Source::Table(table) => table,
        };

        util::assemble([
            self.select_fragment(),
            format!("FROM {}", util::escape(table, BACKTICK)),
            util::render_join_clause(&self.joins),
            util::render_where_clause(&self.where_clauses),
            self.group_by
                .as_ref()
                .map(|column| format!("GROUP BY {}", util::escape(column, BACKTICK)))
                .unwrap_or_default(),
            self.order_by
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            self.limit
                .map(|count| format!("LIMIT {}", count))
                .unwrap_or_default(),
        ])
    }

    fn execute(self) -> Result<Vec<Row>> {
        let sql = self.build();
        let mut rows = executor::fetch_rows(self.connection, &sql)?;
        apply_casts(&mut rows, &self.casts)?;
        Ok(rows)
    }

    fn reset(self) -> Self {
        Self::empty(self.connection, self.source)
    }
}

impl fmt::Display for SelectQuery<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}

impl_into_branch!(SelectQuery);
