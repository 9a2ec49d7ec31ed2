//! Common types and traits shared across all query builders

use std::fmt;
use std::str::FromStr;

use crate::util::{self, BACKTICK};
use crate::{Error, IntoOperator, Operator, Result, Value};

/// Where a builder's SQL comes from
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Source {
    /// Accumulated programmatically against this table
    Table(String),
    /// Pre-formed SQL returned verbatim by `build()`
    Raw(String),
}

impl Source {
    pub(crate) fn table(&self) -> &str {
        match self {
            Source::Table(table) => table,
            Source::Raw(_) => "",
        }
    }
}

/// Core trait for all query builders
pub trait Query: Sized {
    /// What `execute()` hands back: rows for SELECT, affected rows otherwise
    type Output;

    /// Render the statement. Pure, so it can be called any number of times.
    ///
    /// Fragments are joined with single spaces. Whitespace inside quoted
    /// values is kept as given rather than collapsed.
    fn build(&self) -> String;

    /// Render, submit to the connection and convert the result
    ///
    /// The builder is consumed, so clause state never outlives the statement
    /// it was accumulated for.
    fn execute(self) -> Result<Self::Output>;

    /// Clear every accumulator, keeping the table binding
    fn reset(self) -> Self;
}

/// How WHERE conditions are connected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Glue {
    #[default]
    And,
    Or,
}

impl Glue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Glue::And => "AND",
            Glue::Or => "OR",
        }
    }
}

impl fmt::Display for Glue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Glue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "AND" => Ok(Glue::And),
            "OR" => Ok(Glue::Or),
            other => Err(Error::InvalidGlue {
                glue: other.to_string(),
            }),
        }
    }
}

/// A validated WHERE predicate
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub glue: Glue,
    pub column: String,
    pub operator: Operator,
    pub matches: Value,
}

impl WhereClause {
    /// Validate and build a predicate. Fails with `InvalidOperator` before
    /// anything is stored.
    pub fn new<O, V>(column: &str, operator: O, matches: V, glue: Glue) -> Result<Self>
    where
        O: IntoOperator,
        V: Into<Value>,
    {
        Ok(Self {
            glue,
            column: column.to_string(),
            operator: operator.into_operator()?,
            matches: matches.into(),
        })
    }

    /// Equality predicate, which needs no validation
    pub fn equals(column: &str, matches: impl Into<Value>, glue: Glue) -> Self {
        Self {
            glue,
            column: column.to_string(),
            operator: Operator::EQ,
            matches: matches.into(),
        }
    }
}

impl fmt::Display for WhereClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            util::escape(&self.column, BACKTICK),
            self.operator,
            self.matches.to_literal()
        )
    }
}

/// Trait for conditions that can be used in WHERE clauses
pub trait IntoCondition {
    /// Validate into a clause, using `glue` unless the condition carries its own
    fn into_condition(self, glue: Glue) -> Result<WhereClause>;
}

// Shorthand equality: where_(("username", "Aberdeener"))
impl<T> IntoCondition for (&str, T)
where
    T: Into<Value>,
{
    fn into_condition(self, glue: Glue) -> Result<WhereClause> {
        Ok(WhereClause::equals(self.0, self.1, glue))
    }
}

// Typed operators: where_(("visits", op::GT, 3))
impl<T> IntoCondition for (&str, Operator, T)
where
    T: Into<Value>,
{
    fn into_condition(self, glue: Glue) -> Result<WhereClause> {
        WhereClause::new(self.0, self.1, self.2, glue)
    }
}

// String operators: where_(("username", "<>", "Tadhg")), or a value and its
// glue when the middle element is not an operator: ("full_name", "Tadhg Boyle", "OR")
impl<T> IntoCondition for (&str, &str, T)
where
    T: Into<Value>,
{
    fn into_condition(self, glue: Glue) -> Result<WhereClause> {
        positional_condition(self.0, self.1, self.2.into(), glue)
    }
}

impl<T> IntoCondition for (&str, String, T)
where
    T: Into<Value>,
{
    fn into_condition(self, glue: Glue) -> Result<WhereClause> {
        positional_condition(self.0, &self.1, self.2.into(), glue)
    }
}

fn positional_condition(column: &str, second: &str, third: Value, glue: Glue) -> Result<WhereClause> {
    if Operator::is_valid(second) {
        return WhereClause::new(column, second, third, glue);
    }

    if let Value::String(keyword) = &third {
        if let Ok(own_glue) = keyword.parse::<Glue>() {
            return Ok(WhereClause::equals(column, second, own_glue));
        }
    }

    // Neither an operator nor a value/glue pair
    WhereClause::new(column, second, third, glue)
}

// Explicit glue: where_many([("a", "=", 1, "AND"), ("b", "=", 2, "OR")])
impl<T, O> IntoCondition for (&str, O, T, &str)
where
    T: Into<Value>,
    O: IntoOperator,
{
    fn into_condition(self, _glue: Glue) -> Result<WhereClause> {
        let glue = self.3.parse()?;
        WhereClause::new(self.0, self.1, self.2, glue)
    }
}

impl IntoCondition for WhereClause {
    fn into_condition(self, _glue: Glue) -> Result<WhereClause> {
        Ok(self)
    }
}

/// Extract the column from a `whereColumn` style call name
pub fn parse_dynamic_column(call: &str) -> Option<String> {
    let column = call.strip_prefix("where")?;
    (!column.is_empty()).then(|| column.to_lowercase())
}

/// WHERE / OR WHERE accumulation shared by SELECT and UPDATE
pub trait HasWhereClauses: Sized {
    /// The builder's clause list, in insertion order
    fn where_clauses_mut(&mut self) -> &mut Vec<WhereClause>;

    /// Add an AND WHERE condition
    ///
    /// # Examples
    /// ```
    /// use mortar_core::{op, IntoCondition, Glue};
    ///
    /// let clause = ("visits", op::GT, 3).into_condition(Glue::And).unwrap();
    /// assert_eq!(clause.to_string(), "`visits` > '3'");
    /// ```
    fn where_<C>(mut self, condition: C) -> Result<Self>
    where
        C: IntoCondition,
    {
        let clause = condition.into_condition(Glue::And)?;
        self.where_clauses_mut().push(clause);
        Ok(self)
    }

    /// Add an OR WHERE condition
    fn or_where<C>(mut self, condition: C) -> Result<Self>
    where
        C: IntoCondition,
    {
        let clause = condition.into_condition(Glue::Or)?;
        self.where_clauses_mut().push(clause);
        Ok(self)
    }

    /// Add several conditions at once, defaulting to AND glue
    ///
    /// Every condition is validated before any is stored.
    fn where_many<I, C>(mut self, conditions: I) -> Result<Self>
    where
        I: IntoIterator<Item = C>,
        C: IntoCondition,
    {
        let clauses = conditions
            .into_iter()
            .map(|condition| condition.into_condition(Glue::And))
            .collect::<Result<Vec<_>>>()?;

        if clauses.is_empty() {
            return Err(Error::invalid_query(
                "where_many requires at least one condition",
            ));
        }

        self.where_clauses_mut().extend(clauses);
        Ok(self)
    }

    /// Add several conditions at once, defaulting to OR glue
    fn or_where_many<I, C>(mut self, conditions: I) -> Result<Self>
    where
        I: IntoIterator<Item = C>,
        C: IntoCondition,
    {
        let clauses = conditions
            .into_iter()
            .map(|condition| condition.into_condition(Glue::Or))
            .collect::<Result<Vec<_>>>()?;

        if clauses.is_empty() {
            return Err(Error::invalid_query(
                "or_where_many requires at least one condition",
            ));
        }

        self.where_clauses_mut().extend(clauses);
        Ok(self)
    }

    /// Add an AND LIKE condition. `%` wildcards must be supplied by the caller.
    fn like(mut self, column: &str, pattern: &str) -> Self {
        self.where_clauses_mut().push(WhereClause {
            glue: Glue::And,
            column: column.to_string(),
            operator: Operator::LIKE,
            matches: pattern.into(),
        });
        self
    }

    /// Add an OR LIKE condition
    fn or_like(mut self, column: &str, pattern: &str) -> Self {
        self.where_clauses_mut().push(WhereClause {
            glue: Glue::Or,
            column: column.to_string(),
            operator: Operator::LIKE,
            matches: pattern.into(),
        });
        self
    }

    /// Add an AND equality condition on `column`
    ///
    /// `Value::Null` renders as `= NULL`, which matches no rows in MySQL.
    fn where_eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.where_clauses_mut()
            .push(WhereClause::equals(column, value, Glue::And));
        self
    }

    /// Resolve a `whereUsername("x")` style call into `where_eq("username", "x")`
    ///
    /// Exactly one argument is accepted.
    fn dynamic_where<I, V>(self, call: &str, args: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let column = parse_dynamic_column(call).ok_or_else(|| {
            Error::dynamic_where(call, "dynamic where calls must start with 'where'")
        })?;

        let mut args = args.into_iter();
        let value = args
            .next()
            .ok_or_else(|| Error::dynamic_where(call, "no value provided to match with"))?;

        if args.next().is_some() {
            return Err(Error::dynamic_where(
                call,
                "dynamic where calls accept exactly one value",
            ));
        }

        Ok(self.where_eq(&column, value))
    }
}

/// A branch condition: a bool, or a closure producing one
pub trait Predicate {
    fn evaluate(self) -> bool;
}

impl Predicate for bool {
    fn evaluate(self) -> bool {
        self
    }
}

impl<F> Predicate for F
where
    F: FnOnce() -> bool,
{
    fn evaluate(self) -> bool {
        self()
    }
}

/// What a branch callback may return: the builder itself, or a fallible result
pub trait IntoBranch<Q> {
    fn into_branch(self) -> Result<Q>;
}

macro_rules! impl_into_branch {
    ($ty:ident) => {
        impl<'c> $crate::builder::common::IntoBranch<$ty<'c>> for $ty<'c> {
            fn into_branch(self) -> $crate::Result<$ty<'c>> {
                Ok(self)
            }
        }

        impl<'c> $crate::builder::common::IntoBranch<$ty<'c>> for $crate::Result<$ty<'c>> {
            fn into_branch(self) -> $crate::Result<$ty<'c>> {
                self
            }
        }
    };
}

pub(crate) use impl_into_branch;

/// Conditional mutation of a builder
///
/// The predicate is evaluated exactly once, and the chosen callback runs
/// before the call returns.
pub trait Conditionable: Query {
    /// Run `on_true` only when `predicate` holds
    fn when<P, F, R>(self, predicate: P, on_true: F) -> Result<Self>
    where
        P: Predicate,
        F: FnOnce(Self) -> R,
        R: IntoBranch<Self>,
    {
        if predicate.evaluate() {
            on_true(self).into_branch()
        } else {
            Ok(self)
        }
    }

    /// Run `on_true` when `predicate` holds, `on_false` otherwise
    fn when_else<P, F, G, R, S>(self, predicate: P, on_true: F, on_false: G) -> Result<Self>
    where
        P: Predicate,
        F: FnOnce(Self) -> R,
        G: FnOnce(Self) -> S,
        R: IntoBranch<Self>,
        S: IntoBranch<Self>,
    {
        if predicate.evaluate() {
            on_true(self).into_branch()
        } else {
            on_false(self).into_branch()
        }
    }

    /// Run `on_true` only when `predicate` does not hold
    fn unless<P, F, R>(self, predicate: P, on_true: F) -> Result<Self>
    where
        P: Predicate,
        F: FnOnce(Self) -> R,
        R: IntoBranch<Self>,
    {
        if predicate.evaluate() {
            Ok(self)
        } else {
            on_true(self).into_branch()
        }
    }
}

impl<Q: Query> Conditionable for Q {}

/// Sort direction for ORDER BY clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// An ORDER BY clause
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByClause {
    pub column: String,
    pub direction: SortDirection,
}

impl fmt::Display for OrderByClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ORDER BY {} {}",
            util::escape(&self.column, BACKTICK),
            self.direction
        )
    }
}
