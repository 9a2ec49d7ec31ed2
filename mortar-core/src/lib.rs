//! Mortar Core - A fluent MySQL statement builder
//!
//! This crate renders SELECT, INSERT and UPDATE statements from chained
//! builder calls and submits them through a [`Connection`].

pub mod builder;
pub mod cast;
pub mod config;
pub mod error;
pub mod executor;
pub mod operator;
pub mod util;
pub mod value;

// Re-export main types
pub use builder::{
    Conditionable, Glue, HasWhereClauses, InsertQuery, IntoBranch, IntoCondition, Join,
    JoinClause, JoinKind, Predicate, Query, SelectQuery, SortDirection, UpdateQuery, WhereClause,
};
pub use cast::CastType;
pub use config::ConnectionConfig;
pub use error::{Error, Result};
pub use executor::{Connection, Row};
pub use operator::{op, IntoOperator, Operator};
pub use value::Value;

#[cfg(feature = "mysql")]
pub use executor::mysql::MySqlConnection;

/// Traits needed to call the chained builder methods
pub mod prelude {
    pub use crate::builder::{Conditionable, HasWhereClauses, Query};
}
