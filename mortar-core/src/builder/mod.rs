//! Query builder module

pub mod common;
pub mod insert;
pub mod join;
pub mod select;
pub mod update;

// Re-export types from submodules
pub use common::{
    Conditionable, Glue, HasWhereClauses, IntoBranch, IntoCondition, OrderByClause, Predicate,
    Query, SortDirection, WhereClause,
};
pub use insert::InsertQuery;
pub use join::{Join, JoinClause, JoinKind, JoinRegistry};
pub use select::SelectQuery;
pub use update::UpdateQuery;
