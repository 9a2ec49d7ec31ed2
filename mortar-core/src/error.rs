//! Error types for Mortar

use thiserror::Error;

/// The main error type for Mortar operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A statement was submitted but the driver rejected it
    #[error("Failed to execute `{sql}`: {message}")]
    ExecutionFailed { sql: String, message: String },

    /// WHERE operator outside the supported set
    #[error("Invalid WHERE clause operator. Operator: {operator}")]
    InvalidOperator { operator: String },

    /// WHERE glue other than AND / OR
    #[error("Invalid WHERE clause glue. Glue: {glue}")]
    InvalidGlue { glue: String },

    /// Malformed `whereColumn(value)` shorthand call
    #[error("Invalid dynamic where call `{call}`: {reason}")]
    DynamicWhereCall { call: String, reason: String },

    /// JOIN keyword outside the supported set
    #[error("Invalid JOIN clause keyword. Keyword: {keyword}")]
    InvalidJoinKeyword { keyword: String },

    /// `on()` was called on a join before `table()`
    #[error("JOIN table must be set before running on()")]
    JoinNotConfigured,

    /// Raw statement with a leading keyword Mortar cannot dispatch
    #[error("Unsupported start of MySQL query string. Token: {token}")]
    UnsupportedStatement { token: String },

    /// Invalid query configuration
    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    /// UPDATE without WHERE that was not opted into with `all_rows()`
    #[error("UPDATE on `{table}` has no WHERE clause; call all_rows() to update every row")]
    UnconstrainedUpdate { table: String },

    /// A fetched value could not be coerced to the requested type
    #[error("Cannot cast column '{column}' value {value} to {target}")]
    CastFailed {
        column: String,
        target: String,
        value: String,
    },

    /// Unknown cast type name
    #[error("Unknown cast type '{name}'")]
    InvalidCastType { name: String },

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience Result type for Mortar operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new invalid query error
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Create a new execution failure carrying the driver diagnostic
    pub fn execution_failed(sql: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            sql: sql.into(),
            message: message.into(),
        }
    }

    /// Create a new dynamic where call error
    pub fn dynamic_where(call: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DynamicWhereCall {
            call: call.into(),
            reason: reason.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error was raised by input validation rather than the driver
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidOperator { .. }
                | Error::InvalidGlue { .. }
                | Error::DynamicWhereCall { .. }
                | Error::InvalidJoinKeyword { .. }
                | Error::JoinNotConfigured
                | Error::InvalidQuery { .. }
        )
    }
}
