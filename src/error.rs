//! Error types for the ORM.
//!
//! This module defines all error types using `thiserror`. Definition errors
//! are raised once at schema-registration time and are fatal by design;
//! execution errors carry the driver message and SQLSTATE through unchanged.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrmError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Definition error in model '{model}': {message}")]
    Definition { model: String, message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Execution error: {message}")]
    Execution {
        message: String,
        /// e.g., "23000" for an integrity constraint violation
        sql_state: Option<String>,
    },
}

impl OrmError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a schema definition error for a model.
    pub fn definition(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Definition {
            model: model.into(),
            message: message.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Get the SQLSTATE code for this error, if the driver reported one.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Execution { sql_state, .. } => sql_state.as_deref(),
            _ => None,
        }
    }
}

/// Convert sqlx errors to OrmError without retrying or swallowing anything.
impl From<sqlx::Error> for OrmError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => OrmError::Execution {
                sql_state: db_err.code().map(|c| c.to_string()),
                message: db_err.message().to_string(),
            },
            sqlx::Error::Configuration(msg) => OrmError::config(msg.to_string()),
            other => OrmError::Execution {
                message: other.to_string(),
                sql_state: None,
            },
        }
    }
}

/// Result type alias for ORM operations.
pub type OrmResult<T> = Result<T, OrmError>;
