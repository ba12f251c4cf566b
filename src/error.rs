//! Structured error types for task queries and lifecycle operations.

use serde::Serialize;
use std::fmt;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    InvalidDateFormat,
    UnknownStatus,
    InvalidFieldValue,

    // Context errors
    MissingScopeContext,

    // Not found errors
    RecordNotFound,

    // Internal errors
    DatabaseError,
    InternalError,
}

/// Structured error returned by every public operation.
#[derive(Debug, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct TaskError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl TaskError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
            details: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors

    pub fn invalid_date(field: &str, value: &str, format: &str) -> Self {
        Self::new(
            ErrorCode::InvalidDateFormat,
            format!("Cannot parse '{}' with date format '{}'", value, format),
        )
        .with_field(field)
    }

    pub fn unknown_status(status: &str) -> Self {
        Self::new(
            ErrorCode::UnknownStatus,
            format!("Unknown status: {} (expected active, archived or deleted)", status),
        )
        .with_field("status")
    }

    pub fn invalid_value(field: &str, reason: &str) -> Self {
        Self::new(ErrorCode::InvalidFieldValue, reason).with_field(field)
    }

    pub fn missing_scope() -> Self {
        Self::new(
            ErrorCode::MissingScopeContext,
            "Neither a company nor an account could be resolved for this request",
        )
    }

    pub fn record_not_found(kind: &str, id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::RecordNotFound,
            format!("{} not found: {}", kind, id),
        )
    }

    pub fn database(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, err.to_string())
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InternalError, err.to_string())
    }
}

// Allow using ? with anyhow errors from the store layer
impl From<anyhow::Error> for TaskError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<TaskError>() {
            Ok(task_err) => task_err,
            Err(err) => match err.downcast::<rusqlite::Error>() {
                Ok(sql_err) => TaskError::database(sql_err),
                Err(err) => TaskError::internal(err),
            },
        }
    }
}

impl From<rusqlite::Error> for TaskError {
    fn from(err: rusqlite::Error) -> Self {
        TaskError::database(err)
    }
}

/// Result type for task operations.
pub type TaskResult<T> = std::result::Result<T, TaskError>;
