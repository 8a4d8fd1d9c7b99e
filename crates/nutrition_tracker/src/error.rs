//! Error taxonomy of the command layer.

use std::fmt;

use fdc_client::FdcError;
use thiserror::Error;

use crate::store::StoreError;

/// Failure reported in a [`Response`](crate::server::Response).
///
/// Collaborator errors are flattened to strings so a response can be cloned
/// and moved across tasks.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid meal index {index}: {meal_count} meal(s) logged today")]
    InvalidMealIndex { index: i64, meal_count: usize },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("food database unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("food database sent an unusable response: {0}")]
    RemoteProtocolError(String),

    #[error("persistence error: {0}")]
    PersistenceError(String),

    #[error("command server is not running")]
    ServerClosed,

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidRequest,
    InvalidMealIndex,
    NotFound,
    RemoteUnavailable,
    RemoteProtocolError,
    PersistenceError,
    ServerClosed,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl CommandError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            CommandError::InvalidMealIndex { .. } => ErrorKind::InvalidMealIndex,
            CommandError::NotFound(_) => ErrorKind::NotFound,
            CommandError::RemoteUnavailable(_) => ErrorKind::RemoteUnavailable,
            CommandError::RemoteProtocolError(_) => ErrorKind::RemoteProtocolError,
            CommandError::PersistenceError(_) => ErrorKind::PersistenceError,
            CommandError::ServerClosed => ErrorKind::ServerClosed,
            CommandError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        CommandError::InvalidRequest(msg.into())
    }
}

impl From<FdcError> for CommandError {
    fn from(err: FdcError) -> Self {
        match err {
            FdcError::NotFound(body) => CommandError::NotFound(format!("remote food: {body}")),
            FdcError::Decode(msg) => CommandError::RemoteProtocolError(msg),
            FdcError::Config(msg) => CommandError::RemoteUnavailable(msg),
            other if other.is_transport() => CommandError::RemoteUnavailable(other.to_string()),
            other => CommandError::RemoteProtocolError(other.to_string()),
        }
    }
}

impl From<StoreError> for CommandError {
    fn from(err: StoreError) -> Self {
        CommandError::PersistenceError(err.to_string())
    }
}

/// Result type alias for command handlers.
pub type CommandResult<T> = Result<T, CommandError>;
