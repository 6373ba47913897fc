use crate::types::{GrantChange, SchemeId, TermId, UserId};
use std::error::Error as StdError;
use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GrantErr {
    #[error("user '{0}' not found")]
    UserNotFound(UserId),

    #[error("{0} not found")]
    NotFound(String),

    #[error("grant storage unavailable: {0}")]
    StorageUnavailable(Arc<dyn StdError + Send + Sync>),

    #[error("submission references {} (scheme, term) pair(s) that no longer exist", unknown.len())]
    InvalidSubmission { unknown: Vec<(SchemeId, TermId)> },

    /// a non-atomic apply failed midway. `applied` were written before `failed` was attempted.
    #[error("apply for user '{user}' failed at {failed} after {} change(s) were stored: {cause}", applied.len())]
    PartialApply {
        user: UserId,
        applied: Vec<GrantChange>,
        failed: GrantChange,
        cause: Box<GrantErr>,
    },

    /// an atomic apply failed and nothing was written
    #[error("apply for user '{user}' rolled back, no changes were stored: {cause}")]
    RolledBack { user: UserId, cause: Box<GrantErr> },

    #[error("configuration error: {0}")]
    Config(Arc<serde_yaml::Error>),

    #[error(transparent)]
    IoErr(Arc<std::io::Error>),

    #[error("{0}")]
    Msg(String),
}

impl GrantErr {
    pub fn not_found<S>(what: S) -> Self
    where
        S: ToString,
    {
        Self::NotFound(what.to_string())
    }

    pub fn unavailable<M>(msg: M) -> Self
    where
        M: ToString,
    {
        let err: Box<dyn StdError + Send + Sync> = msg.to_string().into();
        Self::StorageUnavailable(Arc::from(err))
    }

    pub fn msg(err: impl Display) -> Self {
        Self::Msg(err.to_string())
    }

    pub fn rolled_back(user: UserId, cause: GrantErr) -> Self {
        Self::RolledBack {
            user,
            cause: Box::new(cause),
        }
    }

    /// storage failures are worth retrying; everything else will fail the same way again
    pub fn is_retryable(&self) -> bool {
        match self {
            GrantErr::StorageUnavailable(_) => true,
            GrantErr::PartialApply { cause, .. } | GrantErr::RolledBack { cause, .. } => {
                cause.is_retryable()
            }
            _ => false,
        }
    }

    /// `false` only when a failure may have left some of the requested changes stored.
    pub fn nothing_changed(&self) -> bool {
        match self {
            GrantErr::PartialApply { applied, .. } => applied.is_empty(),
            _ => true,
        }
    }
}

impl From<std::io::Error> for GrantErr {
    fn from(value: std::io::Error) -> Self {
        Self::IoErr(Arc::new(value))
    }
}

impl From<serde_yaml::Error> for GrantErr {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Config(Arc::new(value))
    }
}

impl From<&str> for GrantErr {
    fn from(err: &str) -> Self {
        Self::Msg(err.to_string())
    }
}

impl From<String> for GrantErr {
    fn from(err: String) -> Self {
        Self::Msg(err)
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for GrantErr {
    fn from(value: sqlx::Error) -> Self {
        GrantErr::StorageUnavailable(Arc::new(value))
    }
}
