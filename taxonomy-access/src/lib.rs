//! Per-user taxonomy term access grants.
//!
//! An administrator edits one user's grants as a matrix of every configured taxonomy term
//! crossed with every access scheme. Grants are stored sparsely: a (scheme, user, term) row
//! exists when granted and is absent otherwise.
//!
//! The [`controller::GrantMatrixController`] composes four narrow seams:
//! [`catalog::TermCatalogApi`], [`scheme::SchemeRegistryApi`], [`user::UserDirectoryApi`] and
//! [`store::GrantStoreApi`].

pub mod catalog;
pub mod config;
pub mod controller;
pub mod err;
pub mod matrix;
pub mod scheme;
pub mod store;
pub mod types;
pub mod user;

#[cfg(feature = "cli")]
pub mod cli;

use crate::config::AccessConfig;
use crate::controller::GrantMatrixController;
use crate::err::GrantErr;
use std::sync::Arc;

pub use crate::controller::ApplyReport;
pub use crate::matrix::{GrantMatrix, MatrixView, Submission};
pub use crate::types::{GrantChange, SchemeId, TermId, UserId};

/// wire a controller from config: in-memory catalog, schemes and users seeded from `config`,
/// grants in whichever store `config.store` names
pub async fn controller(config: &AccessConfig) -> Result<GrantMatrixController, GrantErr> {
    let store = store::create(&config.store).await?;
    Ok(GrantMatrixController::new(
        Arc::new(config.memory_catalog()),
        Arc::new(config.memory_schemes()),
        Arc::new(config.memory_users()),
        store,
        config,
    ))
}
