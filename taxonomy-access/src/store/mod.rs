use crate::config::StoreConfig;
use crate::err::GrantErr;
use crate::types::{GrantChange, GrantKey, SchemeId, TermId, UserId};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

pub mod mem;

#[cfg(feature = "postgres")]
pub mod postgres;

pub type GrantStore = Arc<dyn GrantStoreApi>;

/// durable set of (scheme, user, term) grants. a row is present or absent, there is no `false` row.
#[async_trait]
pub trait GrantStoreApi: Send + Sync {
    /// create whatever layout the store needs. must be safe to call more than once.
    async fn setup<'a>(&'a self) -> Result<(), GrantErr> {
        Ok(())
    }

    async fn list_grants<'a>(&'a self, user: &'a UserId) -> Result<BTreeSet<GrantKey>, GrantErr>;

    /// ensure the grant exists. granting twice is not an error.
    async fn grant<'a>(
        &'a self,
        scheme: &'a SchemeId,
        user: &'a UserId,
        term: &'a TermId,
    ) -> Result<(), GrantErr>;

    /// ensure the grant does not exist. revoking an absent grant is not an error.
    async fn revoke<'a>(
        &'a self,
        scheme: &'a SchemeId,
        user: &'a UserId,
        term: &'a TermId,
    ) -> Result<(), GrantErr>;

    /// revoke every grant `user` holds, returning how many were removed
    async fn revoke_all<'a>(&'a self, user: &'a UserId) -> Result<usize, GrantErr>;

    /// apply every change for one user.
    ///
    /// This default applies changes one at a time; when one fails the error is a
    /// [`GrantErr::PartialApply`] naming the changes already stored. Stores that support
    /// transactions override it so a failure leaves the pre-apply state.
    async fn apply<'a>(
        &'a self,
        user: &'a UserId,
        changes: &'a Vec<GrantChange>,
    ) -> Result<(), GrantErr> {
        let mut applied = Vec::with_capacity(changes.len());
        for change in changes {
            let result = match change {
                GrantChange::Grant(scheme, term) => self.grant(scheme, user, term).await,
                GrantChange::Revoke(scheme, term) => self.revoke(scheme, user, term).await,
            };
            if let Err(cause) = result {
                return Err(GrantErr::PartialApply {
                    user: *user,
                    applied,
                    failed: change.clone(),
                    cause: Box::new(cause),
                });
            }
            applied.push(change.clone());
        }
        Ok(())
    }
}

/// build the store described by `config` and make sure its layout exists
pub async fn create(config: &StoreConfig) -> Result<GrantStore, GrantErr> {
    let store: GrantStore = match config {
        StoreConfig::Memory => Arc::new(mem::MemoryGrantStore::new()),
        #[cfg(feature = "postgres")]
        StoreConfig::Postgres(config) => {
            Arc::new(postgres::PostgresGrantStore::connect(config).await?)
        }
        #[cfg(not(feature = "postgres"))]
        StoreConfig::Postgres(_) => {
            return Err(GrantErr::msg(
                "postgres store requested but the `postgres` feature is not enabled",
            ))
        }
    };
    store.setup().await?;
    Ok(store)
}
