use crate::err::GrantErr;
use crate::store::GrantStoreApi;
use crate::types::{GrantChange, GrantKey, SchemeId, TermId, UserId};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// grants kept per user; each user's set sits behind its own shard lock so applies for
/// different users do not contend and an apply for one user is never observed half done
#[derive(Clone, Default)]
pub struct MemoryGrantStore {
    grants: Arc<DashMap<UserId, BTreeSet<GrantKey>>>,
}

impl MemoryGrantStore {
    pub fn new() -> Self {
        Default::default()
    }

    fn prune(&self, user: &UserId) {
        self.grants.remove_if(user, |_, set| set.is_empty());
    }
}

#[async_trait]
impl GrantStoreApi for MemoryGrantStore {
    async fn list_grants<'a>(&'a self, user: &'a UserId) -> Result<BTreeSet<GrantKey>, GrantErr> {
        Ok(self
            .grants
            .get(user)
            .map(|set| set.value().clone())
            .unwrap_or_default())
    }

    async fn grant<'a>(
        &'a self,
        scheme: &'a SchemeId,
        user: &'a UserId,
        term: &'a TermId,
    ) -> Result<(), GrantErr> {
        debug!(%scheme, %user, %term, "grant");
        self.grants
            .entry(*user)
            .or_default()
            .insert((scheme.clone(), *term));
        Ok(())
    }

    async fn revoke<'a>(
        &'a self,
        scheme: &'a SchemeId,
        user: &'a UserId,
        term: &'a TermId,
    ) -> Result<(), GrantErr> {
        debug!(%scheme, %user, %term, "revoke");
        if let Some(mut set) = self.grants.get_mut(user) {
            set.remove(&(scheme.clone(), *term));
        }
        self.prune(user);
        Ok(())
    }

    async fn revoke_all<'a>(&'a self, user: &'a UserId) -> Result<usize, GrantErr> {
        Ok(self
            .grants
            .remove(user)
            .map(|(_, set)| set.len())
            .unwrap_or_default())
    }

    async fn apply<'a>(
        &'a self,
        user: &'a UserId,
        changes: &'a Vec<GrantChange>,
    ) -> Result<(), GrantErr> {
        {
            let mut set = self.grants.entry(*user).or_default();
            for change in changes {
                match change {
                    GrantChange::Grant(scheme, term) => {
                        set.insert((scheme.clone(), *term));
                    }
                    GrantChange::Revoke(scheme, term) => {
                        set.remove(&(scheme.clone(), *term));
                    }
                }
            }
            debug!(%user, changes = changes.len(), granted = set.len(), "applied");
        }
        self.prune(user);
        Ok(())
    }
}
