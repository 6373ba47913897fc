use crate::err::GrantErr;
use crate::types::{Scheme, SchemeId};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

pub type SchemeRegistry = Arc<dyn SchemeRegistryApi>;

/// enumerates the access schemes currently configured, in display order
#[async_trait]
pub trait SchemeRegistryApi: Send + Sync {
    async fn schemes<'a>(&'a self) -> Result<Vec<Scheme>, GrantErr>;

    async fn scheme<'a>(&'a self, id: &'a SchemeId) -> Result<Option<Scheme>, GrantErr> {
        Ok(self
            .schemes()
            .await?
            .into_iter()
            .find(|scheme| scheme.id == *id))
    }
}

#[derive(Clone, Default)]
pub struct MemorySchemeRegistry {
    schemes: Arc<RwLock<Vec<Scheme>>>,
}

impl MemorySchemeRegistry {
    pub fn new(schemes: Vec<Scheme>) -> Self {
        Self {
            schemes: Arc::new(RwLock::new(schemes)),
        }
    }

    /// replaces a scheme with the same id or appends a new one
    pub async fn put(&self, scheme: Scheme) {
        let mut schemes = self.schemes.write().await;
        match schemes.iter_mut().find(|s| s.id == scheme.id) {
            Some(existing) => *existing = scheme,
            None => schemes.push(scheme),
        }
    }

    pub async fn remove(&self, id: &SchemeId) {
        self.schemes.write().await.retain(|s| s.id != *id);
    }
}

#[async_trait]
impl SchemeRegistryApi for MemorySchemeRegistry {
    async fn schemes<'a>(&'a self) -> Result<Vec<Scheme>, GrantErr> {
        Ok(self.schemes.read().await.clone())
    }
}
