use crate::err::GrantErr;
use crate::types::{User, UserId};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

pub type UserDirectory = Arc<dyn UserDirectoryApi>;

/// resolves the user whose grants are being viewed or edited
#[async_trait]
pub trait UserDirectoryApi: Send + Sync {
    async fn user<'a>(&'a self, id: &'a UserId) -> Result<Option<User>, GrantErr>;

    async fn resolve<'a>(&'a self, id: &'a UserId) -> Result<User, GrantErr> {
        self.user(id).await?.ok_or(GrantErr::UserNotFound(*id))
    }
}

#[derive(Clone, Default)]
pub struct MemoryUserDirectory {
    users: Arc<DashMap<UserId, User>>,
}

impl MemoryUserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        let directory = Self::default();
        for user in users {
            directory.insert(user);
        }
        directory
    }

    pub fn insert(&self, user: User) {
        self.users.insert(user.id, user);
    }

    pub fn remove(&self, id: &UserId) -> Option<User> {
        self.users.remove(id).map(|(_, user)| user)
    }
}

#[async_trait]
impl UserDirectoryApi for MemoryUserDirectory {
    async fn user<'a>(&'a self, id: &'a UserId) -> Result<Option<User>, GrantErr> {
        Ok(self.users.get(id).map(|user| user.value().clone()))
    }
}
