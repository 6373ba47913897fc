use crate::catalog::{CategoryDef, MemoryCatalog};
use crate::err::GrantErr;
use crate::scheme::MemorySchemeRegistry;
use crate::types::{CategoryId, Scheme, User};
use crate::user::MemoryUserDirectory;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// environment variable naming the config file when none is passed explicitly
pub const CONFIG_ENV: &str = "TAXONOMY_ACCESS_CONFIG";

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AccessConfig {
    /// categories shown in the matrix, in display order
    #[serde(default)]
    pub vocabularies: Vec<CategoryId>,
    /// reject a submission naming pairs that no longer exist instead of skipping them
    #[serde(default)]
    pub strict_submissions: bool,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub catalog: CatalogSeed,
    #[serde(default)]
    pub schemes: Vec<Scheme>,
    #[serde(default)]
    pub users: Vec<User>,
}

impl AccessConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, GrantErr> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GrantErr> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(yaml.as_str())
    }

    /// load from the file named by [`CONFIG_ENV`]
    pub fn from_env() -> Result<Self, GrantErr> {
        let path = std::env::var(CONFIG_ENV)
            .map_err(|_| GrantErr::msg(format!("{} is not set", CONFIG_ENV)))?;
        Self::load(path)
    }

    pub fn memory_catalog(&self) -> MemoryCatalog {
        MemoryCatalog::from_defs(&self.catalog.categories)
    }

    pub fn memory_schemes(&self) -> MemorySchemeRegistry {
        MemorySchemeRegistry::new(self.schemes.clone())
    }

    pub fn memory_users(&self) -> MemoryUserDirectory {
        MemoryUserDirectory::new(self.users.clone())
    }
}

/// where grants are persisted
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum StoreConfig {
    #[default]
    Memory,
    Postgres(PostgresConfig),
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub url: String,
    #[serde(default = "PostgresConfig::default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "PostgresConfig::default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl PostgresConfig {
    pub fn new<S: ToString>(url: S) -> Self {
        Self {
            url: url.to_string(),
            max_connections: Self::default_max_connections(),
            acquire_timeout_secs: Self::default_acquire_timeout_secs(),
        }
    }

    fn default_max_connections() -> u32 {
        5
    }

    fn default_acquire_timeout_secs() -> u64 {
        30
    }
}

/// categories served by the in-memory catalog
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub categories: Vec<CategoryDef>,
}
