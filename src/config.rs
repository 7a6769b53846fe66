//! Resource configuration loading.
//!
//! The configuration file is a JSON document listing the pools to serve:
//!
//! ```json
//! {
//!   "resources": [
//!     {"name": "got10", "count": 10, "auth_token": "supersecret0"}
//!   ]
//! }
//! ```
//!
//! `count` is the pool capacity and `auth_token` its shared secret; the wire
//! names are kept for compatibility with existing deployments.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SetupError;
use crate::pool::IndexPool;

/// Root of the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub resources: Vec<ResourceConfig>,
}

/// One configured resource pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub name: String,

    /// Pool capacity. Zero is legal and yields a pool that is permanently
    /// exhausted.
    #[serde(rename = "count")]
    pub capacity: u32,

    #[serde(rename = "auth_token")]
    pub secret: String,
}

impl ServiceConfig {
    /// Read and validate a configuration file. Any failure here is fatal;
    /// the server must not start half-configured.
    pub fn from_path(path: &Path) -> Result<Self, SetupError> {
        let content = std::fs::read_to_string(path).map_err(|source| SetupError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&content).map_err(|source| SetupError::ParseConfig {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Resource names must be unique; the first duplicate aborts startup.
    fn validate(&self) -> Result<(), SetupError> {
        let mut seen = HashSet::new();
        for resource in &self.resources {
            if !seen.insert(resource.name.as_str()) {
                return Err(SetupError::DuplicateResource {
                    name: resource.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Fresh pools for every configured resource, in file order. Recovery
    /// reconciles these against the saved snapshot.
    pub fn build_pools(&self) -> Vec<IndexPool> {
        self.resources
            .iter()
            .map(|r| IndexPool::fresh(&r.name, r.capacity, &r.secret))
            .collect()
    }
}
