/*
Snapshot file: the whole entity store as one TOON document.

    inventory_categories  (source of truth, read-only to the engine)
    website_categories    (managed ones carry provenance)
    products              (primary category + website memberships)

Loaded into a MemoryStore for a run, written back after it.
*/
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{InventoryCategory, Product, WebsiteCategory};
use crate::store::MemoryStore;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode snapshot {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("cannot encode snapshot: {0}")]
    Encode(String),

    #[error("invalid snapshot: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub inventory_categories: Vec<InventoryCategory>,
    #[serde(default)]
    pub website_categories: Vec<WebsiteCategory>,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl StoreSnapshot {
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let raw = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot: StoreSnapshot =
            toon_format::decode_default(&raw).map_err(|e| SnapshotError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let encoded =
            toon_format::encode_default(self).map_err(|e| SnapshotError::Encode(e.to_string()))?;
        fs::write(path, encoded).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    //dangling inventory parents and primary categories are allowed: a run reports them as gaps.
    //everything the store itself would reject is not.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut inventory_ids = HashSet::new();
        for c in &self.inventory_categories {
            if !inventory_ids.insert(c.id) {
                return Err(SnapshotError::Invalid(format!("duplicate inventory category {}", c.id)));
            }
        }

        let mut website_ids = HashSet::new();
        let mut provenances = HashSet::new();
        for w in &self.website_categories {
            if !website_ids.insert(w.id) {
                return Err(SnapshotError::Invalid(format!("duplicate website category {}", w.id)));
            }
            if let Some(p) = w.provenance {
                if !provenances.insert(p) {
                    return Err(SnapshotError::Invalid(format!(
                        "more than one website category mirrors {p}"
                    )));
                }
            }
        }
        for w in &self.website_categories {
            if let Some(parent) = w.parent {
                if !website_ids.contains(&parent) {
                    return Err(SnapshotError::Invalid(format!(
                        "{} has unknown parent {parent}",
                        w.id
                    )));
                }
            }
        }

        let mut product_ids = HashSet::new();
        for p in &self.products {
            if !product_ids.insert(p.id) {
                return Err(SnapshotError::Invalid(format!("duplicate product {}", p.id)));
            }
            if let Some(unknown) = p.website_categories.iter().find(|id| !website_ids.contains(id)) {
                return Err(SnapshotError::Invalid(format!(
                    "{} is a member of unknown {unknown}",
                    p.id
                )));
            }
        }
        Ok(())
    }

    pub fn into_store(self) -> MemoryStore {
        MemoryStore::from_parts(self.inventory_categories, self.website_categories, self.products)
    }
}

impl MemoryStore {
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            inventory_categories: self.inventory_categories().cloned().collect(),
            website_categories: self.website_categories().cloned().collect(),
            products: self.products().cloned().collect(),
        }
    }
}
