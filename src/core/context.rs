// run-scoped inventory -> website mapping
use std::collections::HashMap;

use thiserror::Error;

use crate::core::types::{InventoryCategoryId, WebsiteCategoryId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("{inventory} is already mapped to {existing}, refusing to remap to {requested}")]
    MappingAlreadyExists {
        inventory: InventoryCategoryId,
        existing: WebsiteCategoryId,
        requested: WebsiteCategoryId,
    },
}

/// Mapping built by one synchronization run and dropped with it.
//1. Each inventory category maps to at most one website category.
//2. Re-inserting an identical pair is a no-op; a different target is an error.
//3. Lookups are O(1) average, coverage is checked by the passes.
//4. `parents` holds the website parent last seen or written for each mapped category,
//   so later passes never re-read it from the store.
#[derive(Debug, Clone, Default)]
pub struct SyncContext {
    maps_to: HashMap<InventoryCategoryId, WebsiteCategoryId>,
    parents: HashMap<WebsiteCategoryId, Option<WebsiteCategoryId>>,
}

impl SyncContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        inventory: InventoryCategoryId,
        website: WebsiteCategoryId,
    ) -> Result<(), ContextError> {
        match self.maps_to.get(&inventory).copied() {
            None => {
                self.maps_to.insert(inventory, website);
                Ok(())
            }
            Some(existing) if existing == website => Ok(()),
            Some(existing) => Err(ContextError::MappingAlreadyExists {
                inventory,
                existing,
                requested: website,
            }),
        }
    }

    pub fn get(&self, inventory: InventoryCategoryId) -> Option<WebsiteCategoryId> {
        self.maps_to.get(&inventory).copied()
    }

    pub fn record_parent(&mut self, website: WebsiteCategoryId, parent: Option<WebsiteCategoryId>) {
        self.parents.insert(website, parent);
    }

    /// Outer `None`: the category's parent was never recorded this run.
    pub fn current_parent(&self, website: WebsiteCategoryId) -> Option<Option<WebsiteCategoryId>> {
        self.parents.get(&website).copied()
    }

    pub fn contains(&self, inventory: InventoryCategoryId) -> bool {
        self.maps_to.contains_key(&inventory)
    }

    pub fn len(&self) -> usize {
        self.maps_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps_to.is_empty()
    }

    //sorted by inventory id, for reports
    pub fn iter(&self) -> impl Iterator<Item = (InventoryCategoryId, WebsiteCategoryId)> + '_ {
        let mut pairs: Vec<_> = self.maps_to.iter().map(|(&i, &w)| (i, w)).collect();
        pairs.sort_unstable();
        pairs.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup_and_unmapped_none() {
        let mut ctx = SyncContext::new();

        ctx.insert(InventoryCategoryId(1), WebsiteCategoryId(10)).unwrap();
        ctx.insert(InventoryCategoryId(2), WebsiteCategoryId(20)).unwrap();

        assert_eq!(ctx.get(InventoryCategoryId(1)), Some(WebsiteCategoryId(10)));
        assert_eq!(ctx.get(InventoryCategoryId(2)), Some(WebsiteCategoryId(20)));
        assert_eq!(ctx.get(InventoryCategoryId(3)), None);

        assert!(ctx.contains(InventoryCategoryId(1)));
        assert!(!ctx.contains(InventoryCategoryId(3)));
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn identical_reinsert_is_idempotent() {
        let mut ctx = SyncContext::new();
        ctx.insert(InventoryCategoryId(1), WebsiteCategoryId(10)).unwrap();
        ctx.insert(InventoryCategoryId(1), WebsiteCategoryId(10)).unwrap();
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn rejects_remap_to_different_website_category() {
        let mut ctx = SyncContext::new();
        ctx.insert(InventoryCategoryId(1), WebsiteCategoryId(10)).unwrap();

        let err = ctx.insert(InventoryCategoryId(1), WebsiteCategoryId(11)).unwrap_err();
        match err {
            ContextError::MappingAlreadyExists { inventory, existing, requested } => {
                assert_eq!(inventory, InventoryCategoryId(1));
                assert_eq!(existing, WebsiteCategoryId(10));
                assert_eq!(requested, WebsiteCategoryId(11));
            }
        }
        assert_eq!(ctx.get(InventoryCategoryId(1)), Some(WebsiteCategoryId(10)));
    }

    #[test]
    fn recorded_parent_distinguishes_top_level_from_unknown() {
        let mut ctx = SyncContext::new();
        assert_eq!(ctx.current_parent(WebsiteCategoryId(10)), None);

        ctx.record_parent(WebsiteCategoryId(10), None);
        assert_eq!(ctx.current_parent(WebsiteCategoryId(10)), Some(None));

        ctx.record_parent(WebsiteCategoryId(10), Some(WebsiteCategoryId(7)));
        assert_eq!(ctx.current_parent(WebsiteCategoryId(10)), Some(Some(WebsiteCategoryId(7))));
    }

    #[test]
    fn iter_is_sorted_by_inventory_id() {
        let mut ctx = SyncContext::new();
        ctx.insert(InventoryCategoryId(3), WebsiteCategoryId(1)).unwrap();
        ctx.insert(InventoryCategoryId(1), WebsiteCategoryId(2)).unwrap();

        let keys: Vec<_> = ctx.iter().map(|(i, _)| i.0).collect();
        assert_eq!(keys, vec![1, 3]);
    }
}
