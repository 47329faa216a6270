// pass 1: mirror every inventory category as a provenance-tagged website category
use tracing::{debug, info};

use crate::core::context::SyncContext;
use crate::core::error::{SyncError, SyncPass};
use crate::core::types::{InventoryCategory, WebsiteCategoryId};
use crate::store::EntityStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MappingStats {
    pub created: usize,
    pub renamed: usize,
    /// Found with provenance and matching name.
    pub unchanged: usize,
}

/// Find the website category mirroring `category`, creating it if there is none.
///
/// A category already in `context` is answered from it without touching the
/// store, so each inventory category costs at most one provenance lookup per run.
/// The website parent seen by that lookup is recorded for the hierarchy pass.
pub fn resolve_or_create<S>(
    store: &mut S,
    category: &InventoryCategory,
    context: &mut SyncContext,
    stats: &mut MappingStats,
) -> Result<WebsiteCategoryId, SyncError>
where
    S: EntityStore + ?Sized,
{
    if let Some(cached) = context.get(category.id) {
        return Ok(cached);
    }

    let (website_id, parent) = match store
        .find_website_category_by_provenance(category.id)
        .map_err(SyncError::store(SyncPass::Mapping))?
    {
        None => {
            let id = store
                .create_website_category(&category.name, category.id)
                .map_err(SyncError::store(SyncPass::Mapping))?;
            info!(
                website = %id,
                inventory = %category.id,
                name = %category.name,
                "created website category"
            );
            stats.created += 1;
            (id, None)
        }
        Some(existing) if existing.name != category.name => {
            store
                .update_website_category_name(existing.id, &category.name)
                .map_err(SyncError::store(SyncPass::Mapping))?;
            info!(
                website = %existing.id,
                from = %existing.name,
                to = %category.name,
                "renamed website category"
            );
            stats.renamed += 1;
            (existing.id, existing.parent)
        }
        Some(existing) => {
            debug!(website = %existing.id, inventory = %category.id, "website category up to date");
            stats.unchanged += 1;
            (existing.id, existing.parent)
        }
    };

    context
        .insert(category.id, website_id)
        .map_err(SyncError::context(SyncPass::Mapping))?;
    context.record_parent(website_id, parent);
    Ok(website_id)
}

/// Run pass 1 over `categories`. Order does not matter.
pub fn map_categories<S>(
    store: &mut S,
    categories: &[InventoryCategory],
    context: &mut SyncContext,
) -> Result<MappingStats, SyncError>
where
    S: EntityStore + ?Sized,
{
    let mut stats = MappingStats::default();
    for category in categories {
        resolve_or_create(store, category, context, &mut stats)?;
    }
    debug!(mapped = context.len(), "mapping pass complete");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{InventoryCategoryId, WebsiteCategory};
    use crate::store::{MemoryStore, StoreOp};

    fn inv(id: u32, name: &str, parent: Option<u32>) -> InventoryCategory {
        InventoryCategory::new(InventoryCategoryId(id), name, parent.map(InventoryCategoryId))
    }

    #[test]
    fn creates_missing_category_with_provenance_and_records_it() {
        let mut store = MemoryStore::new();
        let mut ctx = SyncContext::new();
        let mut stats = MappingStats::default();
        let phones = inv(2, "Phones", Some(1));

        let id = resolve_or_create(&mut store, &phones, &mut ctx, &mut stats).unwrap();

        let w = store.website_category(id).unwrap();
        assert_eq!(w.name, "Phones");
        assert_eq!(w.provenance, Some(InventoryCategoryId(2)));
        assert_eq!(ctx.get(InventoryCategoryId(2)), Some(id));
        assert_eq!(stats.created, 1);
    }

    #[test]
    fn cached_category_does_not_touch_the_store() {
        let mut store = MemoryStore::new();
        let mut ctx = SyncContext::new();
        let mut stats = MappingStats::default();
        let phones = inv(2, "Phones", None);

        let first = resolve_or_create(&mut store, &phones, &mut ctx, &mut stats).unwrap();

        //every lookup would now fail, so a second answer must come from the context
        store.fail_on(StoreOp::FindWebsiteCategoryByProvenance);
        let second = resolve_or_create(&mut store, &phones, &mut ctx, &mut stats).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn renames_only_when_name_differs() {
        let mut store = MemoryStore::new();
        store.insert_website_category(WebsiteCategory {
            id: WebsiteCategoryId(7),
            name: "Phones".into(),
            parent: None,
            provenance: Some(InventoryCategoryId(2)),
        });

        let mut ctx = SyncContext::new();
        let stats = map_categories(&mut store, &[inv(2, "Phones", None)], &mut ctx).unwrap();
        assert_eq!(stats, MappingStats { created: 0, renamed: 0, unchanged: 1 });
        assert_eq!(store.write_count(), 0);

        let mut ctx = SyncContext::new();
        let stats = map_categories(&mut store, &[inv(2, "Mobile Phones", None)], &mut ctx).unwrap();
        assert_eq!(stats.renamed, 1);
        assert_eq!(store.website_category(WebsiteCategoryId(7)).unwrap().name, "Mobile Phones");
        assert_eq!(ctx.get(InventoryCategoryId(2)), Some(WebsiteCategoryId(7)));
    }

    #[test]
    fn context_covers_every_listed_category() {
        let mut store = MemoryStore::new();
        let mut ctx = SyncContext::new();
        let cats = vec![inv(3, "Cases", Some(2)), inv(1, "Electronics", None), inv(2, "Phones", Some(1))];

        map_categories(&mut store, &cats, &mut ctx).unwrap();

        assert_eq!(ctx.len(), cats.len());
        assert_eq!(store.website_categories().count(), 3);
    }

    #[test]
    fn records_the_parent_seen_by_the_lookup() {
        let mut store = MemoryStore::new();
        store.insert_website_category(WebsiteCategory::unmanaged(WebsiteCategoryId(50), "Catalog"));
        store.insert_website_category(WebsiteCategory {
            id: WebsiteCategoryId(7),
            name: "Phones".into(),
            parent: Some(WebsiteCategoryId(50)),
            provenance: Some(InventoryCategoryId(2)),
        });

        let mut ctx = SyncContext::new();
        map_categories(&mut store, &[inv(2, "Phones", None), inv(3, "Cases", None)], &mut ctx).unwrap();

        assert_eq!(ctx.current_parent(WebsiteCategoryId(7)), Some(Some(WebsiteCategoryId(50))));
        let created = ctx.get(InventoryCategoryId(3)).unwrap();
        assert_eq!(ctx.current_parent(created), Some(None));
    }

    #[test]
    fn store_fault_aborts_with_mapping_pass() {
        let mut store = MemoryStore::new();
        store.fail_on(StoreOp::CreateWebsiteCategory);
        let mut ctx = SyncContext::new();

        let err = map_categories(&mut store, &[inv(1, "Electronics", None)], &mut ctx).unwrap_err();
        assert_eq!(err.pass(), SyncPass::Mapping);
        assert!(ctx.is_empty());
    }
}
