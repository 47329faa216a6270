// pass 2: mirror inventory parent/child edges onto the mapped website categories
//
// parent(mapped(I)) := mapped(parent(I)), or none when I is a root.
// a parent that is not in the context leaves the website parent untouched,
// and so does a category that would become its own parent.
// current parents come from the context, pass 1 already read them.
use tracing::{debug, error, info, warn};

use crate::core::context::SyncContext;
use crate::core::error::{SyncError, SyncPass};
use crate::core::gap::SyncGap;
use crate::core::types::{InventoryCategory, WebsiteCategoryId};
use crate::store::EntityStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyStats {
    pub parents_set: usize,
    pub parents_cleared: usize,
    pub unchanged: usize,
    pub gaps: Vec<SyncGap>,
}

//what the website parent should become; None means "leave it alone"
fn target_parent(
    category: &InventoryCategory,
    website_id: WebsiteCategoryId,
    context: &SyncContext,
    gaps: &mut Vec<SyncGap>,
) -> Option<Option<WebsiteCategoryId>> {
    let Some(parent) = category.parent else {
        return Some(None);
    };

    match context.get(parent) {
        Some(mapped) if mapped == website_id => {
            warn!(
                inventory = %category.id,
                website = %website_id,
                "category is its own parent, keeping current parent"
            );
            gaps.push(SyncGap::SelfParent { category: category.id });
            None
        }
        Some(mapped) => Some(Some(mapped)),
        None => {
            warn!(
                inventory = %category.id,
                parent = %parent,
                "parent has no mapped website category, keeping current parent"
            );
            gaps.push(SyncGap::MissingParentMapping { category: category.id, parent });
            None
        }
    }
}

/// Run pass 2. Requires `context` to be complete for `categories`.
///
/// Each mapped category's current website parent must have been recorded in
/// `context` by pass 1; the store is only written, never read.
pub fn link_hierarchy<S>(
    store: &mut S,
    categories: &[InventoryCategory],
    context: &mut SyncContext,
) -> Result<HierarchyStats, SyncError>
where
    S: EntityStore + ?Sized,
{
    let mut stats = HierarchyStats::default();

    for category in categories {
        let mapped = context
            .get(category.id)
            .and_then(|w| context.current_parent(w).map(|parent| (w, parent)));
        let Some((website_id, current)) = mapped else {
            error!(
                inventory = %category.id,
                name = %category.name,
                "consistency error: category not in mapping during parent assignment"
            );
            stats.gaps.push(SyncGap::Unmapped { category: category.id });
            continue;
        };

        let Some(target) = target_parent(category, website_id, context, &mut stats.gaps) else {
            continue;
        };

        if current == target {
            debug!(website = %website_id, "parent already in place");
            stats.unchanged += 1;
            continue;
        }

        store
            .update_website_category_parent(website_id, target)
            .map_err(SyncError::store(SyncPass::Hierarchy))?;
        context.record_parent(website_id, target);

        match target {
            Some(parent) => {
                info!(website = %website_id, name = %category.name, parent = %parent, "set website category parent");
                stats.parents_set += 1;
            }
            None => {
                info!(website = %website_id, name = %category.name, "made website category top-level");
                stats.parents_cleared += 1;
            }
        }
    }

    Ok(stats)
}
