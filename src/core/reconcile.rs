use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::core::context::SyncContext;
use crate::core::error::{SyncError, SyncPass};
use crate::core::gap::SyncGap;
use crate::core::types::{InventoryCategory, InventoryCategoryId, Membership, ProductId, WebsiteCategoryId};
use crate::store::EntityStore;

/// Child -> parent lookup over the inventory forest listed at the start of a run.
#[derive(Debug, Clone, Default)]
pub struct ParentIndex {
    parents: HashMap<InventoryCategoryId, Option<InventoryCategoryId>>,
}

impl ParentIndex {
    pub fn from_categories(categories: &[InventoryCategory]) -> Self {
        Self {
            parents: categories.iter().map(|c| (c.id, c.parent)).collect(),
        }
    }

    pub fn parent_of(&self, category: InventoryCategoryId) -> Option<InventoryCategoryId> {
        self.parents.get(&category).copied().flatten()
    }
}

/// Mapped website categories from a product's primary category up to its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorChain {
    /// Nearest first.
    pub ids: Vec<WebsiteCategoryId>,
    /// Set when the walk stopped before reaching a root.
    pub gap: Option<SyncGap>,
}

/// Walk category -> parent -> ... -> root, translating each step through `context`.
///
/// Steps:
/// 1) a category seen twice means the inventory has a cycle: stop (CycleDetected)
/// 2) more than `max_depth` steps: stop (DepthExceeded)
/// 3) a category missing from the context: stop (TruncatedChain)
///
/// In every case the identities collected so far are kept.
pub fn ancestor_chain(
    product: ProductId,
    start: InventoryCategoryId,
    parents: &ParentIndex,
    context: &SyncContext,
    max_depth: usize,
) -> AncestorChain {
    let mut ids = Vec::new();
    let mut visited = HashSet::new();
    let mut cursor = Some(start);

    while let Some(current) = cursor {
        let gap = if !visited.insert(current) {
            Some(SyncGap::CycleDetected { product, at: current })
        } else if ids.len() >= max_depth {
            Some(SyncGap::DepthExceeded { product, depth: max_depth })
        } else {
            match context.get(current) {
                Some(mapped) => {
                    ids.push(mapped);
                    None
                }
                None => Some(SyncGap::TruncatedChain { product, at: current }),
            }
        };

        if gap.is_some() {
            return AncestorChain { ids, gap };
        }
        cursor = parents.parent_of(current);
    }

    AncestorChain { ids, gap: None }
}

/// New membership: everything unmanaged the product already has, plus the chain.
///
/// Managed memberships outside the chain are stale and dropped.
pub fn merge_membership(
    current: &Membership,
    managed: &Membership,
    chain: &[WebsiteCategoryId],
) -> Membership {
    current
        .iter()
        .filter(|id| !managed.contains(id))
        .copied()
        .chain(chain.iter().copied())
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipStats {
    pub scanned: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub gaps: Vec<SyncGap>,
}

/// Run pass 3 over every product that has a primary inventory category.
pub fn reconcile_memberships<S>(
    store: &mut S,
    categories: &[InventoryCategory],
    context: &SyncContext,
    max_depth: usize,
) -> Result<MembershipStats, SyncError>
where
    S: EntityStore + ?Sized,
{
    let store_err = || SyncError::store(SyncPass::Membership);
    let parents = ParentIndex::from_categories(categories);

    //resolved once per run, not per product
    let managed = store.list_managed_website_category_ids().map_err(store_err())?;
    let products = store.list_products_with_primary_category().map_err(store_err())?;

    let mut stats = MembershipStats::default();
    for product in products {
        stats.scanned += 1;

        let chain = ancestor_chain(product.id, product.primary_category, &parents, context, max_depth);
        if let Some(gap) = chain.gap {
            warn!(
                product = %product.id,
                name = %product.name,
                kept = chain.ids.len(),
                "{gap}"
            );
            stats.gaps.push(gap);
        }

        let current = store.get_product_membership(product.id).map_err(store_err())?;
        let next = merge_membership(&current, &managed, &chain.ids);

        if next == current {
            debug!(product = %product.id, "membership up to date");
            stats.unchanged += 1;
            continue;
        }

        store.set_product_membership(product.id, &next).map_err(store_err())?;
        info!(
            product = %product.id,
            name = %product.name,
            inventory = %product.primary_category,
            membership = ?next,
            "updated website categories"
        );
        stats.updated += 1;
    }

    Ok(stats)
}
