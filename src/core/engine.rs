// run driver: mapping -> hierarchy -> membership, each pass a barrier for the next
use tracing::{info, info_span};

use crate::config::SyncConfig;
use crate::core::context::SyncContext;
use crate::core::error::{SyncError, SyncPass};
use crate::core::gap::{GapKind, SyncGap};
use crate::core::linker::link_hierarchy;
use crate::core::mapper::map_categories;
use crate::core::reconcile::reconcile_memberships;
use crate::store::EntityStore;

/// What one run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub inventory_categories: usize,
    pub categories_created: usize,
    pub categories_renamed: usize,
    pub parents_set: usize,
    pub parents_cleared: usize,
    pub products_scanned: usize,
    pub products_updated: usize,
    pub gaps: Vec<SyncGap>,
}

impl SyncReport {
    /// Store writes performed by the run.
    pub fn writes(&self) -> usize {
        self.categories_created
            + self.categories_renamed
            + self.parents_set
            + self.parents_cleared
            + self.products_updated
    }

    pub fn categories_touched(&self) -> usize {
        self.categories_created + self.categories_renamed + self.parents_set + self.parents_cleared
    }

    pub fn gap_count(&self, kind: GapKind) -> usize {
        self.gaps.iter().filter(|g| g.kind() == kind).count()
    }

    pub fn summary(&self) -> String {
        let mut out = format!(
            "{} inventory categories: {} created, {} renamed, {} re-parented, {} made top-level; \
             {} products scanned, {} updated",
            self.inventory_categories,
            self.categories_created,
            self.categories_renamed,
            self.parents_set,
            self.parents_cleared,
            self.products_scanned,
            self.products_updated,
        );
        if !self.gaps.is_empty() {
            out.push_str(&format!(
                "; {} mapping gaps, {} consistency gaps (see log)",
                self.gap_count(GapKind::Mapping),
                self.gap_count(GapKind::Consistency)
            ));
        }
        out
    }

    /// Title and message for the end-user completion notice.
    pub fn notification(&self) -> (&'static str, String) {
        let message = if self.writes() == 0 {
            "Inventory to Website category synchronization has finished. Everything was already up to date.".to_string()
        } else {
            format!(
                "Inventory to Website category synchronization has finished. {} categories and {} products updated.",
                self.categories_touched(),
                self.products_updated
            )
        };
        ("Synchronization Complete", message)
    }
}

/// Synchronize the website tree and product memberships with the inventory tree.
///
/// The mapping context is created here and dropped on return. A store fault in any
/// pass aborts the run; writes already made stay, and a later run converges.
pub fn run_synchronization<S>(store: &mut S, config: &SyncConfig) -> Result<SyncReport, SyncError>
where
    S: EntityStore + ?Sized,
{
    let _span = info_span!("category_sync").entered();
    info!("starting synchronization of inventory categories to website categories");

    let categories = store
        .list_inventory_categories()
        .map_err(SyncError::store(SyncPass::Mapping))?;
    let mut context = SyncContext::new();
    let mut report = SyncReport {
        inventory_categories: categories.len(),
        ..SyncReport::default()
    };

    let mapping = map_categories(store, &categories, &mut context)?;
    report.categories_created = mapping.created;
    report.categories_renamed = mapping.renamed;

    let hierarchy = link_hierarchy(store, &categories, &mut context)?;
    report.parents_set = hierarchy.parents_set;
    report.parents_cleared = hierarchy.parents_cleared;
    report.gaps.extend(hierarchy.gaps);

    let membership = reconcile_memberships(store, &categories, &context, config.max_chain_depth)?;
    report.products_scanned = membership.scanned;
    report.products_updated = membership.updated;
    report.gaps.extend(membership.gaps);

    info!(writes = report.writes(), gaps = report.gaps.len(), "{}", report.summary());
    Ok(report)
}
