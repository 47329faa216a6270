use std::collections::{BTreeMap, HashSet};

use tracing::trace;

use super::{EntityStore, StoreError, StoreOp, StoreResult};
use crate::core::types::{
    InventoryCategory, InventoryCategoryId, Membership, Product, ProductId, ProductRef,
    WebsiteCategory, WebsiteCategoryId,
};

/// In-memory entity store.
///
/// Backs the CLI (loaded from a snapshot file) and the tests. Every successful
/// write bumps a counter so callers can assert how much a run touched, and any
/// operation can be made to fail with [`MemoryStore::fail_on`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inventory: BTreeMap<InventoryCategoryId, InventoryCategory>,
    website: BTreeMap<WebsiteCategoryId, WebsiteCategory>,
    products: BTreeMap<ProductId, Product>,
    writes: usize,
    faults: HashSet<StoreOp>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        inventory: impl IntoIterator<Item = InventoryCategory>,
        website: impl IntoIterator<Item = WebsiteCategory>,
        products: impl IntoIterator<Item = Product>,
    ) -> Self {
        let mut store = Self::new();
        for c in inventory {
            store.upsert_inventory_category(c);
        }
        for w in website {
            store.insert_website_category(w);
        }
        for p in products {
            store.insert_product(p);
        }
        store
    }

    //fixture mutators: these model edits made outside the engine and are not counted as writes
    pub fn upsert_inventory_category(&mut self, category: InventoryCategory) {
        self.inventory.insert(category.id, category);
    }

    pub fn remove_inventory_category(&mut self, id: InventoryCategoryId) -> Option<InventoryCategory> {
        self.inventory.remove(&id)
    }

    pub fn insert_website_category(&mut self, category: WebsiteCategory) {
        self.website.insert(category.id, category);
    }

    pub fn insert_product(&mut self, product: Product) {
        self.products.insert(product.id, product);
    }

    pub fn website_category(&self, id: WebsiteCategoryId) -> Option<&WebsiteCategory> {
        self.website.get(&id)
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    pub fn inventory_categories(&self) -> impl Iterator<Item = &InventoryCategory> + '_ {
        self.inventory.values()
    }

    pub fn website_categories(&self) -> impl Iterator<Item = &WebsiteCategory> + '_ {
        self.website.values()
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> + '_ {
        self.products.values()
    }

    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn reset_write_count(&mut self) {
        self.writes = 0;
    }

    pub fn fail_on(&mut self, op: StoreOp) {
        self.faults.insert(op);
    }

    pub fn clear_faults(&mut self) {
        self.faults.clear();
    }

    fn check(&self, op: StoreOp) -> StoreResult<()> {
        if self.faults.contains(&op) {
            return Err(StoreError::Fault { op });
        }
        trace!(op = op.as_str(), "store call");
        Ok(())
    }

    fn next_website_id(&self) -> WebsiteCategoryId {
        let last = self.website.keys().next_back().map(|id| id.0).unwrap_or(0);
        WebsiteCategoryId(last + 1)
    }

    fn website_mut(&mut self, id: WebsiteCategoryId) -> StoreResult<&mut WebsiteCategory> {
        self.website
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("website category", id))
    }
}

impl EntityStore for MemoryStore {
    fn list_inventory_categories(&self) -> StoreResult<Vec<InventoryCategory>> {
        self.check(StoreOp::ListInventoryCategories)?;
        Ok(self.inventory.values().cloned().collect())
    }

    fn list_products_with_primary_category(&self) -> StoreResult<Vec<ProductRef>> {
        self.check(StoreOp::ListProducts)?;
        Ok(self
            .products
            .values()
            .filter_map(|p| {
                p.primary_category.map(|primary| ProductRef {
                    id: p.id,
                    name: p.name.clone(),
                    primary_category: primary,
                })
            })
            .collect())
    }

    fn find_website_category_by_provenance(
        &self,
        inventory: InventoryCategoryId,
    ) -> StoreResult<Option<WebsiteCategory>> {
        self.check(StoreOp::FindWebsiteCategoryByProvenance)?;
        Ok(self
            .website
            .values()
            .find(|w| w.provenance == Some(inventory))
            .cloned())
    }

    fn create_website_category(
        &mut self,
        name: &str,
        provenance: InventoryCategoryId,
    ) -> StoreResult<WebsiteCategoryId> {
        self.check(StoreOp::CreateWebsiteCategory)?;
        if let Some(existing) = self.website.values().find(|w| w.provenance == Some(provenance)) {
            return Err(StoreError::rejected(format!(
                "{} already mirrors {provenance}",
                existing.id
            )));
        }

        let id = self.next_website_id();
        self.website.insert(
            id,
            WebsiteCategory {
                id,
                name: name.to_string(),
                parent: None,
                provenance: Some(provenance),
            },
        );
        self.writes += 1;
        Ok(id)
    }

    fn update_website_category_name(
        &mut self,
        id: WebsiteCategoryId,
        name: &str,
    ) -> StoreResult<()> {
        self.check(StoreOp::UpdateWebsiteCategoryName)?;
        self.website_mut(id)?.name = name.to_string();
        self.writes += 1;
        Ok(())
    }

    fn update_website_category_parent(
        &mut self,
        id: WebsiteCategoryId,
        parent: Option<WebsiteCategoryId>,
    ) -> StoreResult<()> {
        self.check(StoreOp::UpdateWebsiteCategoryParent)?;
        if let Some(p) = parent {
            if p == id {
                return Err(StoreError::rejected(format!("{id} cannot be its own parent")));
            }
            if !self.website.contains_key(&p) {
                return Err(StoreError::rejected(format!("parent {p} does not exist")));
            }
        }
        self.website_mut(id)?.parent = parent;
        self.writes += 1;
        Ok(())
    }

    fn list_managed_website_category_ids(&self) -> StoreResult<Membership> {
        self.check(StoreOp::ListManagedWebsiteCategoryIds)?;
        Ok(self
            .website
            .values()
            .filter(|w| w.is_managed())
            .map(|w| w.id)
            .collect())
    }

    fn get_product_membership(&self, product: ProductId) -> StoreResult<Membership> {
        self.check(StoreOp::GetProductMembership)?;
        self.products
            .get(&product)
            .map(|p| p.website_categories.clone())
            .ok_or_else(|| StoreError::not_found("product", product))
    }

    fn set_product_membership(
        &mut self,
        product: ProductId,
        membership: &Membership,
    ) -> StoreResult<()> {
        self.check(StoreOp::SetProductMembership)?;
        if let Some(unknown) = membership.iter().find(|id| !self.website.contains_key(id)) {
            return Err(StoreError::rejected(format!(
                "membership of {product} references unknown {unknown}"
            )));
        }
        let p = self
            .products
            .get_mut(&product)
            .ok_or_else(|| StoreError::not_found("product", product))?;
        p.website_categories = membership.clone();
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inv(id: u32, name: &str, parent: Option<u32>) -> InventoryCategory {
        InventoryCategory::new(InventoryCategoryId(id), name, parent.map(InventoryCategoryId))
    }

    #[test]
    fn create_allocates_after_existing_ids_and_counts_write() {
        let mut store = MemoryStore::new();
        store.insert_website_category(WebsiteCategory::unmanaged(WebsiteCategoryId(10), "Summer Sale"));

        let id = store.create_website_category("Phones", InventoryCategoryId(1)).unwrap();
        assert_eq!(id, WebsiteCategoryId(11));
        assert_eq!(store.write_count(), 1);

        let w = store.website_category(id).unwrap();
        assert_eq!(w.provenance, Some(InventoryCategoryId(1)));
        assert_eq!(w.parent, None);
    }

    #[test]
    fn create_rejects_second_category_with_same_provenance() {
        let mut store = MemoryStore::new();
        store.create_website_category("Phones", InventoryCategoryId(1)).unwrap();

        let err = store.create_website_category("Phones again", InventoryCategoryId(1)).unwrap_err();
        assert!(matches!(err, StoreError::Rejected { .. }));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn listing_products_skips_those_without_primary_category() {
        let store = MemoryStore::from_parts(
            vec![inv(1, "Phones", None)],
            vec![],
            vec![
                Product::new(ProductId(1), "P", Some(InventoryCategoryId(1))),
                Product::new(ProductId(2), "Loose", None),
            ],
        );

        let listed = store.list_products_with_primary_category().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, ProductId(1));
        assert_eq!(listed[0].primary_category, InventoryCategoryId(1));
    }

    #[test]
    fn managed_ids_exclude_unmanaged_categories() {
        let mut store = MemoryStore::new();
        store.insert_website_category(WebsiteCategory::unmanaged(WebsiteCategoryId(1), "Summer Sale"));
        let managed = store.create_website_category("Phones", InventoryCategoryId(5)).unwrap();

        let ids = store.list_managed_website_category_ids().unwrap();
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![managed]);
    }

    #[test]
    fn membership_write_rejects_unknown_categories() {
        let mut store = MemoryStore::from_parts(
            vec![],
            vec![WebsiteCategory::unmanaged(WebsiteCategoryId(1), "Summer Sale")],
            vec![Product::new(ProductId(1), "P", None)],
        );

        let bad: Membership = [WebsiteCategoryId(1), WebsiteCategoryId(99)].into_iter().collect();
        let err = store.set_product_membership(ProductId(1), &bad).unwrap_err();
        assert!(matches!(err, StoreError::Rejected { .. }));
        assert!(store.product(ProductId(1)).unwrap().website_categories.is_empty());
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn parent_update_rejects_missing_parent_and_self_loop() {
        let mut store = MemoryStore::new();
        let a = store.create_website_category("A", InventoryCategoryId(1)).unwrap();

        assert!(store.update_website_category_parent(a, Some(WebsiteCategoryId(42))).is_err());
        assert!(store.update_website_category_parent(a, Some(a)).is_err());
        assert_eq!(store.website_category(a).unwrap().parent, None);
    }

    #[test]
    fn injected_fault_fails_only_the_named_op() {
        let mut store = MemoryStore::from_parts(vec![inv(1, "Phones", None)], vec![], vec![]);
        store.fail_on(StoreOp::CreateWebsiteCategory);

        assert!(store.list_inventory_categories().is_ok());
        let err = store.create_website_category("Phones", InventoryCategoryId(1)).unwrap_err();
        assert_eq!(err, StoreError::Fault { op: StoreOp::CreateWebsiteCategory });

        store.clear_faults();
        assert!(store.create_website_category("Phones", InventoryCategoryId(1)).is_ok());
    }
}
