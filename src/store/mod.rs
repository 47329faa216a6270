//! Entity store contract consumed by the synchronization engine.
//!
//! The engine only ever talks to a store through [`EntityStore`]. Reads take
//! `&self`, writes take `&mut self`; each write is assumed atomic on its own,
//! nothing spans more than one call.

mod memory;

use std::fmt;

use thiserror::Error;

use crate::core::types::{
    InventoryCategory, InventoryCategoryId, Membership, ProductId, ProductRef, WebsiteCategory,
    WebsiteCategoryId,
};

pub use memory::MemoryStore;

/// Errors raised by a store on a read or a write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("write rejected: {message}")]
    Rejected { message: String },

    /// Injected by test stores.
    #[error("injected fault during {op}")]
    Fault { op: StoreOp },
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound { entity, id: id.to_string() }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected { message: message.into() }
    }
}

/// One operation of the store contract, used to name faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListInventoryCategories,
    ListProducts,
    FindWebsiteCategoryByProvenance,
    CreateWebsiteCategory,
    UpdateWebsiteCategoryName,
    UpdateWebsiteCategoryParent,
    ListManagedWebsiteCategoryIds,
    GetProductMembership,
    SetProductMembership,
}

impl StoreOp {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreOp::ListInventoryCategories => "list_inventory_categories",
            StoreOp::ListProducts => "list_products_with_primary_category",
            StoreOp::FindWebsiteCategoryByProvenance => "find_website_category_by_provenance",
            StoreOp::CreateWebsiteCategory => "create_website_category",
            StoreOp::UpdateWebsiteCategoryName => "update_website_category_name",
            StoreOp::UpdateWebsiteCategoryParent => "update_website_category_parent",
            StoreOp::ListManagedWebsiteCategoryIds => "list_managed_website_category_ids",
            StoreOp::GetProductMembership => "get_product_membership",
            StoreOp::SetProductMembership => "set_product_membership",
        }
    }
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait EntityStore {
    fn list_inventory_categories(&self) -> StoreResult<Vec<InventoryCategory>>;

    /// Products whose primary inventory category is set. Others are never returned.
    fn list_products_with_primary_category(&self) -> StoreResult<Vec<ProductRef>>;

    fn find_website_category_by_provenance(
        &self,
        inventory: InventoryCategoryId,
    ) -> StoreResult<Option<WebsiteCategory>>;

    fn create_website_category(
        &mut self,
        name: &str,
        provenance: InventoryCategoryId,
    ) -> StoreResult<WebsiteCategoryId>;

    fn update_website_category_name(&mut self, id: WebsiteCategoryId, name: &str)
    -> StoreResult<()>;

    fn update_website_category_parent(
        &mut self,
        id: WebsiteCategoryId,
        parent: Option<WebsiteCategoryId>,
    ) -> StoreResult<()>;

    /// Every website category carrying a provenance.
    fn list_managed_website_category_ids(&self) -> StoreResult<Membership>;

    fn get_product_membership(&self, product: ProductId) -> StoreResult<Membership>;

    /// Full replace.
    fn set_product_membership(&mut self, product: ProductId, membership: &Membership)
    -> StoreResult<()>;
}
