// identities and entity records shared by the store and the engine
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! identity {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub fn get(self) -> u32 {
                self.0
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

identity!(
    /// Identity of a category in the authoritative inventory tree.
    InventoryCategoryId,
    "inv"
);
identity!(
    /// Identity of a presentation-facing website category.
    WebsiteCategoryId,
    "web"
);
identity!(ProductId, "product");

/// Membership set of a product. Ordered so comparisons never depend on insertion order.
pub type Membership = BTreeSet<WebsiteCategoryId>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryCategory {
    pub id: InventoryCategoryId,
    pub name: String,
    #[serde(default)]
    pub parent: Option<InventoryCategoryId>,
}

impl InventoryCategory {
    pub fn new(
        id: InventoryCategoryId,
        name: impl Into<String>,
        parent: Option<InventoryCategoryId>,
    ) -> Self {
        Self { id, name: name.into(), parent }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteCategory {
    pub id: WebsiteCategoryId,
    pub name: String,
    #[serde(default)]
    pub parent: Option<WebsiteCategoryId>,
    /// Inventory category this one mirrors. `None` for categories created by other means.
    #[serde(default)]
    pub provenance: Option<InventoryCategoryId>,
}

impl WebsiteCategory {
    pub fn unmanaged(id: WebsiteCategoryId, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), parent: None, provenance: None }
    }

    pub fn is_managed(&self) -> bool {
        self.provenance.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub primary_category: Option<InventoryCategoryId>,
    #[serde(default)]
    pub website_categories: Membership,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        primary_category: Option<InventoryCategoryId>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            primary_category,
            website_categories: Membership::new(),
        }
    }

    pub fn with_membership(mut self, ids: impl IntoIterator<Item = WebsiteCategoryId>) -> Self {
        self.website_categories.extend(ids);
        self
    }
}

/// Product row as returned by the store's primary-category listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRef {
    pub id: ProductId,
    pub name: String,
    pub primary_category: InventoryCategoryId,
}
