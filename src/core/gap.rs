// non-fatal findings of a run
use std::fmt;

use crate::core::types::{InventoryCategoryId, ProductId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapKind {
    /// A reference could not be translated through the mapping.
    Mapping,
    /// A category listed in the mapping pass is missing from the context: an engine bug.
    Consistency,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncGap {
    /// Linker: parent of `category` has no mapped website category. Parent left as is.
    MissingParentMapping {
        category: InventoryCategoryId,
        parent: InventoryCategoryId,
    },
    /// Linker: `category` is its own inventory parent. Parent left as is.
    SelfParent { category: InventoryCategoryId },
    /// Linker: `category` itself is absent from the context.
    Unmapped { category: InventoryCategoryId },
    /// Reconciler: ancestor walk for `product` stopped at unmapped `at`.
    TruncatedChain {
        product: ProductId,
        at: InventoryCategoryId,
    },
    /// Reconciler: ancestor walk for `product` reached `at` twice.
    CycleDetected {
        product: ProductId,
        at: InventoryCategoryId,
    },
    /// Reconciler: ancestor walk for `product` hit the configured depth bound.
    DepthExceeded { product: ProductId, depth: usize },
}

impl SyncGap {
    pub fn kind(&self) -> GapKind {
        match self {
            SyncGap::Unmapped { .. } => GapKind::Consistency,
            _ => GapKind::Mapping,
        }
    }
}

impl fmt::Display for SyncGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncGap::MissingParentMapping { category, parent } => {
                write!(f, "parent {parent} of {category} has no website category")
            }
            SyncGap::SelfParent { category } => {
                write!(f, "{category} is its own parent")
            }
            SyncGap::Unmapped { category } => {
                write!(f, "{category} missing from the mapping after the mapping pass")
            }
            SyncGap::TruncatedChain { product, at } => {
                write!(f, "ancestor chain of {product} truncated at unmapped {at}")
            }
            SyncGap::CycleDetected { product, at } => {
                write!(f, "ancestor chain of {product} revisits {at}")
            }
            SyncGap::DepthExceeded { product, depth } => {
                write!(f, "ancestor chain of {product} deeper than {depth}")
            }
        }
    }
}
