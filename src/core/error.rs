use std::fmt;

use thiserror::Error;

use crate::core::context::ContextError;
use crate::store::StoreError;

/// The pass a run was in when something went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPass {
    Mapping,
    Hierarchy,
    Membership,
}

impl fmt::Display for SyncPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyncPass::Mapping => "category mapping",
            SyncPass::Hierarchy => "hierarchy linking",
            SyncPass::Membership => "membership reconciliation",
        })
    }
}

/// Fatal run errors. Gaps are not errors, they end up in the report.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("store fault during {pass}: {source}")]
    StoreFault {
        pass: SyncPass,
        #[source]
        source: StoreError,
    },

    #[error("mapping conflict during {pass}: {source}")]
    Context {
        pass: SyncPass,
        #[source]
        source: ContextError,
    },
}

impl SyncError {
    pub fn store(pass: SyncPass) -> impl FnOnce(StoreError) -> Self {
        move |source| SyncError::StoreFault { pass, source }
    }

    pub fn context(pass: SyncPass) -> impl FnOnce(ContextError) -> Self {
        move |source| SyncError::Context { pass, source }
    }

    pub fn pass(&self) -> SyncPass {
        match self {
            SyncError::StoreFault { pass, .. } | SyncError::Context { pass, .. } => *pass,
        }
    }
}
