pub mod config;
pub mod core;
pub mod mapping;
pub mod store;

pub use crate::config::SyncConfig;
pub use crate::core::engine::{SyncReport, run_synchronization};
pub use crate::core::error::SyncError;
pub use crate::store::{EntityStore, MemoryStore, StoreError};
