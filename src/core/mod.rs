pub mod context;
pub mod engine;
pub mod error;
pub mod gap;
pub mod linker;
pub mod mapper;
pub mod reconcile;
pub mod types;
