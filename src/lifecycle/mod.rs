//! Create/Delete/GetMetadata orchestration over the registry and the engine connector.

pub mod manager;
pub mod spec;

pub use manager::LifecycleManager;
pub use spec::DatabaseSpec;
