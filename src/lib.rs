pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod registry;
pub mod server;
pub mod utils;

pub use error::ProvisionError;
pub use lifecycle::{DatabaseSpec, LifecycleManager};
pub use registry::DatabaseRecord;
