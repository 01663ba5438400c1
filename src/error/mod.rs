mod config;
mod engine;
mod provision;
mod registry;

pub use config::ConfigError;
pub use engine::EngineError;
pub use provision::{ApiErrorBody, ApiErrorObject, ProvisionError};
pub use registry::RegistryError;
