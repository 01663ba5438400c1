mod create;
mod delete;
mod metadata;

pub use create::{CreateDatabaseRequest, CreateDatabaseResponse};
pub use delete::{DeleteDatabaseQuery, DeleteDatabaseResponse};
pub use metadata::DatabaseMetadata;
