pub mod database;

pub use database::{
    CreateDatabaseRequest, CreateDatabaseResponse, DatabaseMetadata, DeleteDatabaseQuery,
    DeleteDatabaseResponse,
};
