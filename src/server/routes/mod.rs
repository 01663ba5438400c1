pub mod database;

use crate::server::router::ProvisionState;
use axum::{
    Router,
    routing::{get, post},
};
use database::{create_database, delete_database, get_metadata};

/// `/createDB`, `/deleteDB` and `/getMetadata`.
pub fn router() -> Router<ProvisionState> {
    Router::new()
        .route("/createDB", post(create_database))
        .route("/deleteDB", post(delete_database).delete(delete_database))
        .route("/getMetadata", get(get_metadata))
}
