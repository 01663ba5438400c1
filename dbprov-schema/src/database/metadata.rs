use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the `GET /getMetadata` listing.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DatabaseMetadata {
    pub name: String,
    pub engine: String,
    pub size: String,
    pub replicas: u32,
    pub identity: String,
    pub created_at: DateTime<Utc>,
}
