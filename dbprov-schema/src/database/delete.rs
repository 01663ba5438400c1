use serde::{Deserialize, Serialize};

/// Query string of `/deleteDB?dbName=<name>`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DeleteDatabaseQuery {
    #[serde(rename = "dbName")]
    pub db_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DeleteDatabaseResponse {
    pub deleted: String,
}
