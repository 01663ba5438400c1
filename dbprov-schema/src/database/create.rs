use serde::{Deserialize, Serialize};

/// Body of `POST /createDB`.
///
/// Field names are accepted in lower case or capitalized (`Name`, `Engine`, ...), so payloads
/// written for the older Go service keep working.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CreateDatabaseRequest {
    #[serde(alias = "Name")]
    pub name: String,

    /// Backing engine identifier. Falls back to the server's default engine when absent.
    #[serde(default, alias = "Engine", skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,

    /// Opaque size hint, recorded but never enforced.
    #[serde(default, alias = "Size")]
    pub size: String,

    /// Replica count, recorded but never enforced.
    #[serde(default, alias = "Replicas")]
    pub replicas: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CreateDatabaseResponse {
    pub identity: String,
}
