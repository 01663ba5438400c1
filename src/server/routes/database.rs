use crate::error::ProvisionError;
use crate::lifecycle::DatabaseSpec;
use crate::server::router::ProvisionState;
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use dbprov_schema::{
    CreateDatabaseRequest, CreateDatabaseResponse, DatabaseMetadata, DeleteDatabaseQuery,
    DeleteDatabaseResponse,
};

/// POST /createDB
///
/// Decode failures are answered with 400 `INVALID_REQUEST`; nothing here panics on input.
pub async fn create_database(
    State(state): State<ProvisionState>,
    payload: Result<Json<CreateDatabaseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateDatabaseResponse>), ProvisionError> {
    let Json(req) = payload.map_err(|e| ProvisionError::InvalidRequest(e.body_text()))?;
    let spec = DatabaseSpec::from_request(req, &state.default_engine);

    let identity = state.manager.create(spec).await?;
    Ok((StatusCode::CREATED, Json(CreateDatabaseResponse { identity })))
}

/// POST|DELETE /deleteDB?dbName=<name>
pub async fn delete_database(
    State(state): State<ProvisionState>,
    query: Result<Query<DeleteDatabaseQuery>, QueryRejection>,
) -> Result<Json<DeleteDatabaseResponse>, ProvisionError> {
    let Query(query) = query.map_err(|e| ProvisionError::InvalidRequest(e.body_text()))?;

    state.manager.delete(&query.db_name).await?;
    Ok(Json(DeleteDatabaseResponse {
        deleted: query.db_name,
    }))
}

/// GET /getMetadata
pub async fn get_metadata(
    State(state): State<ProvisionState>,
) -> Result<Json<Vec<DatabaseMetadata>>, ProvisionError> {
    let records = state.manager.get_metadata().await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}
