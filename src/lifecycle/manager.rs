use super::spec::DatabaseSpec;
use crate::engine::{
    EngineConnector, EngineHandle, create_database_statement, drop_database_statement,
};
use crate::error::{EngineError, ProvisionError, RegistryError};
use crate::registry::{DatabaseRecord, RegistryHandle};
use chrono::Utc;
use std::{future::Future, sync::Arc, time::Duration};
use tracing::{debug, info, warn};

/// Drives create/delete transactions against the engine and keeps the registry in step.
///
/// Registry access goes through reservations: the name is claimed inside the registry actor,
/// engine I/O runs outside it, and the claim is committed or released afterwards. No engine
/// round-trip ever holds the registry.
#[derive(Clone)]
pub struct LifecycleManager {
    registry: RegistryHandle,
    connector: Arc<dyn EngineConnector>,
    timeout: Duration,
}

impl LifecycleManager {
    pub fn new(
        registry: RegistryHandle,
        connector: Arc<dyn EngineConnector>,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            connector,
            timeout,
        }
    }

    /// Provisions `spec.name` and registers it. Returns the engine-assigned identity.
    pub async fn create(&self, spec: DatabaseSpec) -> Result<String, ProvisionError> {
        spec.validate()?;

        let reserved = self.registry.reserve_create(&spec.name).await;
        let reservation = match reserved {
            Ok(r) => r,
            Err(ProvisionError::Registry(RegistryError::AlreadyExists(_))) => {
                info!(name = %spec.name, "create rejected: database already registered");
                return Err(ProvisionError::DuplicateDatabase(spec.name));
            }
            Err(e) => return Err(e),
        };

        let unscoped = self
            .bounded("open engine", self.connector.open_unscoped(&spec.engine))
            .await?;
        let created = self
            .bounded(
                "create database",
                unscoped.execute(&create_database_statement(&spec.name)),
            )
            .await;
        self.release(unscoped).await;
        let rows_affected = created?;
        info!(
            name = %spec.name,
            engine = %spec.engine,
            rows_affected,
            "database created"
        );

        let scoped = self
            .bounded(
                "open database",
                self.connector.open_scoped(&spec.engine, &spec.name),
            )
            .await
            .inspect_err(|e| orphaned(&spec.name, e))?;
        let identified = self.verify_and_identify(scoped.as_ref()).await;
        self.release(scoped).await;
        let identity = identified.inspect_err(|e| orphaned(&spec.name, e))?;

        let record = DatabaseRecord {
            name: spec.name,
            engine: spec.engine,
            size: spec.size,
            replicas: spec.replicas,
            identity: identity.clone(),
            created_at: Utc::now(),
        };
        let name = record.name.clone();
        reservation.commit_insert(record).await?;

        info!(name = %name, identity = %identity, "database registered");
        Ok(identity)
    }

    /// Drops `name` on the engine, then unregisters it.
    pub async fn delete(&self, name: &str) -> Result<(), ProvisionError> {
        if name.trim().is_empty() {
            return Err(ProvisionError::InvalidRequest(
                "database name must be non-empty".to_string(),
            ));
        }

        let reserved = self.registry.reserve_delete(name).await;
        let (reservation, record) = match reserved {
            Ok(v) => v,
            Err(ProvisionError::Registry(RegistryError::NotFound(_))) => {
                info!(name = %name, "delete rejected: database not registered");
                return Err(ProvisionError::UnknownDatabase(name.to_string()));
            }
            Err(ProvisionError::Registry(RegistryError::InProgress(_))) => {
                return Err(ProvisionError::OperationInProgress(name.to_string()));
            }
            Err(e) => return Err(e),
        };

        // Known gap: the engine stored at creation is trusted as-is.
        debug!(
            name = %record.name,
            engine = %record.engine,
            "dropping with the engine recorded at creation"
        );

        let handle = self
            .bounded(
                "open database",
                self.connector.open_scoped(&record.engine, &record.name),
            )
            .await?;
        let dropped = self
            .bounded(
                "drop database",
                handle.execute(&drop_database_statement(&record.name)),
            )
            .await;
        self.release(handle).await;
        let rows_affected = dropped?;

        let removed = reservation.commit_remove().await?;
        info!(
            name = %removed.name,
            identity = %removed.identity,
            rows_affected,
            "database dropped and unregistered"
        );
        Ok(())
    }

    /// Registered databases in creation order. Never touches the engine.
    pub async fn get_metadata(&self) -> Result<Vec<DatabaseRecord>, ProvisionError> {
        self.registry.list().await
    }

    async fn verify_and_identify(
        &self,
        handle: &dyn EngineHandle,
    ) -> Result<String, ProvisionError> {
        self.bounded("verify", handle.verify()).await?;
        self.bounded("allocate identity", handle.allocate_id()).await
    }

    /// Awaits `fut` under the operation deadline. Expiry drops the future, cancelling the call.
    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, ProvisionError>
    where
        F: Future<Output = Result<T, EngineError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(res) => res.map_err(ProvisionError::from),
            Err(_) => {
                warn!(operation, timeout = ?self.timeout, "engine call timed out");
                Err(ProvisionError::Timeout {
                    operation,
                    timeout: self.timeout,
                })
            }
        }
    }

    async fn release(&self, handle: Box<dyn EngineHandle>) {
        if tokio::time::timeout(self.timeout, handle.close()).await.is_err() {
            warn!("engine handle close timed out; pool dropped");
        }
    }
}

fn orphaned(name: &str, error: &ProvisionError) {
    warn!(
        name = %name,
        error = %error,
        "database exists on the engine but was not registered; manual cleanup required"
    );
}
