use super::store::{DatabaseRecord, Registry, ReservationToken};
use crate::error::{ProvisionError, RegistryError};
use crate::utils::logging::debug_json;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use tracing::{debug, info};

#[derive(Debug)]
pub enum RegistryMessage {
    /// Snapshot in insertion order.
    List(RpcReplyPort<Vec<DatabaseRecord>>),

    /// Claim a name for an in-flight create.
    ReserveCreate(String, RpcReplyPort<Result<ReservationToken, RegistryError>>),

    /// Claim a registered name for an in-flight delete.
    ReserveDelete(
        String,
        RpcReplyPort<Result<(DatabaseRecord, ReservationToken), RegistryError>>,
    ),

    /// Register a record under a held create claim, consuming the claim.
    CommitInsert(
        DatabaseRecord,
        ReservationToken,
        RpcReplyPort<Result<(), RegistryError>>,
    ),

    /// Remove a record under a held delete claim, preserving the order of the others.
    CommitRemove(
        String,
        ReservationToken,
        RpcReplyPort<Result<DatabaseRecord, RegistryError>>,
    ),

    /// Drop a claim (sent by `Reservation` on drop).
    Release(String, ReservationToken),
}

/// Cloneable handle to the registry actor.
#[derive(Clone)]
pub struct RegistryHandle {
    actor: ActorRef<RegistryMessage>,
}

fn rpc_failed(op: &str, e: impl std::fmt::Display) -> ProvisionError {
    ProvisionError::RactorError(format!("Registry {op} RPC failed: {e}"))
}

impl RegistryHandle {
    pub async fn list(&self) -> Result<Vec<DatabaseRecord>, ProvisionError> {
        ractor::call!(self.actor, RegistryMessage::List).map_err(|e| rpc_failed("List", e))
    }

    /// Claims `name` for a create. The claim lasts until the returned guard commits or drops.
    pub async fn reserve_create(&self, name: &str) -> Result<Reservation, ProvisionError> {
        let token = ractor::call!(self.actor, RegistryMessage::ReserveCreate, name.to_string())
            .map_err(|e| rpc_failed("ReserveCreate", e))??;
        Ok(Reservation::new(self.clone(), name, token))
    }

    /// Claims a registered `name` for a delete and returns its record alongside the guard.
    pub async fn reserve_delete(
        &self,
        name: &str,
    ) -> Result<(Reservation, DatabaseRecord), ProvisionError> {
        let (record, token) =
            ractor::call!(self.actor, RegistryMessage::ReserveDelete, name.to_string())
                .map_err(|e| rpc_failed("ReserveDelete", e))??;
        Ok((Reservation::new(self.clone(), name, token), record))
    }

    pub fn stop(&self) {
        self.actor.stop(Some("shutdown".to_string()));
    }
}

/// Exclusive claim on a database name while engine I/O runs outside the actor.
///
/// Committing turns the claim into an insert or a remove. Dropping an uncommitted
/// reservation (error path, timeout, cancelled future) releases the name.
#[must_use = "dropping a reservation releases it immediately"]
pub struct Reservation {
    registry: RegistryHandle,
    name: String,
    token: ReservationToken,
    armed: bool,
}

impl Reservation {
    fn new(registry: RegistryHandle, name: &str, token: ReservationToken) -> Self {
        Self {
            registry,
            name: name.to_string(),
            token,
            armed: true,
        }
    }

    /// Registers `record` and consumes the claim.
    pub async fn commit_insert(mut self, record: DatabaseRecord) -> Result<(), ProvisionError> {
        let res = ractor::call!(
            self.registry.actor,
            RegistryMessage::CommitInsert,
            record,
            self.token
        )
        .map_err(|e| rpc_failed("CommitInsert", e))?;
        // The actor consumed or rejected the claim; either way nothing is left to release.
        self.armed = false;
        res.map_err(ProvisionError::from)
    }

    /// Removes the claimed record and consumes the claim.
    pub async fn commit_remove(mut self) -> Result<DatabaseRecord, ProvisionError> {
        let res = ractor::call!(
            self.registry.actor,
            RegistryMessage::CommitRemove,
            self.name.clone(),
            self.token
        )
        .map_err(|e| rpc_failed("CommitRemove", e))?;
        self.armed = false;
        res.map_err(ProvisionError::from)
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if self.armed {
            let _ = ractor::cast!(
                self.registry.actor,
                RegistryMessage::Release(std::mem::take(&mut self.name), self.token)
            );
        }
    }
}

struct RegistryActorState {
    registry: Registry,
}

struct RegistryActor;

#[ractor::async_trait]
impl Actor for RegistryActor {
    type Msg = RegistryMessage;
    type State = RegistryActorState;
    type Arguments = ();

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        _arguments: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        info!("RegistryActor initialized");
        Ok(RegistryActorState {
            registry: Registry::new(),
        })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            RegistryMessage::CommitInsert(record, token, reply) => {
                let name = record.name.clone();
                let res = state.registry.commit_insert(record, token);
                if res.is_ok() {
                    debug!(name = %name, total = state.registry.len(), "registry record inserted");
                    log_snapshot(&state.registry);
                }
                let _ = reply.send(res);
            }
            RegistryMessage::CommitRemove(name, token, reply) => {
                let res = state.registry.commit_remove(&name, token);
                if res.is_ok() {
                    debug!(name = %name, total = state.registry.len(), "registry record removed");
                    log_snapshot(&state.registry);
                }
                let _ = reply.send(res);
            }
            RegistryMessage::List(reply) => {
                let _ = reply.send(state.registry.list());
            }
            RegistryMessage::ReserveCreate(name, reply) => {
                let _ = reply.send(state.registry.reserve_create(&name));
            }
            RegistryMessage::ReserveDelete(name, reply) => {
                let _ = reply.send(state.registry.reserve_delete(&name));
            }
            RegistryMessage::Release(name, token) => {
                if let Some(op) = state.registry.release(&name, token) {
                    debug!(name = %name, op = ?op, "registry reservation released");
                }
            }
        }
        Ok(())
    }
}

fn log_snapshot(registry: &Registry) {
    debug_json("registry snapshot", registry.records());
}

/// Spawn the registry actor and return a cloneable handle.
pub async fn spawn() -> Result<RegistryHandle, ProvisionError> {
    let (actor, _jh) = Actor::spawn(None, RegistryActor, ())
        .await
        .map_err(|e| ProvisionError::RactorError(format!("failed to spawn RegistryActor: {e}")))?;
    Ok(RegistryHandle { actor })
}
