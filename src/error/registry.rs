use thiserror::Error as ThisError;

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum RegistryError {
    #[error("registry already holds `{0}`")]
    AlreadyExists(String),

    #[error("registry has no entry for `{0}`")]
    NotFound(String),

    #[error("`{0}` has an operation in flight")]
    InProgress(String),

    #[error("reservation on `{0}` is no longer held")]
    ReservationLost(String),
}
