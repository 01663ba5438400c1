use thiserror::Error as ThisError;

/// Failures reported by an engine connector or one of its handles.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum EngineError {
    #[error("unsupported engine `{0}`")]
    UnsupportedEngine(String),

    /// Malformed DSN or pool construction failure.
    #[error("connect failed: {0}")]
    Connect(String),

    /// The pool was built but the engine did not answer a ping.
    #[error("engine unreachable: {0}")]
    Unreachable(String),

    #[error("statement failed: {0}")]
    Exec(String),
}
