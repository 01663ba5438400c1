//! Engine connector: pooled handles to the backing database engine.
//!
//! The lifecycle manager only sees the [`EngineConnector`] / [`EngineHandle`] traits so the
//! MySQL implementation can be swapped for an in-process double in tests.

mod mysql;

pub use mysql::MySqlConnector;

use crate::error::EngineError;
use async_trait::async_trait;
use std::{fmt, str::FromStr};

/// Engines the connector knows how to drive. Both speak the MySQL wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    MySql,
    MariaDb,
}

impl EngineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EngineKind::MySql => "mysql",
            EngineKind::MariaDb => "mariadb",
        }
    }
}

impl FromStr for EngineKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(EngineKind::MySql),
            "mariadb" => Ok(EngineKind::MariaDb),
            _ => Err(EngineError::UnsupportedEngine(s.to_string())),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opens pooled handles. Opening never proves connectivity; see [`EngineHandle::verify`].
#[async_trait]
pub trait EngineConnector: Send + Sync + 'static {
    /// Handle with no database selected, used for CREATE/DROP DATABASE.
    async fn open_unscoped(&self, engine: &str) -> Result<Box<dyn EngineHandle>, EngineError>;

    /// Handle bound to `database`.
    async fn open_scoped(
        &self,
        engine: &str,
        database: &str,
    ) -> Result<Box<dyn EngineHandle>, EngineError>;
}

/// A live connection pool. Callers must [`close`](EngineHandle::close) it on every exit path;
/// dropping it without closing still releases the pooled connections.
#[async_trait]
pub trait EngineHandle: Send + Sync {
    /// Runs a DDL statement and returns the affected row count.
    async fn execute(&self, statement: &str) -> Result<u64, EngineError>;

    /// Pings the engine over a pooled connection.
    async fn verify(&self) -> Result<(), EngineError>;

    /// Asks the engine for a short numeric unique id (`UUID_SHORT()`).
    async fn allocate_id(&self) -> Result<String, EngineError>;

    async fn close(self: Box<Self>);
}

/// Quotes a database name as a MySQL identifier.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

pub fn create_database_statement(name: &str) -> String {
    format!("CREATE DATABASE IF NOT EXISTS {}", quote_identifier(name))
}

pub fn drop_database_statement(name: &str) -> String {
    format!("DROP DATABASE {}", quote_identifier(name))
}
