use super::{EngineConnector, EngineHandle, EngineKind};
use crate::config::PoolPolicy;
use crate::error::EngineError;
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::Connection;
use std::str::FromStr;
use tracing::debug;
use url::Url;

/// sqlx-backed connector for MySQL-protocol engines.
#[derive(Debug, Clone)]
pub struct MySqlConnector {
    url: Url,
    policy: PoolPolicy,
}

impl MySqlConnector {
    /// `url` names the server only; any path component is ignored and replaced per scope.
    pub fn new(url: Url, policy: PoolPolicy) -> Self {
        Self { url, policy }
    }

    fn open(
        &self,
        engine: &str,
        database: Option<&str>,
    ) -> Result<Box<dyn EngineHandle>, EngineError> {
        let kind: EngineKind = engine.parse()?;

        let mut server_url = self.url.clone();
        server_url.set_path("");
        let mut connect_opts = MySqlConnectOptions::from_str(server_url.as_str())
            .map_err(|e| EngineError::Connect(format!("invalid engine url: {e}")))?;
        if let Some(db) = database {
            connect_opts = connect_opts.database(db);
        }

        // Lazy: the first acquire dials the server.
        let pool = MySqlPoolOptions::new()
            .max_connections(self.policy.max_connections)
            .min_connections(0)
            .max_lifetime(self.policy.max_lifetime)
            .idle_timeout(self.policy.max_lifetime)
            .connect_lazy_with(connect_opts);

        debug!(
            engine = %kind,
            database = database.unwrap_or("<none>"),
            max_connections = self.policy.max_connections,
            max_lifetime_secs = self.policy.max_lifetime.as_secs(),
            "engine pool opened"
        );

        Ok(Box::new(MySqlHandle {
            pool,
            kind,
            database: database.map(str::to_string),
        }))
    }
}

#[async_trait]
impl EngineConnector for MySqlConnector {
    async fn open_unscoped(&self, engine: &str) -> Result<Box<dyn EngineHandle>, EngineError> {
        self.open(engine, None)
    }

    async fn open_scoped(
        &self,
        engine: &str,
        database: &str,
    ) -> Result<Box<dyn EngineHandle>, EngineError> {
        self.open(engine, Some(database))
    }
}

struct MySqlHandle {
    pool: MySqlPool,
    kind: EngineKind,
    database: Option<String>,
}

#[async_trait]
impl EngineHandle for MySqlHandle {
    async fn execute(&self, statement: &str) -> Result<u64, EngineError> {
        // DDL cannot be prepared with bound identifiers; send it as a simple query.
        let res = sqlx::raw_sql(statement)
            .execute(&self.pool)
            .await
            .map_err(exec_error)?;
        Ok(res.rows_affected())
    }

    async fn verify(&self) -> Result<(), EngineError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| EngineError::Unreachable(e.to_string()))?;
        conn.ping()
            .await
            .map_err(|e| EngineError::Unreachable(e.to_string()))
    }

    async fn allocate_id(&self) -> Result<String, EngineError> {
        let id: u64 = sqlx::query_scalar("SELECT UUID_SHORT()")
            .fetch_one(&self.pool)
            .await
            .map_err(exec_error)?;
        Ok(id.to_string())
    }

    async fn close(self: Box<Self>) {
        self.pool.close().await;
        debug!(
            engine = %self.kind,
            database = self.database.as_deref().unwrap_or("<none>"),
            "engine pool closed"
        );
    }
}

/// Statement errors reported by the server are execution failures; transport-level errors
/// mean the engine was never reached.
fn exec_error(e: sqlx::Error) -> EngineError {
    match e {
        sqlx::Error::Database(db) => EngineError::Exec(db.message().to_string()),
        sqlx::Error::Configuration(_)
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => EngineError::Unreachable(e.to_string()),
        other => EngineError::Exec(other.to_string()),
    }
}
