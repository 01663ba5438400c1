//! In-process stand-in for a MySQL server, with switchable failures and delays.

#![allow(dead_code)]

use async_trait::async_trait;
use dbprov::engine::{EngineConnector, EngineHandle, EngineKind};
use dbprov::error::EngineError;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const FIRST_IDENTITY: u64 = 100_934_786_117_271_616;

#[derive(Debug, Clone, Default)]
pub struct Behavior {
    pub fail_execute: Option<EngineError>,
    pub fail_verify: Option<EngineError>,
    pub fail_allocate: Option<EngineError>,
    pub execute_delay: Option<Duration>,
    pub verify_delay: Option<Duration>,
}

#[derive(Default)]
struct FakeState {
    opens: AtomicUsize,
    closes: AtomicUsize,
    allocated: AtomicU64,
    statements: Mutex<Vec<String>>,
    scopes: Mutex<Vec<Option<String>>>,
    behavior: Mutex<Behavior>,
}

#[derive(Clone, Default)]
pub struct FakeEngine {
    state: Arc<FakeState>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, f: impl FnOnce(&mut Behavior)) {
        f(&mut self.state.behavior.lock().unwrap());
    }

    pub fn reset(&self) {
        *self.state.behavior.lock().unwrap() = Behavior::default();
    }

    pub fn opens(&self) -> usize {
        self.state.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    /// Statements that completed successfully, in order.
    pub fn statements(&self) -> Vec<String> {
        self.state.statements.lock().unwrap().clone()
    }

    /// Database selected by each opened handle (`None` for unscoped).
    pub fn scopes(&self) -> Vec<Option<String>> {
        self.state.scopes.lock().unwrap().clone()
    }

    fn behavior(&self) -> Behavior {
        self.state.behavior.lock().unwrap().clone()
    }

    fn open(
        &self,
        engine: &str,
        database: Option<&str>,
    ) -> Result<Box<dyn EngineHandle>, EngineError> {
        engine.parse::<EngineKind>()?;
        self.state.opens.fetch_add(1, Ordering::SeqCst);
        self.state
            .scopes
            .lock()
            .unwrap()
            .push(database.map(str::to_string));
        Ok(Box::new(FakeHandle {
            engine: self.clone(),
        }))
    }
}

#[async_trait]
impl EngineConnector for FakeEngine {
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

struct FakeHandle {
    engine: FakeEngine,
}

#[async_trait]
impl EngineHandle for FakeHandle {
    async fn execute(&self, statement: &str) -> Result<u64, EngineError> {
        let behavior = self.engine.behavior();
        if let Some(delay) = behavior.execute_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = behavior.fail_execute {
            return Err(err);
        }
        self.engine
            .state
            .statements
            .lock()
            .unwrap()
            .push(statement.to_string());
        Ok(1)
    }

    async fn verify(&self) -> Result<(), EngineError> {
        let behavior = self.engine.behavior();
        if let Some(delay) = behavior.verify_delay {
            tokio::time::sleep(delay).await;
        }
        behavior.fail_verify.map_or(Ok(()), Err)
    }

    async fn allocate_id(&self) -> Result<String, EngineError> {
        if let Some(err) = self.engine.behavior().fail_allocate {
            return Err(err);
        }
        let n = self.engine.state.allocated.fetch_add(1, Ordering::SeqCst);
        Ok((FIRST_IDENTITY + n).to_string())
    }

    async fn close(self: Box<Self>) {
        self.engine.state.closes.fetch_add(1, Ordering::SeqCst);
    }
}
