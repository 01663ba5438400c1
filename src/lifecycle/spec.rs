use crate::error::ProvisionError;
use dbprov_schema::CreateDatabaseRequest;

/// What a caller asks to provision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSpec {
    pub name: String,
    pub engine: String,
    pub size: String,
    pub replicas: u32,
}

impl DatabaseSpec {
    pub fn new(name: impl Into<String>, engine: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            engine: engine.into(),
            size: String::new(),
            replicas: 0,
        }
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    pub fn with_replicas(mut self, replicas: u32) -> Self {
        self.replicas = replicas;
        self
    }

    /// Builds a spec from a decoded request, filling in `default_engine` when none is named.
    pub fn from_request(req: CreateDatabaseRequest, default_engine: &str) -> Self {
        let engine = req
            .engine
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| default_engine.to_string());
        Self {
            name: req.name,
            engine,
            size: req.size,
            replicas: req.replicas,
        }
    }

    pub fn validate(&self) -> Result<(), ProvisionError> {
        if self.name.trim().is_empty() {
            return Err(ProvisionError::InvalidRequest(
                "database name must be non-empty".to_string(),
            ));
        }
        if self.name.contains('\0') {
            return Err(ProvisionError::InvalidRequest(
                "database name must not contain NUL".to_string(),
            ));
        }
        if self.engine.trim().is_empty() {
            return Err(ProvisionError::InvalidRequest(
                "engine must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}
