use std::collections::HashMap;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvError {
    #[error("Environment variable not found: {0}")]
    NotFound(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Read-only view of the process environment used for startup configuration.
pub trait EnvironmentPort: Send + Sync {
    fn get_var(&self, key: &str) -> Result<String, EnvError>;

    fn get_opt(&self, key: &str) -> Option<String> {
        self.get_var(key).ok().filter(|v| !v.is_empty())
    }
}

/// Fixed set of variables, for tests and for embedding hosts that do not
/// want the real process environment consulted.
#[derive(Debug, Default, Clone)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }
}

impl EnvironmentPort for MapEnv {
    fn get_var(&self, key: &str) -> Result<String, EnvError> {
        self.vars
            .get(key)
            .cloned()
            .ok_or_else(|| EnvError::NotFound(key.to_string()))
    }
}
