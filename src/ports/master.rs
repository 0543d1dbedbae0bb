use thiserror::Error;

use crate::schema::MasterSession;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MasterError {
    #[error("invalid master URL: {0}")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("{0}")]
    ReadBody(String),
}

/// A resource under `/api/{login}/{GUID}/` on the master.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterRoute {
    pub login: String,
    pub guid: String,
    pub resource: &'static str,
    pub query: Vec<(String, String)>,
}

impl MasterRoute {
    pub fn new(session: &MasterSession, resource: &'static str) -> Self {
        Self {
            login: session.login.clone(),
            guid: session.guid.clone(),
            resource,
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl MasterResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The master's REST surface as seen from a plugin.
///
/// Non-2xx answers are still `Ok`: the caller decides what a status means.
/// Only transport and read failures are errors.
#[async_trait::async_trait]
pub trait MasterApi: Send + Sync {
    async fn get(&self, route: &MasterRoute) -> Result<MasterResponse, MasterError>;
    async fn post(&self, route: &MasterRoute, body: Vec<u8>)
        -> Result<MasterResponse, MasterError>;
}
