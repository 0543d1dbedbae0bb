use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::PluginError;

/// Outcome flag carried inside every reply. Encoded as an integer on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum Status {
    Success,
    Error,
}

impl From<Status> for i64 {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => 0,
            Status::Error => 1,
        }
    }
}

impl TryFrom<i64> for Status {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, String> {
        match value {
            0 => Ok(Status::Success),
            1 => Ok(Status::Error),
            other => Err(format!("unknown plugin status {other}")),
        }
    }
}

/// The uniform response returned for every call outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    #[serde(rename = "JobId")]
    pub job_id: i64,
    /// Reserved; always empty.
    #[serde(rename = "Text", default)]
    pub text: String,
    #[serde(rename = "PluginReturn")]
    pub status: Status,
    #[serde(rename = "PluginError", default)]
    pub message: String,
}

impl Reply {
    pub fn success(job_id: i64) -> Self {
        Self {
            job_id,
            text: String::new(),
            status: Status::Success,
            message: String::new(),
        }
    }

    /// An ERROR reply never goes out with an empty message.
    pub fn error(message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.is_empty() {
            message = "Internal error: unknown failure".to_string();
        }
        Self {
            job_id: 0,
            text: String::new(),
            status: Status::Error,
            message,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }
}

/// HTTP verb of the call that the master forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Missing,
    Other(String),
}

impl Verb {
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw {
            None | Some("") => Verb::Missing,
            Some("GET") => Verb::Get,
            Some("POST") => Verb::Post,
            Some(other) => Verb::Other(other.to_string()),
        }
    }
}

/// Decoded shape of one incoming call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "QueryType", default, skip_serializing_if = "Option::is_none")]
    pub verb: Option<String>,
    #[serde(rename = "QueryString", default, deserialize_with = "null_as_empty")]
    pub query: HashMap<String, Vec<String>>,
    #[serde(rename = "PostData", default, with = "base64_bytes")]
    pub body: Option<Vec<u8>>,
    #[serde(rename = "PathParams", default, deserialize_with = "null_as_empty")]
    pub path_params: HashMap<String, String>,
}

impl Envelope {
    pub fn new(verb: &str) -> Self {
        Self {
            verb: Some(verb.to_string()),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_path_param(mut self, key: &str, value: &str) -> Self {
        self.path_params.insert(key.to_string(), value.to_string());
        self
    }

    pub fn verb(&self) -> Verb {
        Verb::from_wire(self.verb.as_deref())
    }

    /// First value of a query key. A key that is present with no values
    /// counts as absent; an empty first value does not.
    pub fn query_first(&self, key: &str) -> Option<&str> {
        self.query
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn require_query(&self, key: &'static str) -> Result<&str, PluginError> {
        self.query_first(key).ok_or(PluginError::MissingQuery(key))
    }

    pub fn body_bytes(&self) -> &[u8] {
        self.body.as_deref().unwrap_or_default()
    }

    pub fn session(&self) -> Result<MasterSession, PluginError> {
        let login = self
            .path_params
            .get("login")
            .filter(|v| !v.is_empty())
            .ok_or(PluginError::MissingPathParam("login"))?;
        let guid = self
            .path_params
            .get("GUID")
            .filter(|v| !v.is_empty())
            .ok_or(PluginError::MissingPathParam("GUID"))?;
        Ok(MasterSession {
            login: login.clone(),
            guid: guid.clone(),
        })
    }
}

/// Login and session GUID lifted from the call path, used to address the
/// master's REST surface on the caller's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterSession {
    pub login: String,
    pub guid: String,
}

/// Decode a POST body into the handler's expected shape. Failures report the
/// raw payload alongside the decoder's reason.
pub fn decode_body<T: DeserializeOwned>(raw: &[u8]) -> Result<T, PluginError> {
    serde_json::from_slice(raw).map_err(|e| PluginError::BodyDecode {
        raw: String::from_utf8_lossy(raw).into_owned(),
        reason: e.to_string(),
    })
}

/// Class of worker a job is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    SaltWorker,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::SaltWorker => "SALT_WORKER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Sync = 1,
    Async = 2,
}

/// What to run and with which arguments.
///
/// The script name is a `&'static str` so it can only come from a handler
/// constant. The argument string is joined from caller input and is NOT
/// shell-escaped; whoever executes it must pass it as an argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    pub script_name: &'static str,
    pub args: String,
    pub env_vars: String,
    pub capability: Capability,
    pub kind: JobKind,
}

impl JobDescriptor {
    pub fn salt(script_name: &'static str, args: impl Into<String>) -> Self {
        Self {
            script_name,
            args: args.into(),
            env_vars: String::new(),
            capability: Capability::SaltWorker,
            kind: JobKind::Async,
        }
    }
}

/// One environment as listed by the master.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnvRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub sys_name: String,
    #[serde(default)]
    pub dc_sys_name: Option<String>,
    #[serde(default)]
    pub disp_name: Option<String>,
}

/// Body of a grain-set POST.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GrainPost {
    #[serde(rename = "Grain", alias = "grain", default)]
    pub grain: String,
    #[serde(rename = "Text", alias = "text", default)]
    pub text: String,
}

/// The master sends nil maps as `null`.
fn null_as_empty<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => s.serialize_str(&STANDARD.encode(bytes)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.map(|s| STANDARD.decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
