//! Job submission: the runner seam, the reply adapter, and a runner that
//! submits through the master's REST surface.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::PluginError;
use crate::ports::master::{MasterApi, MasterRoute};
use crate::schema::{Envelope, JobDescriptor, Reply};

/// Executes scripts on behalf of the plugin.
///
/// An `Err` is the final word on the call: its text becomes the reply
/// message as-is. Implementations receive the argument string unescaped and
/// must never hand it to a shell.
#[async_trait::async_trait]
pub trait JobRunner: Send + Sync {
    async fn submit(&self, request: &Envelope, job: &JobDescriptor) -> Result<i64, PluginError>;
}

/// Hand a validated job to the runner and wrap the job id in a SUCCESS reply.
pub async fn submit(
    runner: &dyn JobRunner,
    request: &Envelope,
    job: JobDescriptor,
) -> Result<Reply, PluginError> {
    debug!(script = job.script_name, args = %job.args, "submitting job");
    let job_id = runner.submit(request, &job).await?;
    if job_id <= 0 {
        warn!(script = job.script_name, job_id, "runner returned no usable job id");
        return Err(PluginError::Submission(format!(
            "Invalid job id returned for '{}' ({job_id}).",
            job.script_name
        )));
    }
    info!(script = job.script_name, job_id, "job submitted");
    Ok(Reply::success(job_id))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ScriptRecord {
    id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct JobRequest<'a> {
    script_id: i64,
    args: &'a str,
    env_vars: &'a str,
    env_cap_desc: &'a str,
    #[serde(rename = "Type")]
    kind: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    env_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct JobCreated {
    #[serde(rename = "JobId", alias = "Id")]
    job_id: i64,
}

#[derive(Debug, Deserialize)]
struct MasterFailure {
    #[serde(rename = "Error")]
    error: String,
}

/// Submits jobs the way the master expects from its plugins: look the script
/// up by name, then create a job row for it.
pub struct MasterJobRunner {
    master: Arc<dyn MasterApi>,
}

impl MasterJobRunner {
    pub fn new(master: Arc<dyn MasterApi>) -> Self {
        Self { master }
    }

    async fn script_id(&self, route: MasterRoute, name: &str) -> Result<i64, PluginError> {
        let resp = self.master.get(&route).await?;
        let scripts: Vec<ScriptRecord> = serde_json::from_slice(&resp.body).unwrap_or_default();
        scripts
            .first()
            .map(|s| s.id)
            .ok_or_else(|| PluginError::ScriptNotFound(name.to_string()))
    }
}

#[async_trait::async_trait]
impl JobRunner for MasterJobRunner {
    async fn submit(&self, request: &Envelope, job: &JobDescriptor) -> Result<i64, PluginError> {
        let session = request.session()?;

        let lookup = MasterRoute::new(&session, "scripts")
            .with_query("nosource", "1")
            .with_query("name", job.script_name);
        let script_id = self.script_id(lookup, job.script_name).await?;

        let payload = JobRequest {
            script_id,
            args: &job.args,
            env_vars: &job.env_vars,
            env_cap_desc: job.capability.as_str(),
            kind: job.kind as i64,
            env_id: request.query_first("env_id").and_then(|v| v.parse().ok()),
        };
        let body = serde_json::to_vec(&payload).map_err(|e| PluginError::Marshal(e.to_string()))?;

        let resp = self
            .master
            .post(&MasterRoute::new(&session, "jobs"), body)
            .await?;

        if !resp.is_success() {
            let message = serde_json::from_slice::<MasterFailure>(&resp.body)
                .map(|f| f.error)
                .unwrap_or_else(|_| {
                    format!(
                        "Job submission rejected by the master (HTTP {}).",
                        resp.status
                    )
                });
            warn!(script = job.script_name, status = resp.status, %message, "job rejected");
            return Err(PluginError::Submission(message));
        }

        let created: JobCreated = serde_json::from_slice(&resp.body).map_err(|e| {
            PluginError::Submission(format!("Error decoding the job reply ('{e}')."))
        })?;
        Ok(created.job_id)
    }
}
