//! Environment lookup against the master's REST surface.

use tracing::{debug, warn};

use crate::error::PluginError;
use crate::ports::master::{MasterApi, MasterRoute};
use crate::schema::{EnvRecord, MasterSession};

/// Fetch the environment with `env_id` as visible to the calling session.
///
/// The master always answers a listing with an array. An empty array, or a
/// body that is not an array at all (the master's permission error), both
/// become [`PluginError::EnvNotFound`] so a caller cannot tell a missing
/// environment from a forbidden one. When several records match, the first
/// one wins.
pub async fn resolve_env(
    master: &dyn MasterApi,
    session: &MasterSession,
    env_id: &str,
) -> Result<EnvRecord, PluginError> {
    let route = MasterRoute::new(session, "envs").with_query("env_id", env_id);
    let resp = master.get(&route).await.map_err(|e| {
        warn!(env_id, error = %e, "environment lookup failed");
        PluginError::from(e)
    })?;

    let envs: Vec<EnvRecord> = match serde_json::from_slice(&resp.body) {
        Ok(envs) => envs,
        Err(e) => {
            debug!(env_id, status = resp.status, error = %e, "environment listing not an array");
            Vec::new()
        }
    };

    envs.into_iter().next().ok_or(PluginError::EnvNotFound)
}
