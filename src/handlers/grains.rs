use tracing::debug;

use crate::dispatch::{Handler, PluginContext};
use crate::error::PluginError;
use crate::runner;
use crate::schema::{decode_body, Envelope, GrainPost, JobDescriptor, Reply};

pub const LIST_SCRIPT: &str = "salt-grains.sh";
pub const SET_SCRIPT: &str = "salt-set-grains.sh";

/// Lists a minion's grains (GET) or sets a single grain (POST).
pub struct Grains;

#[async_trait::async_trait]
impl Handler for Grains {
    fn name(&self) -> &'static str {
        "grains"
    }

    async fn get(&self, ctx: &PluginContext, req: &Envelope) -> Result<Reply, PluginError> {
        let salt_id = req.require_query("salt_id")?;
        let job = JobDescriptor::salt(LIST_SCRIPT, salt_id);
        runner::submit(ctx.runner.as_ref(), req, job).await
    }

    async fn post(&self, ctx: &PluginContext, req: &Envelope) -> Result<Reply, PluginError> {
        let posted: GrainPost = decode_body(req.body_bytes())?;
        let salt_id = req.require_query("salt_id")?;

        if posted.grain.is_empty() || posted.text.is_empty() {
            return Err(PluginError::NoPostData);
        }
        debug!(salt_id, grain = %posted.grain, "setting grain");

        // "<salt_id> <grain>,<value>" passed through unescaped.
        let args = format!("{salt_id} {},{}", posted.grain, posted.text);
        runner::submit(ctx.runner.as_ref(), req, JobDescriptor::salt(SET_SCRIPT, args)).await
    }
}
