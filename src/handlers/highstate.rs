use crate::dispatch::{Handler, PluginContext};
use crate::error::PluginError;
use crate::runner;
use crate::schema::{decode_body, Envelope, JobDescriptor, Reply};

pub const SCRIPT: &str = "salt-highstate.py";

/// Applies the highstate to a list of minions posted as a JSON array.
pub struct Highstate;

#[async_trait::async_trait]
impl Handler for Highstate {
    fn name(&self) -> &'static str {
        "salthighstate"
    }

    async fn post(&self, ctx: &PluginContext, req: &Envelope) -> Result<Reply, PluginError> {
        // env_id selects the worker the job is routed to.
        req.require_query("env_id")?;

        let salt_ids: Vec<String> = decode_body(req.body_bytes())?;
        if salt_ids.is_empty() {
            return Err(PluginError::NoSaltIds);
        }

        let job = JobDescriptor::salt(SCRIPT, salt_ids.join(" "));
        runner::submit(ctx.runner.as_ref(), req, job).await
    }
}
