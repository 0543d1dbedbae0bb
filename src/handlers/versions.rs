use crate::dispatch::{Handler, PluginContext};
use crate::error::PluginError;
use crate::resolver::resolve_env;
use crate::runner;
use crate::schema::{Envelope, JobDescriptor, Reply};

pub const SCRIPT: &str = "saltconfigserver_get_version.sh";

/// Asks the Salt config server which versions exist for an environment.
pub struct Versions;

#[async_trait::async_trait]
impl Handler for Versions {
    fn name(&self) -> &'static str {
        "versions"
    }

    async fn get(&self, ctx: &PluginContext, req: &Envelope) -> Result<Reply, PluginError> {
        let env_id = req.require_query("env_id")?;
        let session = req.session()?;
        let env = resolve_env(ctx.master.as_ref(), &session, env_id).await?;

        runner::submit(ctx.runner.as_ref(), req, JobDescriptor::salt(SCRIPT, env.sys_name)).await
    }
}
