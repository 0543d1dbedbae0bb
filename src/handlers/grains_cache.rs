use crate::dispatch::{Handler, PluginContext};
use crate::error::PluginError;
use crate::runner;
use crate::schema::{Envelope, JobDescriptor, Reply};

pub const SCRIPT: &str = "salt-grains-cache.sh";

/// Refreshes the cached grains of one minion.
pub struct GrainsCache;

#[async_trait::async_trait]
impl Handler for GrainsCache {
    fn name(&self) -> &'static str {
        "grainscache"
    }

    async fn get(&self, ctx: &PluginContext, req: &Envelope) -> Result<Reply, PluginError> {
        let salt_id = req.require_query("salt_id")?;
        runner::submit(ctx.runner.as_ref(), req, JobDescriptor::salt(SCRIPT, salt_id)).await
    }
}
