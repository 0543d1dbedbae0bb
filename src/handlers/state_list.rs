use crate::dispatch::{Handler, PluginContext};
use crate::error::PluginError;
use crate::resolver::resolve_env;
use crate::runner;
use crate::schema::{Envelope, JobDescriptor, Reply};

pub const SCRIPT: &str = "statelist.sh";

/// Version that selects the environment's main branch, e.g. `test` rather
/// than `test_0.1.0`.
pub const MAIN_BRANCH_VERSION: &str = "0";

/// Lists the state descriptions of an environment at a given version.
pub struct StateList;

/// `prod` for the main branch, `prod_<version>` otherwise.
pub fn branch_name(sys_name: &str, version: &str) -> String {
    if version == MAIN_BRANCH_VERSION {
        sys_name.to_string()
    } else {
        format!("{sys_name}_{version}")
    }
}

#[async_trait::async_trait]
impl Handler for StateList {
    fn name(&self) -> &'static str {
        "statedescs"
    }

    async fn get(&self, ctx: &PluginContext, req: &Envelope) -> Result<Reply, PluginError> {
        let env_id = req.require_query("env_id")?;
        let version = req.require_query("version")?;

        let session = req.session()?;
        let env = resolve_env(ctx.master.as_ref(), &session, env_id).await?;

        let job = JobDescriptor::salt(SCRIPT, branch_name(&env.sys_name, version));
        runner::submit(ctx.runner.as_ref(), req, job).await
    }
}
