use std::sync::Arc;

use tracing::Instrument;

use crate::adapters::HttpMasterApi;
use crate::config::PluginConfig;
use crate::dispatch::{handle_request, Handler, PluginContext};
use crate::handlers::PluginKind;
use crate::observability::CallContext;
use crate::ports::master::MasterError;
use crate::runner::MasterJobRunner;
use crate::schema::{Envelope, Reply};

/// A handler bound to its collaborators: the RPC target of a plugin process.
pub struct PluginService {
    handler: Box<dyn Handler>,
    ctx: PluginContext,
}

impl PluginService {
    pub fn new(handler: Box<dyn Handler>, ctx: PluginContext) -> Self {
        Self { handler, ctx }
    }

    /// Production wiring: the master over HTTPS, jobs submitted through it.
    pub fn from_config(kind: PluginKind, config: &PluginConfig) -> Result<Self, MasterError> {
        let master = Arc::new(HttpMasterApi::new(config)?);
        let runner = Arc::new(MasterJobRunner::new(master.clone()));
        Ok(Self::new(kind.handler(), PluginContext { master, runner }))
    }

    pub fn name(&self) -> &'static str {
        self.handler.name()
    }

    /// `Plugin.HandleRequest`: always produces a reply.
    pub async fn handle(&self, call_id: u64, req: &Envelope) -> Reply {
        let call = CallContext::new(self.handler.name(), call_id, req.verb.as_deref());
        let reply = handle_request(self.handler.as_ref(), &self.ctx, req)
            .instrument(call.span())
            .await;
        call.record(&reply);
        reply
    }
}
