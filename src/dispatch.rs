use std::sync::Arc;

use crate::error::PluginError;
use crate::ports::master::MasterApi;
use crate::runner::JobRunner;
use crate::schema::{Envelope, Reply, Verb};

/// Collaborators a handler may call while serving one request.
#[derive(Clone)]
pub struct PluginContext {
    pub master: Arc<dyn MasterApi>,
    pub runner: Arc<dyn JobRunner>,
}

/// One plugin's behaviour, split by verb. A verb the plugin has nothing to do
/// for answers with the "unimplemented" error rather than a routing failure.
#[async_trait::async_trait]
pub trait Handler: Send + Sync {
    fn name(&self) -> &'static str;

    async fn get(&self, _ctx: &PluginContext, _req: &Envelope) -> Result<Reply, PluginError> {
        Err(PluginError::Unimplemented("GET"))
    }

    async fn post(&self, _ctx: &PluginContext, _req: &Envelope) -> Result<Reply, PluginError> {
        Err(PluginError::Unimplemented("POST"))
    }
}

/// Route by verb. Handler output is passed through untouched.
pub async fn dispatch(
    handler: &dyn Handler,
    ctx: &PluginContext,
    req: &Envelope,
) -> Result<Reply, PluginError> {
    match req.verb() {
        Verb::Get => handler.get(ctx, req).await,
        Verb::Post => handler.post(ctx, req).await,
        Verb::Missing => Err(PluginError::VerbMissing),
        Verb::Other(verb) => Err(PluginError::VerbInvalid(verb)),
    }
}

/// Like [`dispatch`], but every failure is folded into an ERROR reply.
pub async fn handle_request(handler: &dyn Handler, ctx: &PluginContext, req: &Envelope) -> Reply {
    dispatch(handler, ctx, req)
        .await
        .unwrap_or_else(Reply::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingRunner, StaticMaster};

    struct GetOnly;

    #[async_trait::async_trait]
    impl Handler for GetOnly {
        fn name(&self) -> &'static str {
            "get-only"
        }

        async fn get(&self, _ctx: &PluginContext, _req: &Envelope) -> Result<Reply, PluginError> {
            Ok(Reply::success(5))
        }
    }

    fn ctx() -> PluginContext {
        PluginContext {
            master: Arc::new(StaticMaster::new()),
            runner: Arc::new(RecordingRunner::returning(1)),
        }
    }

    #[tokio::test]
    async fn routes_get() {
        let reply = handle_request(&GetOnly, &ctx(), &Envelope::new("GET")).await;
        assert_eq!(reply, Reply::success(5));
    }

    #[tokio::test]
    async fn complementary_verb_is_unimplemented() {
        let reply = handle_request(&GetOnly, &ctx(), &Envelope::new("POST")).await;
        assert!(reply.is_error());
        assert_eq!(reply.message, "Internal error: Unimplemented HTTP POST");
    }

    #[tokio::test]
    async fn missing_verb() {
        let reply = handle_request(&GetOnly, &ctx(), &Envelope::default()).await;
        assert_eq!(reply.message, "Internal error: HTTP request type was not set");

        let reply = handle_request(&GetOnly, &ctx(), &Envelope::new("")).await;
        assert_eq!(reply.message, "Internal error: HTTP request type was not set");
    }

    #[tokio::test]
    async fn unknown_verb_is_named() {
        let reply = handle_request(&GetOnly, &ctx(), &Envelope::new("DELETE")).await;
        assert!(reply.is_error());
        assert_eq!(
            reply.message,
            "Internal error: Invalid HTTP request type for this plugin DELETE"
        );
    }
}
