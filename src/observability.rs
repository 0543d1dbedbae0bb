//! Structured logging for plugin processes.
//!
//! Logs go to stderr; the master captures them alongside the plugin's exit
//! status.

use std::time::Instant;

use tracing::{info, warn, Span};
use tracing_subscriber::EnvFilter;

use crate::ports::env::EnvironmentPort;
use crate::schema::Reply;

pub const ENV_LOG_JSON: &str = "SALT_PLUGIN_LOG_JSON";

pub fn json_logs_enabled(env: &dyn EnvironmentPort) -> bool {
    env.get_opt(ENV_LOG_JSON).as_deref() == Some("1")
}

/// Initialize logging (`RUST_LOG` filter, JSON when `SALT_PLUGIN_LOG_JSON=1`).
pub fn init_observability(
    env: &dyn EnvironmentPort,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json_logs_enabled(env) {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_current_span(true)
            .try_init()?;
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()?;
    }

    Ok(())
}

/// Per-call logging context.
#[derive(Debug, Clone)]
pub struct CallContext {
    pub plugin: &'static str,
    pub call_id: u64,
    pub verb: String,
    pub start_time: Instant,
}

impl CallContext {
    pub fn new(plugin: &'static str, call_id: u64, verb: Option<&str>) -> Self {
        Self {
            plugin,
            call_id,
            verb: verb.unwrap_or("").to_string(),
            start_time: Instant::now(),
        }
    }

    pub fn span(&self) -> Span {
        tracing::info_span!(
            "call",
            plugin = self.plugin,
            call_id = self.call_id,
            verb = %self.verb,
        )
    }

    pub fn record(&self, reply: &Reply) {
        let duration_ms = self.start_time.elapsed().as_millis() as u64;
        if reply.is_success() {
            info!(
                plugin = self.plugin,
                call_id = self.call_id,
                job_id = reply.job_id,
                duration_ms,
                "call completed"
            );
        } else {
            warn!(
                plugin = self.plugin,
                call_id = self.call_id,
                message = %reply.message,
                duration_ms,
                "call failed"
            );
        }
    }
}
