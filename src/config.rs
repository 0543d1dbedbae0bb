use std::time::Duration;

use url::Url;

use crate::ports::env::{EnvError, EnvironmentPort};

pub const DEFAULT_MASTER_URL: &str = "https://127.0.0.1";

pub const ENV_MASTER_URL: &str = "SALT_PLUGIN_MASTER_URL";
pub const ENV_TLS_VERIFY: &str = "SALT_PLUGIN_TLS_VERIFY";
pub const ENV_HTTP_TIMEOUT_SEC: &str = "SALT_PLUGIN_HTTP_TIMEOUT_SEC";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    pub master_url: Url,
    /// The master serves a self-signed certificate on loopback.
    pub tls_no_verify: bool,
    /// `None` leaves master calls unbounded; the caller is expected to time
    /// out the whole plugin.
    pub http_timeout: Option<Duration>,
}

impl PluginConfig {
    /// Settings for the given master with every other knob at its default.
    pub fn new(master_url: Url) -> Self {
        Self {
            master_url,
            tls_no_verify: true,
            http_timeout: None,
        }
    }

    pub fn from_env(env: &dyn EnvironmentPort) -> Result<Self, EnvError> {
        let raw = env
            .get_opt(ENV_MASTER_URL)
            .unwrap_or_else(|| DEFAULT_MASTER_URL.to_string());
        let master_url = Url::parse(&raw)
            .map_err(|e| EnvError::InvalidValue(ENV_MASTER_URL.to_string(), e.to_string()))?;
        if master_url.cannot_be_a_base() {
            return Err(EnvError::InvalidValue(
                ENV_MASTER_URL.to_string(),
                "not a base URL".to_string(),
            ));
        }
        let mut cfg = Self::new(master_url);

        if let Some(raw) = env.get_opt(ENV_TLS_VERIFY) {
            cfg.tls_no_verify = match raw.as_str() {
                "1" | "true" => false,
                "0" | "false" => true,
                other => {
                    return Err(EnvError::InvalidValue(
                        ENV_TLS_VERIFY.to_string(),
                        other.to_string(),
                    ))
                }
            };
        }

        if let Some(raw) = env.get_opt(ENV_HTTP_TIMEOUT_SEC) {
            let secs: u64 = raw
                .parse()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| EnvError::InvalidValue(ENV_HTTP_TIMEOUT_SEC.to_string(), raw))?;
            cfg.http_timeout = Some(Duration::from_secs(secs));
        }

        Ok(cfg)
    }
}
