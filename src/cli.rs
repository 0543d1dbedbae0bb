//! Process entry point shared by every plugin binary.

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use crate::adapters::StdEnvAdapter;
use crate::config::PluginConfig;
use crate::handlers::PluginKind;
use crate::host::OneShotHost;
use crate::observability::init_observability;
use crate::service::PluginService;

pub const EXIT_OK: i32 = 0;
pub const EXIT_CONFIG: i32 = 1;
pub const EXIT_HOST: i32 = 2;

#[derive(Parser, Debug)]
#[command(version, about = "Serve a single plugin RPC connection, then exit")]
pub struct Cli {
    /// TCP port to listen on.
    pub port: u16,
}

/// Parse arguments, serve one connection, and return the process exit code.
pub fn run(kind: PluginKind) -> i32 {
    let cli = Cli::parse();
    if let Err(e) = init_observability(&StdEnvAdapter) {
        eprintln!("warning: logging disabled: {e}");
    }

    let config = match PluginConfig::from_env(&StdEnvAdapter) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return EXIT_CONFIG;
        }
    };
    let service = match PluginService::from_config(kind, &config) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "cannot build master client");
            return EXIT_CONFIG;
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "startup failed");
            return EXIT_HOST;
        }
    };

    rt.block_on(async move {
        info!(plugin = %kind, port = cli.port, master = %config.master_url, "plugin starting");
        match OneShotHost::new(cli.port).run(&service).await {
            Ok(summary) => {
                info!(calls = summary.calls, "plugin exiting");
                EXIT_OK
            }
            Err(e) => {
                error!(error = %e, "plugin host failed");
                EXIT_HOST
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn takes_exactly_one_port() {
        let cli = Cli::try_parse_from(["salt-grains", "4001"]).unwrap();
        assert_eq!(cli.port, 4001);

        assert!(Cli::try_parse_from(["salt-grains"]).is_err());
        assert!(Cli::try_parse_from(["salt-grains", "4001", "4002"]).is_err());
        assert!(Cli::try_parse_from(["salt-grains", "http"]).is_err());
    }
}
