//! The one-shot process model: bind, accept exactly one connection, serve it
//! until the peer hangs up, done. The master spawns a fresh process for the
//! next request.

use std::fmt;
use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info};

use crate::rpc;
use crate::service::PluginService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Unbound,
    Listening,
    Connected,
    Serving,
    Terminated,
}

impl fmt::Display for HostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HostState::Unbound => "unbound",
            HostState::Listening => "listening",
            HostState::Connected => "connected",
            HostState::Serving => "serving",
            HostState::Terminated => "terminated",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum HostError {
    #[error("Listen error. {0}")]
    Bind(#[source] std::io::Error),
    #[error("Accept error. {0}")]
    Accept(#[source] std::io::Error),
    #[error("Connection error. {0}")]
    Serve(#[source] std::io::Error),
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        state: HostState,
        action: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServeSummary {
    pub peer: SocketAddr,
    pub calls: u64,
}

/// Each step is a separate method so the transitions can be driven one at a
/// time; [`OneShotHost::run`] chains them.
pub struct OneShotHost {
    addr: SocketAddr,
    state: HostState,
    listener: Option<TcpListener>,
    conn: Option<(TcpStream, SocketAddr)>,
}

impl OneShotHost {
    /// Host for the given port on all interfaces.
    pub fn new(port: u16) -> Self {
        Self::with_addr(SocketAddr::from(([0, 0, 0, 0], port)))
    }

    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            addr,
            state: HostState::Unbound,
            listener: None,
            conn: None,
        }
    }

    pub fn state(&self) -> HostState {
        self.state
    }

    fn expect_state(&self, want: HostState, action: &'static str) -> Result<(), HostError> {
        if self.state == want {
            Ok(())
        } else {
            Err(HostError::InvalidTransition {
                state: self.state,
                action,
            })
        }
    }

    /// Unbound -> Listening. A bind failure is fatal; the host stays Unbound.
    pub async fn listen(&mut self) -> Result<SocketAddr, HostError> {
        self.expect_state(HostState::Unbound, "listen")?;
        let listener = TcpListener::bind(self.addr).await.map_err(|e| {
            error!(addr = %self.addr, error = %e, "listen failed");
            HostError::Bind(e)
        })?;
        let local = listener.local_addr().map_err(HostError::Bind)?;
        info!(addr = %local, "plugin listening");
        self.listener = Some(listener);
        self.state = HostState::Listening;
        Ok(local)
    }

    /// Listening -> Connected. The listener is closed once the single
    /// connection is in hand, so no second peer can connect.
    pub async fn accept(&mut self) -> Result<SocketAddr, HostError> {
        self.expect_state(HostState::Listening, "accept")?;
        let listener = self.listener.take().ok_or(HostError::InvalidTransition {
            state: self.state,
            action: "accept",
        })?;
        let (stream, peer) = listener.accept().await.map_err(|e| {
            error!(error = %e, "accept failed");
            self.state = HostState::Terminated;
            HostError::Accept(e)
        })?;
        drop(listener);
        info!(%peer, "connection established");
        self.conn = Some((stream, peer));
        self.state = HostState::Connected;
        Ok(peer)
    }

    /// Connected -> Serving -> Terminated.
    pub async fn serve(&mut self, service: &PluginService) -> Result<ServeSummary, HostError> {
        self.expect_state(HostState::Connected, "serve")?;
        let (stream, peer) = self.conn.take().ok_or(HostError::InvalidTransition {
            state: self.state,
            action: "serve",
        })?;
        self.state = HostState::Serving;
        let result = rpc::serve_conn(stream, service).await;
        self.state = HostState::Terminated;

        let calls = result.map_err(|e| {
            error!(%peer, error = %e, "connection failed");
            HostError::Serve(e)
        })?;
        info!(%peer, calls, plugin = service.name(), "connection closed");
        Ok(ServeSummary { peer, calls })
    }

    pub async fn run(mut self, service: &PluginService) -> Result<ServeSummary, HostError> {
        self.listen().await?;
        self.accept().await?;
        self.serve(service).await
    }
}
