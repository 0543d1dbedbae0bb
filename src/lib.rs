//! Salt job plugins for a deployment master.
//!
//! Each plugin binary is spawned by the master with a port, accepts a single
//! connection, answers `Plugin.HandleRequest` calls on it, and exits. A call
//! carries an HTTP-shaped [`schema::Envelope`]; the plugin validates it,
//! optionally looks the environment up on the master, submits a script job,
//! and answers with a [`schema::Reply`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod host;
pub mod observability;
pub mod ports;
pub mod resolver;
pub mod rpc;
pub mod runner;
pub mod schema;
pub mod service;

#[cfg(test)]
mod test_support;

pub use error::PluginError;
pub use handlers::PluginKind;
