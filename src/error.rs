use thiserror::Error;

use crate::ports::master::MasterError;
use crate::schema::Reply;

/// Every failure a plugin can report back to the master.
///
/// The `Display` text is exactly what lands in the reply's message field, so
/// changing a format string here changes the wire contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    #[error("'{0}' must be set")]
    MissingQuery(&'static str),

    #[error("'{0}' path parameter must be set")]
    MissingPathParam(&'static str),

    #[error("Error decoding the POST data ({raw}). Error decoding JSON ('{reason}').")]
    BodyDecode { raw: String, reason: String },

    #[error("No POST data received. Nothing to do.")]
    NoPostData,

    #[error("No SaltIds were received. Aborting.")]
    NoSaltIds,

    #[error("Error reading Body ('{0}').")]
    BodyRead(String),

    #[error("Error contacting the master ('{0}').")]
    Transport(String),

    #[error(
        "The requested environment id does not exist or the permissions to access it are insufficient."
    )]
    EnvNotFound,

    #[error("Could not find script '{0}'.")]
    ScriptNotFound(String),

    /// Raised by a job runner; the text is passed through untouched.
    #[error("{0}")]
    Submission(String),

    #[error("Internal error: Unimplemented HTTP {0}")]
    Unimplemented(&'static str),

    #[error("Internal error: HTTP request type was not set")]
    VerbMissing,

    #[error("Internal error: Invalid HTTP request type for this plugin {0}")]
    VerbInvalid(String),

    #[error("Marshal error: {0}")]
    Marshal(String),

    #[error("Internal error: Invalid request envelope ({0})")]
    Envelope(String),
}

impl From<MasterError> for PluginError {
    fn from(err: MasterError) -> Self {
        match err {
            MasterError::ReadBody(reason) => PluginError::BodyRead(reason),
            other => PluginError::Transport(other.to_string()),
        }
    }
}

impl From<PluginError> for Reply {
    fn from(err: PluginError) -> Self {
        Reply::error(err.to_string())
    }
}
