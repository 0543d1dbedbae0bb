//! Newline-delimited JSON RPC over the plugin's single connection.
//!
//! Request:  `{"id":1,"method":"Plugin.HandleRequest","params":{...envelope...}}`
//! Response: `{"id":1,"result":{...reply...},"error":null}`
//!
//! `error` is only set for transport-level problems (unknown method,
//! unparseable frame). Everything a handler has to say travels in `result`.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use crate::error::PluginError;
use crate::schema::{Envelope, Reply};
use crate::service::PluginService;

pub const HANDLE_REQUEST: &str = "Plugin.HandleRequest";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl RpcRequest {
    pub fn handle_request(id: u64, envelope: &Envelope) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id,
            method: HANDLE_REQUEST.to_string(),
            params: serde_json::to_value(envelope)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub id: u64,
    pub result: Option<Reply>,
    pub error: Option<String>,
}

impl RpcResponse {
    pub fn reply(id: u64, reply: Reply) -> Self {
        Self {
            id,
            result: Some(reply),
            error: None,
        }
    }

    pub fn failure(id: u64, error: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// Serve frames until the peer closes the connection. Calls are handled one
/// at a time, in arrival order. Returns how many `HandleRequest` calls were
/// answered.
pub async fn serve_conn<S>(stream: S, service: &PluginService) -> std::io::Result<u64>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    let mut served = 0u64;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        if line.trim_ascii().is_empty() {
            continue;
        }
        let response = answer(&line, service).await;
        if response.result.is_some() {
            served += 1;
        }
        let mut frame = encode_response(&response);
        frame.push(b'\n');
        writer.write_all(&frame).await?;
        writer.flush().await?;
    }

    debug!(served, "peer closed connection");
    Ok(served)
}

async fn answer(line: &[u8], service: &PluginService) -> RpcResponse {
    let request: RpcRequest = match serde_json::from_slice(line) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "unparseable request frame");
            return RpcResponse::failure(0, format!("rpc: invalid request frame: {e}"));
        }
    };

    if request.method != HANDLE_REQUEST {
        warn!(method = %request.method, "unknown rpc method");
        return RpcResponse::failure(
            request.id,
            format!("rpc: can't find method {}", request.method),
        );
    }

    let reply = match serde_json::from_value::<Envelope>(request.params) {
        Ok(envelope) => service.handle(request.id, &envelope).await,
        Err(e) => {
            warn!(call_id = request.id, error = %e, "malformed envelope");
            PluginError::Envelope(e.to_string()).into()
        }
    };
    RpcResponse::reply(request.id, reply)
}

fn encode_response(resp: &RpcResponse) -> Vec<u8> {
    serde_json::to_vec(resp).unwrap_or_else(|e| {
        let fallback = RpcResponse::reply(resp.id, PluginError::Marshal(e.to_string()).into());
        serde_json::to_vec(&fallback).unwrap_or_else(|_| {
            br#"{"id":0,"result":null,"error":"rpc: response encoding failed"}"#.to_vec()
        })
    })
}
