#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use salt_plugins::ports::master::{MasterApi, MasterError, MasterResponse, MasterRoute};
use salt_plugins::rpc::{RpcRequest, RpcResponse};
use salt_plugins::runner::JobRunner;
use salt_plugins::schema::{Envelope, JobDescriptor};
use salt_plugins::PluginError;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

pub struct RecordingRunner {
    job_id: i64,
    calls: Mutex<Vec<JobDescriptor>>,
}

impl RecordingRunner {
    pub fn returning(job_id: i64) -> Arc<Self> {
        Arc::new(Self {
            job_id,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<JobDescriptor> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl JobRunner for RecordingRunner {
    async fn submit(&self, _request: &Envelope, job: &JobDescriptor) -> Result<i64, PluginError> {
        self.calls.lock().unwrap().push(job.clone());
        Ok(self.job_id)
    }
}

/// Answers GETs from a resource -> body table.
#[derive(Default)]
pub struct CannedMaster {
    bodies: HashMap<&'static str, String>,
}

impl CannedMaster {
    pub fn with(mut self, resource: &'static str, body: &str) -> Self {
        self.bodies.insert(resource, body.to_string());
        self
    }
}

#[async_trait::async_trait]
impl MasterApi for CannedMaster {
    async fn get(&self, route: &MasterRoute) -> Result<MasterResponse, MasterError> {
        Ok(MasterResponse::ok(
            self.bodies.get(route.resource).cloned().unwrap_or_else(|| "[]".into()),
        ))
    }

    async fn post(
        &self,
        _route: &MasterRoute,
        _body: Vec<u8>,
    ) -> Result<MasterResponse, MasterError> {
        Err(MasterError::Request("read-only master".into()))
    }
}

/// Send each envelope as one frame on a fresh connection, close the write
/// side, and collect every response.
pub async fn call(addr: SocketAddr, envelopes: &[Envelope]) -> Vec<RpcResponse> {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (read, mut write) = stream.into_split();
    for (i, env) in envelopes.iter().enumerate() {
        let req = RpcRequest::handle_request(i as u64 + 1, env).unwrap();
        let mut line = serde_json::to_vec(&req).unwrap();
        line.push(b'\n');
        write.write_all(&line).await.unwrap();
    }
    write.shutdown().await.unwrap();

    let mut out = Vec::new();
    let mut lines = BufReader::new(read).lines();
    while let Some(line) = lines.next_line().await.unwrap() {
        out.push(serde_json::from_str(&line).unwrap());
    }
    out
}

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub target: String,
    pub body: String,
}

/// Minimal HTTP/1.1 master: one request per connection, answers by the
/// first route whose path fragment occurs in the request target.
pub struct FakeHttpMaster {
    pub addr: SocketAddr,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl FakeHttpMaster {
    pub async fn start(routes: Vec<(&'static str, u16, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = routes.clone();
                let log = log.clone();
                tokio::spawn(async move {
                    let _ = answer(stream, &routes, &log).await;
                });
            }
        });
        Self { addr, seen }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

async fn answer(
    stream: TcpStream,
    routes: &[(&'static str, u16, &'static str)],
    log: &Mutex<Vec<SeenRequest>>,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).await?;
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).await?;

    log.lock().unwrap().push(SeenRequest {
        method,
        target: target.clone(),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let (status, payload) = routes
        .iter()
        .find(|(fragment, _, _)| target.contains(fragment))
        .map(|(_, status, payload)| (*status, *payload))
        .unwrap_or((404, r#"{"Error":"not found"}"#));
    let response = format!(
        "HTTP/1.1 {status} X\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{payload}",
        payload.len()
    );
    let mut stream = reader.into_inner();
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

pub struct FrameWriter(tokio::net::tcp::OwnedWriteHalf, u64);

pub struct FrameReader(tokio::io::Lines<BufReader<tokio::net::tcp::OwnedReadHalf>>);

/// Interactive client: one frame out, one reply in.
pub fn split_lines(stream: TcpStream) -> (FrameReader, FrameWriter) {
    let (read, write) = stream.into_split();
    (FrameReader(BufReader::new(read).lines()), FrameWriter(write, 0))
}

impl FrameWriter {
    pub async fn send(&mut self, env: &Envelope) {
        self.1 += 1;
        let req = RpcRequest::handle_request(self.1, env).unwrap();
        let mut line = serde_json::to_vec(&req).unwrap();
        line.push(b'\n');
        self.0.write_all(&line).await.unwrap();
    }
}

impl FrameReader {
    pub async fn next_reply(&mut self) -> salt_plugins::schema::Reply {
        let line = self.0.next_line().await.unwrap().expect("connection closed");
        let resp: RpcResponse = serde_json::from_str(&line).unwrap();
        resp.result.expect("transport error")
    }
}
