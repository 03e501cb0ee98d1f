//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use endpoint_sidecar::config::DiscoveryConfig;
use endpoint_sidecar::supervisor::{ProcessSpec, ProcessSupervisor};

#[derive(Debug, Clone)]
struct Reply {
    status: u16,
    body: String,
}

/// A fake Kubernetes API server answering every request with one programmable reply.
pub struct MockApiServer {
    pub addr: SocketAddr,
    reply: Arc<Mutex<Reply>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockApiServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let reply = Arc::new(Mutex::new(Reply {
            status: 200,
            body: "{}".into(),
        }));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let (reply_task, requests_task) = (reply.clone(), requests.clone());
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else { break };
                let reply = reply_task.clone();
                let requests = requests_task.clone();
                tokio::spawn(async move {
                    let mut head = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => head.extend_from_slice(&buf[..n]),
                        }
                    }
                    requests.lock().unwrap().push(String::from_utf8_lossy(&head).into_owned());

                    let Reply { status, body } = reply.lock().unwrap().clone();
                    let status_text = match status {
                        200 => "200 OK",
                        403 => "403 Forbidden",
                        404 => "404 Not Found",
                        _ => "500 Internal Server Error",
                    };
                    let response = format!(
                        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status_text,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self { addr, reply, requests }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Serve an Endpoints object with `ips` on a port named `port_name`.
    pub fn set_members(&self, ips: &[&str], port_name: &str, port: u16) {
        let addresses: Vec<String> = ips.iter().map(|ip| format!(r#"{{"ip":"{ip}"}}"#)).collect();
        let body = if ips.is_empty() {
            r#"{"kind":"Endpoints","subsets":[]}"#.to_string()
        } else {
            format!(
                r#"{{"kind":"Endpoints","subsets":[{{"addresses":[{}],"ports":[{{"name":"{}","port":{},"protocol":"TCP"}}]}}]}}"#,
                addresses.join(","),
                port_name,
                port
            )
        };
        *self.reply.lock().unwrap() = Reply { status: 200, body };
    }

    pub fn set_status(&self, status: u16) {
        *self.reply.lock().unwrap() = Reply {
            status,
            body: r#"{"kind":"Status"}"#.into(),
        };
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Discovery settings pointing at the mock, with no token or CA on disk.
pub fn discovery_config(server: &MockApiServer, scratch: &Path) -> DiscoveryConfig {
    DiscoveryConfig {
        namespace: "cache".into(),
        api_server: Some(server.url()),
        token_path: scratch.join("token"),
        ca_path: scratch.join("ca.crt"),
        ..Default::default()
    }
}

/// A supervisor running `script` under `sh`, with the config path as `$1`.
pub fn shell_supervisor(script: &str) -> ProcessSupervisor {
    ProcessSupervisor::new(ProcessSpec {
        binary: "sh".into(),
        args: vec!["-c".into(), script.into(), "sh".into()],
    })
}
