//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use forward_proxy::config::ProxyConfig;
use forward_proxy::http::HttpServer;
use forward_proxy::lifecycle::Shutdown;
use forward_proxy::net::{ConnectionTracker, Listener};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// `Proxy-Authorization` value for the default credential `user:`.
pub const VALID_AUTH: &str = "Basic dXNlcjo=";

/// A proxy running on an ephemeral port.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub tunnels: ConnectionTracker,
    pub shutdown: Shutdown,
}

impl TestProxy {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a proxy with the default credential (`user`, empty password).
pub async fn start_proxy() -> TestProxy {
    start_proxy_with(ProxyConfig::default()).await
}

pub async fn start_proxy_with(mut config: ProxyConfig) -> TestProxy {
    config.listener.bind_address = "127.0.0.1:0".into();
    config.timeouts.connect_secs = 5;

    let listener = Listener::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(&config);
    let tunnels = server.tunnels();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestProxy {
        addr,
        tunnels,
        shutdown,
    }
}

/// A reqwest client that sends everything through the proxy with `auth`.
pub fn proxied_client(proxy: &TestProxy, auth: Option<&str>) -> reqwest::Client {
    let mut proxy_cfg = reqwest::Proxy::all(proxy.url()).unwrap();
    if let Some(auth) = auth {
        proxy_cfg = proxy_cfg.custom_http_auth(reqwest::header::HeaderValue::from_str(auth).unwrap());
    }
    reqwest::Client::builder()
        .proxy(proxy_cfg)
        .pool_max_idle_per_host(0)
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Start a TCP server echoing every byte back until the peer closes.
pub async fn start_echo_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let (mut reader, mut writer) = socket.split();
                let _ = tokio::io::copy(&mut reader, &mut writer).await;
                let _ = writer.shutdown().await;
            });
        }
    });

    addr
}

/// Start an HTTP origin answering every request with two `X-Test` values and
/// a body naming the request path.
pub async fn start_origin() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let head = read_head(&mut socket).await;
                let path = head
                    .lines()
                    .next()
                    .and_then(|line| line.split(' ').nth(1))
                    .unwrap_or("/")
                    .to_string();
                let body = origin_body(&path);
                let response = format!(
                    "HTTP/1.1 200 OK\r\nX-Test: a\r\nX-Test: b\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Body served by [`start_origin`] for `path`.
pub fn origin_body(path: &str) -> String {
    format!("origin body for {path}\n")
}

/// Read an HTTP message head up to and including the blank line, one byte
/// at a time so nothing after it is consumed.
pub async fn read_head(stream: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        let n = stream.read(&mut byte).await.unwrap();
        if n == 0 {
            break;
        }
        head.push(byte[0]);
    }
    String::from_utf8_lossy(&head).into_owned()
}

/// Send `CONNECT target` to the proxy and return the stream with the
/// response status code. After a 200 the stream is the raw tunnel.
pub async fn open_tunnel(proxy: SocketAddr, target: &str, auth: Option<&str>) -> (TcpStream, u16) {
    let mut stream = TcpStream::connect(proxy).await.unwrap();

    let mut request = format!("CONNECT {target} HTTP/1.1\r\nHost: {target}\r\n");
    if let Some(auth) = auth {
        request.push_str(&format!("Proxy-Authorization: {auth}\r\n"));
    }
    request.push_str("\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let head = read_head(&mut stream).await;
    let status = head
        .split(' ')
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap_or(0);

    (stream, status)
}
