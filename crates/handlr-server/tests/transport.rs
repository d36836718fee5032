#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use handlr_server::{app_state::AppState, config, router};

const CONFIG: &str = r#"
version: 1
server:
  listen: "127.0.0.1:0"
  max_body_bytes: 64
handlers:
  - name: "ping"
    kind: ping
    path: "/ping"
    methods: [GET, HEAD]
  - name: "echo"
    kind: echo
    path: "/echo"
    methods: [GET, POST]
    auth:
      type: header-token
      header: authorization
      scheme: Bearer
      tokens: ["secret"]
"#;

async fn start() -> (SocketAddr, AppState) {
    let cfg = config::load_from_str(CONFIG).unwrap();
    let state = AppState::new(cfg).unwrap();
    let app = router::build_router(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

struct RawResponse {
    status: u16,
    body: String,
}

async fn send(addr: SocketAddr, method: &str, path: &str, headers: &[(&str, &str)], body: &str) -> RawResponse {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let mut raw = format!("{method} {path} HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n");
    for (k, v) in headers {
        raw.push_str(&format!("{k}: {v}\r\n"));
    }
    raw.push_str(&format!("content-length: {}\r\n\r\n{body}", body.len()));
    stream.write_all(raw.as_bytes()).await.unwrap();

    // The server may reset after answering a rejected upload; keep what arrived.
    let mut buf = Vec::new();
    let _ = stream.read_to_end(&mut buf).await;
    let text = String::from_utf8_lossy(&buf).to_string();

    let status = text
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .expect("status line");
    let body = text.split_once("\r\n\r\n").map(|(_, b)| b.to_string()).unwrap_or_default();
    RawResponse { status, body }
}

#[tokio::test]
async fn ping_round_trip_is_reported() {
    let (addr, state) = start().await;

    let resp = send(addr, "GET", "/ping", &[], "").await;
    assert_eq!(resp.status, 200);
    assert!(resp.body.contains("pong"));

    let ping = state.handler("ping").unwrap();
    assert_eq!(ping.request_statistics().total_statistics().reply_count(200), 1);

    let stats = send(addr, "GET", "/statistics?prefix=http.handler.ping", &[], "").await;
    assert_eq!(stats.status, 200);
    let report: serde_json::Value = serde_json::from_str(stats.body.trim()).unwrap();
    assert_eq!(report["http.handler.ping"]["total"]["reply-codes"]["2xx"], 1);
    assert!(report.get("http.handler.echo").is_none());
}

#[tokio::test]
async fn echo_requires_token() {
    let (addr, state) = start().await;

    let denied = send(addr, "POST", "/echo", &[], "hello").await;
    assert_eq!(denied.status, 401);
    assert!(denied.body.contains("UNAUTHORIZED"));

    let wrong = send(addr, "POST", "/echo", &[("authorization", "Bearer nope")], "hello").await;
    assert_eq!(wrong.status, 403);

    let ok = send(addr, "POST", "/echo", &[("authorization", "Bearer secret")], "hello").await;
    assert_eq!(ok.status, 200);
    assert!(ok.body.ends_with("hello"));

    let echo = state.handler("echo").unwrap();
    let post = echo
        .request_statistics()
        .statistic_by_method(handlr_core::HttpMethod::Post)
        .unwrap();
    assert_eq!(post.reply_count(401), 1);
    assert_eq!(post.reply_count(403), 1);
    assert_eq!(post.reply_count(200), 1);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let (addr, _state) = start().await;

    let big = "x".repeat(200);
    let resp = send(addr, "POST", "/echo", &[("authorization", "Bearer secret")], &big).await;
    assert_eq!(resp.status, 413);
}

#[tokio::test]
async fn ops_endpoints_follow_draining() {
    let (addr, state) = start().await;

    assert_eq!(send(addr, "GET", "/healthz", &[], "").await.status, 200);
    assert_eq!(send(addr, "GET", "/readyz", &[], "").await.status, 200);

    state.set_draining();
    assert_eq!(send(addr, "GET", "/readyz", &[], "").await.status, 503);
    assert_eq!(send(addr, "GET", "/healthz", &[], "").await.status, 200);
}
