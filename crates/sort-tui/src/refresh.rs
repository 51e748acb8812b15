//! Refresh watcher: tells the App when the backend wants a full reload.
//!
//! Two sources, chosen by config:
//! - a push channel streaming newline-delimited JSON `PushEvent`s
//!   (`{"event":"refresh_page","message":"..."}`), reconnected on drop;
//! - otherwise a `system_status` poll that fires once each time the backend
//!   comes up fully (`system_ready && detection_active`) after having been
//!   seen down.

use std::time::Duration;

use futures_util::StreamExt;
use sort_proto::client::BackendClient;
use sort_proto::protocol::PushEvent;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// A reload request, with the server's message when it sent one.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshRequest {
    pub message: Option<String>,
}

/// Fires on the not-ready → ready edge only.  The first observation just
/// records the starting level.
#[derive(Debug, Default)]
pub struct ReadinessEdge {
    previous: Option<bool>,
}

impl ReadinessEdge {
    pub fn observe(&mut self, ready: bool) -> bool {
        let fire = ready && self.previous == Some(false);
        self.previous = Some(ready);
        fire
    }
}

/// Reassembles lines from arbitrarily split byte chunks.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line).trim().to_string());
        }
        lines
    }
}

/// Decode one line of the push channel.  Blank lines, SSE comments and
/// undecodable lines yield `None`; an SSE-style `data:` prefix is accepted.
pub fn parse_line(line: &str) -> Option<PushEvent> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    let body = line.strip_prefix("data:").map(str::trim).unwrap_or(line);
    match serde_json::from_str(body) {
        Ok(ev) => Some(ev),
        Err(e) => {
            debug!("[refresh] ignoring push line {:?}: {}", line, e);
            None
        }
    }
}

/// Stream push events from `url` forever, reconnecting `retry` after each
/// drop.  Returns when the receiver is gone.
pub async fn watch_push<T>(url: String, retry: Duration, tx: mpsc::Sender<T>)
where
    T: From<RefreshRequest> + Send + 'static,
{
    // No overall timeout: the response body is open-ended.
    let http = reqwest::Client::new();
    loop {
        match stream_once(&http, &url, &tx).await {
            Ok(StreamEnd::ReceiverGone) => return,
            Ok(StreamEnd::Closed) => info!("[refresh] push channel disconnected"),
            Err(e) => warn!("[refresh] push channel error: {}", e),
        }
        if tx.is_closed() {
            return;
        }
        tokio::time::sleep(retry).await;
    }
}

enum StreamEnd {
    Closed,
    ReceiverGone,
}

async fn stream_once<T>(
    http: &reqwest::Client,
    url: &str,
    tx: &mpsc::Sender<T>,
) -> anyhow::Result<StreamEnd>
where
    T: From<RefreshRequest>,
{
    let resp = http.get(url).send().await?.error_for_status()?;
    info!("[refresh] push channel connected: {}", url);

    let mut lines = LineBuffer::default();
    let mut body = resp.bytes_stream();
    while let Some(chunk) = body.next().await {
        for line in lines.push(&chunk?) {
            let Some(event) = parse_line(&line) else {
                continue;
            };
            if !event.is_refresh() {
                debug!("[refresh] push event {:?}", event.event);
                continue;
            }
            info!("[refresh] server requested reload: {:?}", event.message);
            let req = RefreshRequest {
                message: event.message,
            };
            if tx.send(T::from(req)).await.is_err() {
                return Ok(StreamEnd::ReceiverGone);
            }
        }
    }
    Ok(StreamEnd::Closed)
}

/// Poll `system_status` every `period` and request a reload on each
/// down → fully-ready edge.
pub async fn watch_status<T>(client: BackendClient, period: Duration, tx: mpsc::Sender<T>)
where
    T: From<RefreshRequest> + Send + 'static,
{
    let mut edge = ReadinessEdge::default();
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        let ready = match client.system_status().await {
            Ok(status) => status.is_fully_ready(),
            Err(e) => {
                debug!("[refresh] status poll failed: {}", e);
                false
            }
        };
        if edge.observe(ready) {
            info!("[refresh] system became ready");
            let req = RefreshRequest {
                message: Some("System ready".to_string()),
            };
            if tx.send(T::from(req)).await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};

    #[test]
    fn test_edge_fires_only_on_rising_transition() {
        let mut edge = ReadinessEdge::default();
        assert!(!edge.observe(true), "first observation only sets the level");
        assert!(!edge.observe(true));
        assert!(!edge.observe(false));
        assert!(edge.observe(true));
        assert!(!edge.observe(true));
        assert!(!edge.observe(false));
        assert!(!edge.observe(false));
        assert!(edge.observe(true));
    }

    #[test]
    fn test_edge_starting_down() {
        let mut edge = ReadinessEdge::default();
        assert!(!edge.observe(false));
        assert!(edge.observe(true));
    }

    #[test]
    fn test_line_buffer_joins_split_chunks() {
        let mut buf = LineBuffer::default();
        assert!(buf.push(b"{\"event\":\"refr").is_empty());
        let lines = buf.push(b"esh_page\"}\n{\"event\":\"x\"}\r\n{\"ev");
        assert_eq!(lines, vec!["{\"event\":\"refresh_page\"}", "{\"event\":\"x\"}"]);
        assert_eq!(buf.push(b"ent\":\"y\"}\n"), vec!["{\"event\":\"y\"}"]);
    }

    #[test]
    fn test_parse_line_variants() {
        let ev = parse_line(r#"{"event":"refresh_page","message":"System ready"}"#).unwrap();
        assert!(ev.is_refresh());
        assert_eq!(ev.message.as_deref(), Some("System ready"));

        let ev = parse_line(r#"data: {"event":"refresh_page"}"#).unwrap();
        assert!(ev.is_refresh());
        assert_eq!(ev.message, None);

        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line(": keepalive"), None);
        assert_eq!(parse_line("not json"), None);
    }

    #[tokio::test]
    async fn test_push_stream_delivers_refresh() {
        let app = Router::new().route(
            "/events",
            get(|| async {
                "{\"event\":\"connected\"}\n{\"event\":\"refresh_page\",\"message\":\"System ready\"}\n"
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let (tx, mut rx) = mpsc::channel::<RefreshRequest>(4);
        let watcher = tokio::spawn(watch_push(
            format!("http://{addr}/events"),
            Duration::from_secs(60),
            tx,
        ));
        let got = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.message.as_deref(), Some("System ready"));
        watcher.abort();
    }
}
