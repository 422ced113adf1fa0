//! Shared fixtures: file builders, a scripted file backend and an in-process stub of the
//! media server.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::routing::{get, post, MethodRouter};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use crate::api::{decode_identifier, FilesBackend};
use crate::bus::{BusEvent, EventBus, EventKind, Subscription};
use crate::config::AppConfig;
use crate::error::{ClientError, ClientResult};
use crate::types::{FileEntry, ViewKind};

pub fn file(name: &str, created: f64) -> FileEntry {
    FileEntry { filename: name.to_string(), created: Some(created), ..FileEntry::default() }
}

/// `count` files `/videos/clip_NN.mp4`, `created` = 1000 + index, 1 MiB each.
pub fn numbered_files(count: usize) -> Vec<FileEntry> {
    (0..count)
        .map(|i| FileEntry {
            filesize: Some(1 << 20),
            ..file(&format!("/videos/clip_{:02}.mp4", i), 1000.0 + i as f64)
        })
        .collect()
}

/// Defaults with short timers so tests do not wait long.
pub fn test_config(base_url: &str) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.server.base_url = base_url.to_string();
    cfg.server.request_timeout_secs = 5;
    cfg.client.fetch_debounce_ms = 20;
    cfg.push.reconnect_base_ms = 10;
    cfg.push.reconnect_max_ms = 40;
    cfg
}

/// Collects every toast text published on `bus`.
pub fn collect_toasts(bus: &EventBus) -> (Arc<Mutex<Vec<String>>>, Subscription) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let sub = bus.subscribe(EventKind::Toast, move |event| {
        if let BusEvent::Toast(toast) = event {
            sink.lock().unwrap().push(toast.message.text().to_string());
        }
        Ok(())
    });
    (seen, sub)
}

/// File list source answering from memory, optionally after a delay.
pub struct ScriptedBackend {
    pub files: Mutex<Vec<FileEntry>>,
    pub calls: AtomicUsize,
    pub delay: Duration,
    pub fail: bool,
}

impl ScriptedBackend {
    pub fn new(files: Vec<FileEntry>) -> Self {
        Self { files: Mutex::new(files), calls: AtomicUsize::new(0), delay: Duration::ZERO, fail: false }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FilesBackend for ScriptedBackend {
    async fn list_files(&self, _view: ViewKind) -> ClientResult<Vec<FileEntry>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let files = self.files.lock().unwrap().clone();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(ClientError::Status { status: 500, body: "scripted failure".into() });
        }
        Ok(files)
    }
}

/// Requests the stub server received: `(path, body or decoded identifier)`.
#[derive(Clone, Default)]
pub struct Recorded {
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Recorded {
    fn push(&self, path: &str, body: Value) {
        self.calls.lock().unwrap().push((path.to_string(), body));
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn bodies(&self, path: &str) -> Vec<Value> {
        self.calls().into_iter().filter(|(p, _)| p == path).map(|(_, b)| b).collect()
    }
}

pub struct StubServer {
    pub base_url: String,
    pub recorded: Recorded,
    handle: JoinHandle<()>,
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn recording_post(path: &'static str, response: Value) -> MethodRouter<Recorded> {
    post(move |State(rec): State<Recorded>, Json(body): Json<Value>| {
        let response = response.clone();
        async move {
            rec.push(path, body);
            Json(response)
        }
    })
}

async fn recording_delete(path: &'static str, rec: Recorded, query: HashMap<String, String>) -> Json<Value> {
    let decoded = query.get("url").and_then(|u| decode_identifier(u).ok()).unwrap_or_default();
    rec.push(path, Value::String(decoded));
    Json(json!({ "message": "deleted" }))
}

pub fn stub_files() -> Value {
    json!([
        { "filename": "/videos/alpha.mp4", "title": "Alpha", "folder": "", "filesize": 100, "created": 3.0, "width": 1920, "height": 1080, "duration": 600.0 },
        { "filename": "/videos/news/beta.mkv", "folder": "news", "filesize": 200, "created": 2.0, "download_id": 7 },
        { "filename": "/videos/gamma.webm", "folder": "", "created": 1.0, "favorite": true }
    ])
}

/// Media server stand-in covering the endpoints the client uses.
pub async fn spawn_media_server() -> StubServer {
    let recorded = Recorded::default();
    let router = Router::new()
        .route("/api/list", get(|| async { Json(stub_files()) }))
        .route(
            "/api/library/list",
            get(|| async { Json(json!([{ "filename": "/library/movie.mp4", "folder": "movies", "created": 5.0 }])) }),
        )
        .route(
            "/api/files",
            axum::routing::delete(|State(rec): State<Recorded>, Query(q): Query<HashMap<String, String>>| {
                recording_delete("/api/files", rec, q)
            }),
        )
        .route("/api/rename", recording_post("/api/rename", json!({ "success": true, "message": "Renamed" })))
        .route("/api/move_file", recording_post("/api/move_file", json!({ "success": true, "message": "Moved" })))
        .route("/api/toggle_favorite", recording_post("/api/toggle_favorite", json!({ "success": true })))
        .route("/api/generate_thumbnail", recording_post("/api/generate_thumbnail", json!({ "success": false })))
        .route(
            "/api/generate_thumbnails",
            post(|| async { Json(json!({ "success": true, "message": "Thumbnails queued" })) }),
        )
        .route(
            "/api/similar",
            recording_post(
                "/api/similar",
                json!([{ "score": 91.5, "file": { "filename": "/videos/alpha_copy.mp4", "created": 4.0 } }]),
            ),
        )
        .route(
            "/api/bookmarks",
            get(|| async { Json(json!([{ "title": "Example", "url": "https://example.org" }])) })
                .merge(recording_post("/api/bookmarks", json!({ "success": true })))
                .delete(|State(rec): State<Recorded>, Query(q): Query<HashMap<String, String>>| {
                    recording_delete("/api/bookmarks", rec, q)
                }),
        )
        .route("/download", recording_post("/download", json!("Download started")))
        .route(
            "/stream",
            recording_post("/stream", json!({ "videoUrl": "http://media.local/v.mp4//", "audioUrl": null, "title": "" })),
        )
        .route("/cleanup", get(|| async { Json(json!({ "message": "Cleanup done" })) }))
        .route("/cache/clear", get(|| async { Json(json!("Cache cleared")) }))
        .route("/broken", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }))
        .route("/not-json", get(|| async { "plain text" }))
        .route(
            "/sse",
            get(|| async {
                let events = [
                    "Heartbeat 1",
                    "Downloading...[7] 42.5% complete",
                    " - writing fragment 3",
                    "Download failed [8]",
                ];
                // stays open after the last event, like the real server
                let stream = futures::stream::iter(
                    events.into_iter().map(|e| Ok::<Event, Infallible>(Event::default().data(e))),
                )
                .chain(futures::stream::pending());
                Sse::new(stream)
            }),
        )
        .route(
            "/sse-closed",
            get(|| async { Sse::new(futures::stream::empty::<Result<Event, Infallible>>()) }),
        )
        .route(
            "/api/onlines",
            get(|| async {
                Json(json!([
                    { "url": "http://media.local/live.m3u8", "original_url": "https://example.org/watch", "title": "Live",
                      "date": 1700000000.0, "resolution": "1920x1080", "stream_count": 3 },
                    { "url": "http://media.local/old.mp4", "title": null, "date": "1600000000" }
                ]))
            })
            .delete(|State(rec): State<Recorded>, Query(q): Query<HashMap<String, String>>| {
                recording_delete("/api/onlines", rec, q)
            }),
        )
        .route("/scan", get(|| async { Json(json!("Scan started")) }))
        .route("/update", get(|| async { (StatusCode::BAD_GATEWAY, "restarting") }))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    StubServer { base_url: format!("http://{}", addr), recorded, handle }
}

/// An address nothing listens on.
pub async fn unused_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
