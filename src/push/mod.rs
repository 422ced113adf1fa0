//! Push stream listener: one long-lived `text/event-stream` connection per context.
//!
//! Lifecycle: `Disconnected -> Connecting -> Open -> (message)* -> Closed`. A dropped
//! connection is retried with exponential backoff up to `push.max_reconnect_attempts`
//! consecutive failures; after that the listener stays `Closed` and the user gets one toast.
//! [`PushListener::close`] ends it deterministically.

pub mod parser;
pub mod sse;

use std::sync::{Arc, Mutex};

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bus::{BusEvent, EventBus};
use crate::config::PushConfig;
use crate::error::{ClientError, ClientResult};
use crate::metrics::Metrics;
use crate::toast::Toast;
use crate::view::ViewStore;

pub use parser::{PushLog, PushMessage, StatusUpdate, CONTINUATION_PREFIX, HEARTBEAT_MARKER};
pub use sse::SseDecoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
    Closed,
}

/// Payload of [`BusEvent::PushMessage`].
#[derive(Debug, Clone, PartialEq)]
pub struct PushEvent {
    pub text: String,
    pub message: PushMessage,
}

/// Applies a parsed push message to the shared view: progress updates, failure resets, and
/// a refetch request on the bus when the file list changed.
pub fn apply_push_event(view: &ViewStore, bus: &EventBus, event: &PushEvent) {
    let PushMessage::Status(update) = &event.message else {
        return;
    };
    if let Some((job, percent)) = &update.progress {
        view.set_progress(job, *percent);
    }
    if let Some(job) = &update.failed {
        view.set_progress(job, 0.0);
    }
    if update.refetch {
        bus.publish(BusEvent::RefetchFiles);
    }
}

struct Shared {
    url: String,
    client: reqwest::Client,
    cfg: PushConfig,
    bus: EventBus,
    metrics: Metrics,
    state: watch::Sender<ConnectionState>,
    log: Mutex<PushLog>,
    cancel: CancellationToken,
}

impl Shared {
    fn set_state(&self, next: ConnectionState) {
        let changed = self.state.send_if_modified(|s| {
            // Closed is terminal.
            if *s == next || *s == ConnectionState::Closed {
                return false;
            }
            *s = next;
            true
        });
        if changed {
            debug!(state = ?next, "push stream state");
            self.bus.publish(BusEvent::PushStatus(next));
        }
    }

    /// Parses one message, logs it and republishes it. Heartbeats stop here.
    fn handle_message(&self, text: &str) {
        let message = PushMessage::parse(text);
        if !message.is_logged() {
            self.metrics.inc_push_ignored();
            return;
        }
        self.metrics.inc_push_messages();
        self.log.lock().unwrap_or_else(|e| e.into_inner()).push(text);
        self.bus.publish(BusEvent::PushMessage(PushEvent { text: text.to_string(), message }));
    }

    async fn connect(&self) -> ClientResult<reqwest::Response> {
        let resp = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status { status: status.as_u16(), body: format!("push stream refused: {}", status) });
        }
        Ok(resp)
    }

    /// Drives one open stream until it ends. `delivered` counts the events seen, heartbeats
    /// included, so the caller can tell a live connection from one the server drops at once.
    async fn read(&self, resp: reqwest::Response, delivered: &mut u64) -> ClientResult<()> {
        let mut decoder = SseDecoder::new();
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            for event in decoder.feed(&chunk) {
                *delivered += 1;
                self.handle_message(&event);
            }
        }
        Ok(())
    }

    async fn run(self: Arc<Self>) {
        let mut failures: u32 = 0;
        loop {
            self.set_state(ConnectionState::Connecting);
            let outcome = tokio::select! {
                _ = self.cancel.cancelled() => break,
                res = self.connect() => res,
            };
            let err = match outcome {
                Ok(resp) => {
                    self.set_state(ConnectionState::Open);
                    info!(url = %self.url, "push stream open");
                    let mut delivered = 0;
                    let res = tokio::select! {
                        _ = self.cancel.cancelled() => break,
                        res = self.read(resp, &mut delivered) => res,
                    };
                    // An accepted connection that carried nothing still counts as a failure.
                    if delivered > 0 {
                        failures = 0;
                    }
                    match res {
                        Ok(()) => None,
                        Err(e) => Some(e),
                    }
                }
                Err(e) => Some(e),
            };

            match &err {
                Some(e) => warn!("push stream failed: {}", e),
                None => warn!("push stream ended by server"),
            }
            if let Some(e) = &err {
                if !e.is_transient() {
                    self.give_up();
                    break;
                }
            }

            failures += 1;
            if failures > self.cfg.max_reconnect_attempts {
                self.give_up();
                break;
            }
            self.set_state(ConnectionState::Disconnected);
            self.metrics.inc_push_reconnects();
            let delay = self.cfg.reconnect_delay(failures);
            debug!(attempt = failures, delay_ms = delay.as_millis() as u64, "push stream reconnect scheduled");
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        self.set_state(ConnectionState::Closed);
    }

    fn give_up(&self) {
        warn!(url = %self.url, "push stream closed permanently");
        self.metrics.inc_toasts();
        self.bus.publish(BusEvent::Toast(Toast::new("Connection to server lost. Reload to reconnect.")));
    }
}

pub struct PushListener {
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PushListener {
    pub fn new(client: reqwest::Client, base_url: &str, cfg: PushConfig, bus: EventBus, metrics: Metrics) -> Self {
        let (state, _rx) = watch::channel(ConnectionState::Disconnected);
        let url = format!("{}{}", base_url.trim_end_matches('/'), cfg.path);
        let log = Mutex::new(PushLog::new(cfg.log_capacity));
        Self {
            shared: Arc::new(Shared { url, client, cfg, bus, metrics, state, log, cancel: CancellationToken::new() }),
            task: Mutex::new(None),
        }
    }

    /// Opens the connection in the background. A second call while running is a no-op; a
    /// closed listener cannot be restarted.
    pub fn start(&self) {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if task.is_some() || self.shared.cancel.is_cancelled() {
            return;
        }
        *task = Some(tokio::spawn(self.shared.clone().run()));
    }

    /// Closes the connection. The state is `Closed` when this returns.
    pub fn close(&self) {
        self.shared.cancel.cancel();
        self.shared.set_state(ConnectionState::Closed);
    }

    /// Closes and waits for the background task to finish.
    pub async fn shutdown(&self) {
        self.close();
        let task = self.task.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!("push listener task ended abnormally: {}", e);
            }
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.shared.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    pub fn url(&self) -> &str {
        &self.shared.url
    }

    /// The diagnostic feed, newest first.
    pub fn log_lines(&self) -> Vec<String> {
        self.shared.log.lock().unwrap_or_else(|e| e.into_inner()).entries().map(str::to_string).collect()
    }

    pub fn log_text(&self) -> String {
        self.shared.log.lock().unwrap_or_else(|e| e.into_inner()).render()
    }

    /// Feeds one message as if it arrived on the stream.
    pub fn inject(&self, text: &str) {
        self.shared.handle_message(text);
    }
}

impl Drop for PushListener {
    fn drop(&mut self) {
        self.shared.cancel.cancel();
    }
}
