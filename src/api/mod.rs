//! API gateway: every server call issued by a view goes through [`ApiGateway::call`].
//!
//! Success publishes the response as a toast (unless suppressed) and hands the parsed JSON
//! back to the caller. Failure is logged with an error id, turned into the caller's fixed
//! error toast and the optional `on_error` callback; it never reaches the caller as an error.

pub mod encoding;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::bus::{BusEvent, EventBus};
use crate::config::ServerConfig;
use crate::error::{ClientError, ClientResult};
use crate::metrics::Metrics;
use crate::toast::{Toast, ToastMessage};
use crate::types::{FileEntry, ViewKind};

pub use encoding::{decode_identifier, encode_identifier, with_identifier_query};

const MAX_ERROR_BODY: usize = 512;

type ErrorCallback = Box<dyn FnOnce(&ClientError) + Send + Sync>;

/// Per-call knobs.
pub struct CallOptions {
    pub method: Method,
    pub body: Option<JsonValue>,
    pub headers: Vec<(String, String)>,
    /// Shown to the user on any failure instead of the underlying error.
    pub error_message: String,
    /// Publish the response as a toast on success.
    pub show_toast_message: bool,
    pub on_error: Option<ErrorCallback>,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            headers: Vec::new(),
            error_message: "Error fetching data".to_string(),
            show_toast_message: true,
            on_error: None,
        }
    }
}

impl CallOptions {
    pub fn get(error_message: &str) -> Self {
        Self { error_message: error_message.to_string(), ..Self::default() }
    }

    pub fn delete(error_message: &str) -> Self {
        Self { method: Method::DELETE, error_message: error_message.to_string(), ..Self::default() }
    }

    /// POST with a JSON body. A body that fails to serialize is sent as `null`.
    pub fn post_json<B: Serialize>(body: &B, error_message: &str) -> Self {
        let body = serde_json::to_value(body).unwrap_or_else(|e| {
            tracing::warn!("request body not serializable: {}", e);
            JsonValue::Null
        });
        Self { method: Method::POST, body: Some(body), error_message: error_message.to_string(), ..Self::default() }
    }

    pub fn post_empty(error_message: &str) -> Self {
        Self { method: Method::POST, error_message: error_message.to_string(), ..Self::default() }
    }

    /// Suppresses the success toast.
    pub fn quiet(mut self) -> Self {
        self.show_toast_message = false;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&ClientError) + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(f));
        self
    }
}

/// Source of the file collection; the seam the refetch path depends on.
#[async_trait]
pub trait FilesBackend: Send + Sync {
    async fn list_files(&self, view: ViewKind) -> ClientResult<Vec<FileEntry>>;
}

#[derive(Clone)]
pub struct ApiGateway {
    client: reqwest::Client,
    base_url: String,
    timeout: std::time::Duration,
    bus: EventBus,
    metrics: Metrics,
}

impl ApiGateway {
    pub fn new(cfg: &ServerConfig, bus: EventBus, metrics: Metrics) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(cfg.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            timeout: cfg.request_timeout(),
            bus,
            metrics,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shared HTTP client, also used for the push stream.
    pub fn http(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Issues the request; `None` means it failed and the user has been told.
    pub async fn call(&self, path: &str, mut opts: CallOptions) -> Option<JsonValue> {
        let on_error = opts.on_error.take();
        match self.request_json(path, &opts).await {
            Ok(data) => {
                if opts.show_toast_message {
                    self.toast(Toast::new(ToastMessage::from_response(&data)));
                }
                Some(data)
            }
            Err(e) => {
                self.fail(path, &opts.error_message, e, on_error);
                None
            }
        }
    }

    /// Like [`call`](Self::call) but decodes the payload into `T`. A payload of the wrong
    /// shape counts as a failure.
    pub async fn call_as<T: DeserializeOwned>(&self, path: &str, mut opts: CallOptions) -> Option<T> {
        let on_error = opts.on_error.take();
        let result = match self.request_json(path, &opts).await {
            Ok(data) => serde_json::from_value::<T>(data.clone()).map(|typed| (data, typed)).map_err(ClientError::from),
            Err(e) => Err(e),
        };
        match result {
            Ok((data, typed)) => {
                if opts.show_toast_message {
                    self.toast(Toast::new(ToastMessage::from_response(&data)));
                }
                Some(typed)
            }
            Err(e) => {
                self.fail(path, &opts.error_message, e, on_error);
                None
            }
        }
    }

    /// Raw request without any toast handling; for callers that report failures themselves.
    pub async fn request_json(&self, path: &str, opts: &CallOptions) -> ClientResult<JsonValue> {
        self.metrics.inc_requests_sent();
        let mut req = self.client.request(opts.method.clone(), self.url(path)).timeout(self.timeout);
        for (name, value) in &opts.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &opts.body {
            req = req.json(body);
        }
        tracing::debug!(method = %opts.method, path, "api request");
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let mut body = resp.text().await.unwrap_or_else(|_| "HTTP error".into());
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(ClientError::Status { status: status.as_u16(), body });
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn toast(&self, toast: Toast) {
        self.metrics.inc_toasts();
        self.bus.publish(BusEvent::Toast(toast));
    }

    fn fail(&self, path: &str, error_message: &str, err: ClientError, on_error: Option<ErrorCallback>) {
        self.metrics.inc_requests_failed();
        let error_id = Uuid::new_v4();
        tracing::error!(%error_id, path, "{}: {}", error_message, err);
        self.toast(Toast::new(error_message));
        if let Some(cb) = on_error {
            cb(&err);
        }
    }
}

#[async_trait]
impl FilesBackend for ApiGateway {
    async fn list_files(&self, view: ViewKind) -> ClientResult<Vec<FileEntry>> {
        let path = view.list_path().ok_or_else(|| ClientError::validation("view", "view has no file list"))?;
        let data = self.request_json(path, &CallOptions::get("Error fetching files")).await?;
        Ok(serde_json::from_value(data)?)
    }
}
