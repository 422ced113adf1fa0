//! Toast notifications: the single channel for user-visible results and failures.

use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value as JsonValue;

use crate::bus::{BusEvent, EventBus};

/// Body of a toast. API responses are resolved into one of these explicitly via
/// [`ToastMessage::from_response`].
#[derive(Debug, Clone, PartialEq)]
pub enum ToastMessage {
    Text(String),
    Structured {
        message: String,
        title: Option<String>,
        /// Render `message` as markup instead of plain text.
        html: bool,
    },
}

impl ToastMessage {
    pub fn from_response(value: &JsonValue) -> Self {
        match value {
            JsonValue::String(s) => ToastMessage::Text(s.clone()),
            JsonValue::Object(map) => match map.get("message").and_then(|m| m.as_str()) {
                Some(message) if !message.is_empty() => ToastMessage::Structured {
                    message: message.to_string(),
                    title: map.get("title").and_then(|t| t.as_str()).map(str::to_string),
                    html: false,
                },
                _ => ToastMessage::Text(value.to_string()),
            },
            other => ToastMessage::Text(other.to_string()),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ToastMessage::Text(s) => s,
            ToastMessage::Structured { message, .. } => message,
        }
    }

    pub fn is_html(&self) -> bool {
        matches!(self, ToastMessage::Structured { html: true, .. })
    }
}

impl From<&str> for ToastMessage {
    fn from(s: &str) -> Self {
        ToastMessage::Text(s.to_string())
    }
}

impl From<String> for ToastMessage {
    fn from(s: String) -> Self {
        ToastMessage::Text(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToastOptions {
    pub title: String,
    /// Keep the toast until dismissed instead of auto-hiding it.
    pub stay_open: bool,
    pub wide: bool,
}

impl Default for ToastOptions {
    fn default() -> Self {
        Self { title: "Message".to_string(), stay_open: false, wide: false }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub message: ToastMessage,
    pub options: ToastOptions,
}

impl Toast {
    pub fn new(message: impl Into<ToastMessage>) -> Self {
        Self { message: message.into(), options: ToastOptions::default() }
    }

    pub fn with_options(message: impl Into<ToastMessage>, options: ToastOptions) -> Self {
        Self { message: message.into(), options }
    }

    /// Title shown in the header: a structured title wins over the option title.
    pub fn title(&self) -> &str {
        match &self.message {
            ToastMessage::Structured { title: Some(t), .. } => t,
            _ => &self.options.title,
        }
    }
}

/// Publishes a plain text toast.
pub fn show_toast(bus: &EventBus, message: impl Into<ToastMessage>) {
    bus.publish(BusEvent::Toast(Toast::new(message)));
}

/// A warning that is shown at most once per context, e.g. a browser refusing preview autoplay.
#[derive(Debug, Default)]
pub struct OneShotWarning {
    shown: AtomicBool,
}

impl OneShotWarning {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `message` the first time only. Returns whether it was published.
    pub fn warn(&self, bus: &EventBus, message: &str) -> bool {
        if !self.claim() {
            return false;
        }
        show_toast(bus, message);
        true
    }

    /// Marks the warning as shown; true only for the first caller.
    pub fn claim(&self) -> bool {
        !self.shown.swap(true, Ordering::SeqCst)
    }

    pub fn already_shown(&self) -> bool {
        self.shown.load(Ordering::SeqCst)
    }
}
