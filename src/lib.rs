//! # vidnest client core
//!
//! This is the client-side core of vidnest, a media download and library manager. The server
//! downloads videos, tracks them, and serves lists of files; this library holds the shared
//! view state over those lists, derives the pages a view renders, talks to the server API and
//! follows the server's push stream for download progress.
//!
//! ## Architecture
//!
//! The library is built using:
//! - **Tokio**: Async runtime, `watch` channels for reactive state
//! - **Reqwest**: HTTP client for API calls and the `text/event-stream` push connection
//! - **Serde**: (De)serialization of server payloads and persisted settings
//! - **Tracing**: Structured logging throughout
//!
//! ## Core Components
//!
//! - [`config`]: Layered application configuration
//! - [`error`]: The crate's error type and input validation helpers
//! - [`metrics`]: Request, toast and push stream counters
//! - [`types`]: Server payloads and request bodies
//! - [`bus`]: In-process publish/subscribe event bus
//! - [`toast`]: User notifications
//! - [`settings`]: Persisted user preferences
//! - [`view`]: Shared, reactive view state
//! - [`pipeline`]: Filter, sort and paging over the file collection
//! - [`debounce`]: Trailing debounce for refetch requests
//! - [`api`]: API gateway and query parameter encoding
//! - [`push`]: Push stream listener and message grammar
//! - [`actions`]: File, bookmark, tracked URL and maintenance actions
//! - [`format`]: Human-readable sizes, durations and dates
//! - [`state`]: The [`state::AppContext`] tying it all together
//!
//! ## Features
//!
//! - Filtering by folder, title, resolution and minimum duration
//! - Stable multi-criteria sorting and paging with a clamped page cursor
//! - Live download progress via Server-Sent Events (SSE), with reconnect backoff
//! - Debounced refetches when the server reports a changed file list
//! - Failures reported to the user through toasts, never as panics

pub mod actions;
pub mod api;
pub mod bus;
pub mod config;
pub mod debounce;
pub mod error;
pub mod format;
pub mod metrics;
pub mod pipeline;
pub mod push;
pub mod settings;
pub mod state;
pub mod toast;
pub mod types;
pub mod view;

#[cfg(test)]
mod tests;
